/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Two-level static functions for skewed value distributions.

When the values of a static function are heavily concentrated on a few
frequent ones (as bit lengths of longest common prefixes are), storing the
full bit width for every key is wasteful. A [`TwoStepsFunction`] stores
instead a narrow first-level [`Function`] mapping each key either to the
index of its value in a small table of the 2^*t* − 1 most frequent values,
or to an all-ones *escape*; only the escaped keys are stored, at full
width, in a second-level [`Function`].

The table size is chosen by directly minimizing the forecast bit cost over
*t*. Both levels are built from the same [`SigStore`] snapshot and seed, so
a query hashes its key once.

*/

use std::collections::HashMap;

use dsi_progress_logger::*;
use epserde::*;
use itertools::Itertools;
use mem_dbg::*;

use crate::func::{Function, SolveError, GAMMA};
use crate::utils::{SigStore, ToSig};

/// An immutable function from key signatures to values, stored in two
/// levels.
#[derive(Epserde, Debug, Clone, MemDbg, MemSize)]
pub struct TwoStepsFunction {
    /// Maps each key to an index into `remap`, or to an escape value.
    first: Function,
    /// Maps each escaped key to its value, at full width.
    second: Function,
    /// The most frequent values, by decreasing frequency.
    remap: Box<[u64]>,
    /// The bit width of the values.
    width: usize,
    /// The mean rank of the value of a key in the frequency ordering.
    rank_mean: f64,
}

impl TwoStepsFunction {
    /// Build a two-level function mapping the `i`-th signature of `store`
    /// to `values(i)`.
    pub fn new<F>(
        store: &SigStore,
        values: F,
        pl: &mut impl ProgressLog,
    ) -> Result<Self, SolveError>
    where
        F: Fn(usize) -> u64,
    {
        let num_keys = store.len();

        let mut counts = HashMap::new();
        let mut max_value = 0;
        for i in 0..num_keys {
            let value = values(i);
            max_value = max_value.max(value);
            *counts.entry(value).or_insert(0_u64) += 1;
        }
        let width = (64 - max_value.leading_zeros()) as usize;

        // Values by decreasing frequency; ties broken by value so that the
        // construction is deterministic.
        let by_frequency: Vec<(u64, u64)> = counts
            .into_iter()
            .sorted_by_key(|&(value, count)| (std::cmp::Reverse(count), value))
            .collect();

        let rank_mean = by_frequency
            .iter()
            .enumerate()
            .map(|(rank, &(_, count))| rank as f64 * count as f64)
            .sum::<f64>()
            / Ord::max(num_keys, 1) as f64;

        // Pick the table size 2^t − 1 minimizing the forecast bit cost:
        // t bits per key in the first level, full width for escaped keys in
        // the second, and the table itself.
        let mut prefix = vec![0_u64; by_frequency.len() + 1];
        for (i, &(_, count)) in by_frequency.iter().enumerate() {
            prefix[i + 1] = prefix[i] + count;
        }
        let mut t = 0;
        let mut best_cost = f64::INFINITY;
        for candidate in 0..=20_u32 {
            let table_size = Ord::min((1_usize << candidate) - 1, by_frequency.len());
            let escaped = num_keys as u64 - prefix[table_size];
            let cost = GAMMA * num_keys as f64 * candidate as f64
                + GAMMA * escaped as f64 * width as f64
                + table_size as f64 * 64.;
            if cost < best_cost {
                best_cost = cost;
                t = candidate;
            }
            if table_size == by_frequency.len() {
                break;
            }
        }

        let table_size = Ord::min((1_usize << t) - 1, by_frequency.len());
        let remap: Box<[u64]> = by_frequency[..table_size]
            .iter()
            .map(|&(value, _)| value)
            .collect();
        let escape = (1_u64 << t) - 1;
        let value_rank: HashMap<u64, u64> = remap
            .iter()
            .enumerate()
            .map(|(rank, &value)| (value, rank as u64))
            .collect();

        pl.info(format_args!(
            "Two-level layout: {} frequent values, escape width {}, value width {}",
            table_size, t, width
        ));

        let first = Function::new(
            store,
            |i| *value_rank.get(&values(i)).unwrap_or(&escape),
            t as usize,
            pl,
        )?;

        let mut escaped_store = SigStore::new(store.seed());
        let mut escaped_values = vec![];
        for (i, &sig) in store.sigs().iter().enumerate() {
            let value = values(i);
            if !value_rank.contains_key(&value) {
                escaped_store.push_sig(sig);
                escaped_values.push(value);
            }
        }
        let second = Function::new(&escaped_store, |j| escaped_values[j], width, pl)?;

        Ok(Self {
            first,
            second,
            remap,
            width,
            rank_mean,
        })
    }

    /// Return the value associated with a precomputed signature.
    #[inline(always)]
    pub fn get_by_sig(&self, sig: &[u64; 2]) -> u64 {
        let index = self.first.get_by_sig(sig) as usize;
        // Out-of-set keys may produce any index; everything at or past the
        // table end is treated as an escape.
        if index < self.remap.len() {
            self.remap[index]
        } else {
            self.second.get_by_sig(sig)
        }
    }

    /// Return the value associated with a key.
    #[inline(always)]
    pub fn get<T: ToSig + ?Sized>(&self, key: &T) -> u64 {
        self.get_by_sig(&T::to_sig(key, self.seed()))
    }

    /// Return the seed of the store this function was built from.
    #[inline(always)]
    pub fn seed(&self) -> u64 {
        self.first.seed()
    }

    /// Return the number of keys this function was built on.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.first.size()
    }

    /// Return the bit width of the values.
    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Return the mean rank of the value of a key in the frequency
    /// ordering of the values.
    #[inline(always)]
    pub fn rank_mean(&self) -> f64 {
        self.rank_mean
    }

    /// Return the number of bits used by this structure.
    pub fn num_bits(&self) -> usize {
        self.first.num_bits() + self.second.num_bits() + self.remap.len() * 64
    }
}
