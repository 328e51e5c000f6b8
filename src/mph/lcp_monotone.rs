/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

A monotone minimal perfect hash function based on longest common prefixes.

The sorted key set is split into buckets of fixed size 2^*t*; the longest
common prefix of each bucket identifies the bucket uniquely, so the rank of
a key can be recovered by composing three static functions sharing one
signature store: one mapping each bucket's longest common prefix to the
bucket index, one mapping each key to its offset inside its bucket, and one
mapping each key to the *length* of the longest common prefix of its
bucket, stored in a compact [two-level layout](TwoStepsFunction) since the
lengths are heavily skewed.

The bucket size is derived from a closed-form estimate balancing the bit
cost of the functions against the expected savings; any power of two
produces a correct structure, only the space varies, and the choice can be
overridden on the [builder](LcpMonotoneMphfBuilder).

Keys outside the build set return unspecified results, except for the
detectable misses (an empty structure, or a recovered prefix length longer
than the key), which return a configurable default value.

*/

use std::borrow::Borrow;
use std::f64::consts::{E, LN_2};
use std::marker::PhantomData;

use derivative::Derivative;
use derive_setters::*;
use dsi_progress_logger::*;
use epserde::*;
use lambert_w::lambert_wm1;
use mem_dbg::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::bits::{BitTransform, BitVec};
use crate::func::{Function, TwoStepsFunction, GAMMA};
use crate::mph::BuildError;
use crate::utils::{SigStore, ToSig};

fn ceil_log2(x: usize) -> u32 {
    if x <= 1 {
        0
    } else {
        usize::BITS - (x - 1).leading_zeros()
    }
}

/// A builder for [`LcpMonotoneMphf`].
#[derive(Setters, Debug, Derivative)]
#[derivative(Default)]
#[setters(generate = false)]
pub struct LcpMonotoneMphfBuilder {
    /// The seed for the random number generator providing the signature
    /// seed.
    #[setters(generate = true)]
    seed: u64,

    /// Base-2 logarithm of the bucket size. If not set, it is derived from
    /// the number of keys; any value gives a correct structure, only the
    /// space occupancy varies.
    #[setters(generate = true, strip_option)]
    #[derivative(Default(value = "None"))]
    log2_bucket_size: Option<u32>,

    /// The value returned on detectable misses.
    #[setters(generate = true)]
    #[derivative(Default(value = "usize::MAX"))]
    def_ret_value: usize,
}

/// A monotone minimal perfect hash function: maps each key of the sorted
/// build set to its rank.
#[derive(Epserde, Debug, Clone, MemDbg, MemSize)]
pub struct LcpMonotoneMphf<T: ?Sized, TR> {
    /// The number of keys.
    n: usize,
    /// The size of a bucket.
    bucket_size: usize,
    /// Base-2 logarithm of `bucket_size`.
    log2_bucket_size: u32,
    /// The seed all signatures are computed with.
    seed: u64,
    /// The value returned on detectable misses.
    def_ret_value: usize,
    /// Maps each key to the offset inside its bucket.
    offsets: Function,
    /// Maps each key to the length of the longest common prefix of its
    /// bucket.
    lcp_lengths: TwoStepsFunction,
    /// Maps each bucket's longest common prefix to the bucket index.
    lcp_to_bucket: Function,
    /// The transformation used to map keys to bit vectors.
    transform: TR,
    _marker: PhantomData<T>,
}

impl LcpMonotoneMphfBuilder {
    /// Build a monotone minimal perfect hash function over the given keys,
    /// which must be distinct and sorted once transformed.
    ///
    /// The iterable is scanned twice: once to count the keys and once to
    /// bucket them; it must yield the same keys in the same order both
    /// times.
    pub fn try_build<T, TR, I>(
        self,
        keys: I,
        transform: TR,
        pl: &mut impl ProgressLog,
    ) -> Result<LcpMonotoneMphf<T, TR>, BuildError>
    where
        T: ?Sized,
        TR: BitTransform<T>,
        I: IntoIterator + Clone,
        I::Item: Borrow<T>,
    {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let seed = rng.random::<u64>();

        let n = keys.clone().into_iter().count();
        if n == 0 {
            let empty = SigStore::new(seed);
            return Ok(LcpMonotoneMphf {
                n: 0,
                bucket_size: 0,
                log2_bucket_size: 0,
                seed,
                def_ret_value: self.def_ret_value,
                offsets: Function::new(&empty, |_| 0, 0, pl)?,
                lcp_lengths: TwoStepsFunction::new(&empty, |_| 0, pl)?,
                lcp_to_bucket: Function::new(&empty, |_| 0, 0, pl)?,
                transform,
                _marker: PhantomData,
            });
        }

        // Balances the cost of the offset function against the expected
        // savings of larger buckets.
        let t = (1. + GAMMA * LN_2 + (n as f64).ln() - (1. + (n as f64).ln()).ln()).ceil();
        let log2_bucket_size = self
            .log2_bucket_size
            .unwrap_or_else(|| ceil_log2(t as usize));
        let bucket_size = 1_usize << log2_bucket_size;
        let bucket_size_mask = bucket_size - 1;
        let num_buckets = n.div_ceil(bucket_size);
        log::debug!("Bucket size: {}", bucket_size);

        let mut store = SigStore::new(seed);
        let mut lcps = Vec::with_capacity(num_buckets);
        let mut max_lcp = 0;
        let mut max_length = 0;
        let mut curr_lcp = 0;
        let mut prev = BitVec::new();

        pl.item_name("key");
        pl.expected_updates(Some(n));
        pl.start("Scanning keys...");
        for (i, key) in keys.into_iter().enumerate() {
            let curr = transform.to_bit_vec(key.borrow());
            store.add(&curr);
            pl.light_update();

            if i > 0 {
                match prev.cmp(&curr) {
                    std::cmp::Ordering::Equal => {
                        return Err(BuildError::DuplicateKey { pos: i })
                    }
                    std::cmp::Ordering::Greater => return Err(BuildError::NotSorted { pos: i }),
                    std::cmp::Ordering::Less => {}
                }
            }
            if i % bucket_size == 0 {
                curr_lcp = curr.len();
            } else {
                curr_lcp = curr_lcp.min(curr.longest_common_prefix(&prev));
            }

            max_length = max_length.max(curr.len());
            if i % bucket_size == bucket_size - 1 || i == n - 1 {
                lcps.push(curr.sub_vec(0..curr_lcp));
                max_lcp = max_lcp.max(curr_lcp);
            }
            prev = curr;
        }
        pl.done_with_count(n);
        debug_assert_eq!(lcps.len(), num_buckets);

        // Each longest common prefix identifies its bucket: map it back to
        // the bucket index. The prefixes are hashed under the same seed,
        // but through their own store, since they are distinct keys.
        let mut lcp_store = SigStore::new(seed);
        for lcp in &lcps {
            lcp_store.add(lcp);
        }
        let lcp_to_bucket = Function::new(
            &lcp_store,
            |b| b as u64,
            ceil_log2(num_buckets) as usize,
            pl,
        )?;

        let offsets = Function::new(
            &store,
            |i| (i & bucket_size_mask) as u64,
            log2_bucket_size as usize,
            pl,
        )?;

        let lcp_lengths =
            TwoStepsFunction::new(&store, |i| lcps[i / bucket_size].len() as u64, pl)?;

        let res = LcpMonotoneMphf {
            n,
            bucket_size,
            log2_bucket_size,
            seed,
            def_ret_value: self.def_ret_value,
            offsets,
            lcp_lengths,
            lcp_to_bucket,
            transform,
            _marker: PhantomData,
        };

        let p = 1. / (res.lcp_lengths.rank_mean() + 1.);
        if p < 1. {
            let width = res.lcp_lengths.width();
            let s = forecast_threshold(p, width);
            log::debug!("Forecast best threshold: {}", s);
            let second_function_forecast = s
                + GAMMA
                + (2_f64.powf(s) - 1.) * width as f64 / n as f64
                + (width as f64 + GAMMA) * (1. - p).powf(2_f64.powf(s) + 1.);
            log::debug!(
                "Forecast bit cost per element: {}",
                log2_bucket_size as f64 + GAMMA + second_function_forecast + E.log2()
            );
        }
        log::info!(
            "Max key length: {}; max LCP length: {}",
            max_length,
            max_lcp
        );
        log::info!(
            "Actual bit cost per element: {}",
            res.num_bits() as f64 / n as f64
        );

        Ok(res)
    }
}

/// Forecast of the optimal frequent-value threshold of the two-level
/// length function, following the closed form based on the secondary
/// branch of the Lambert W function.
fn forecast_threshold(p: f64, r: usize) -> f64 {
    let w = lambert_wm1(1. / (LN_2 * (r as f64 + GAMMA) * (p - 1.)));
    (w / (1. - p).ln()).log2()
}

impl<T: ?Sized, TR: BitTransform<T>> LcpMonotoneMphf<T, TR> {
    /// Return the rank of `key` in the sorted build set.
    ///
    /// For keys outside the build set the result is unspecified, except
    /// for detectable misses, which return the configured default value.
    pub fn rank(&self, key: &T) -> usize {
        if self.n == 0 {
            return self.def_ret_value;
        }
        let bit_vector = self.transform.to_bit_vec(key);
        let sig = <BitVec as ToSig>::to_sig(&bit_vector, self.seed);
        let prefix = self.lcp_lengths.get_by_sig(&sig) as usize;
        if prefix > bit_vector.len() {
            return self.def_ret_value;
        }
        let bucket = self.lcp_to_bucket.get(&bit_vector.sub_vec(0..prefix)) as usize;
        (bucket << self.log2_bucket_size) + self.offsets.get_by_sig(&sig) as usize
    }

    /// Return the number of keys this function was built on.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.n
    }

    /// Return the size of a bucket.
    #[inline(always)]
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Return the number of bits used by this structure.
    pub fn num_bits(&self) -> usize {
        if self.n == 0 {
            return 0;
        }
        self.offsets.num_bits()
            + self.lcp_lengths.num_bits()
            + self.lcp_to_bucket.num_bits()
            + self.transform.num_bits()
    }
}
