/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Static functions on 3-hypergraphs.

A [`Function`] maps each key of a static set to a value of fixed bit width
using the Majewski–Wormald–Havas–Czech construction: every key signature is
turned into an edge of three vertices, one per segment of a vertex array of
size γ·*n*; if the resulting hypergraph can be peeled, values are assigned
in reverse peeling order so that the XOR of the three cells of a key's edge
is exactly the key's value.

The *global* seed, under which signatures are computed, belongs to the
[`SigStore`] the function is built from and is never changed here: several
functions built from one store share one hashing pass. Solvability retries
vary only a *local* seed that reshuffles edges via a SpookyHash mix of the
stored signatures.

Querying a key outside the build set returns an unspecified value; this is
what makes the near-optimal space possible.

# Reference
Marco Genuzio, Giuseppe Ottaviano, and Sebastiano Vigna, “[Fast Scalable
Construction of (Minimal Perfect Hash)
Functions](https://arxiv.org/pdf/1603.04330.pdf)”.

*/

use dsi_progress_logger::*;
use epserde::*;
use mem_dbg::*;
use rdst::RadixSort;

use crate::bits::BitFieldVec;
use crate::utils::{spooky_short_rehash, SigStore, ToSig};

/// The expansion factor of the vertex array with respect to the number of
/// edges: 3-hypergraphs with this ratio are peelable with high probability.
pub const GAMMA: f64 = 1.23;

/// The number of local seeds tried before giving up.
const MAX_ATTEMPTS: u64 = 64;

/// Fatal build errors.
#[derive(thiserror::Error, Debug)]
pub enum SolveError {
    /// Two keys have the same signature (almost surely, two keys are equal).
    #[error("Duplicate key signature")]
    DuplicateSignature,
    /// No peelable hypergraph was found; this has a vanishing probability of
    /// happening on distinct signatures.
    #[error("No peelable hypergraph found after {0} attempts")]
    Unsolvable(u64),
}

/// An immutable function from key signatures to values of fixed bit width.
#[derive(Epserde, Debug, Clone, MemDbg, MemSize)]
pub struct Function {
    /// The seed of the signature store this function was built from.
    seed: u64,
    /// The seed used to derive edges from signatures.
    local_seed: u64,
    /// The number of keys.
    num_keys: usize,
    /// The size of each of the three vertex segments.
    seg_size: usize,
    /// The values assigned to the vertices.
    data: BitFieldVec,
}

/// Derive the edge of a signature: one vertex per segment.
#[inline(always)]
fn edge(sig: &[u64; 2], local_seed: u64, seg_size: usize) -> [usize; 3] {
    let hash = spooky_short_rehash(sig, local_seed);
    let seg = seg_size as u128;
    [
        ((hash[0] as u128 * seg) >> 64) as usize,
        (((hash[1] as u128 * seg) >> 64) as usize) + seg_size,
        (((hash[2] as u128 * seg) >> 64) as usize) + 2 * seg_size,
    ]
}

impl Function {
    /// Build a function mapping the `i`-th signature of `store` to
    /// `values(i)`, which must fit `bit_width` bits.
    pub fn new<F>(
        store: &SigStore,
        values: F,
        bit_width: usize,
        pl: &mut impl ProgressLog,
    ) -> Result<Self, SolveError>
    where
        F: Fn(usize) -> u64,
    {
        let sigs = store.sigs();
        let num_keys = sigs.len();
        if num_keys == 0 {
            return Ok(Self {
                seed: store.seed(),
                local_seed: 0,
                num_keys: 0,
                seg_size: 0,
                data: BitFieldVec::new(bit_width, 0),
            });
        }

        let seg_size = ((GAMMA * num_keys as f64) / 3.).ceil() as usize + 1;
        pl.item_name("key");
        pl.expected_updates(Some(num_keys));
        pl.start(format!(
            "Building a {}-bit function over {} keys...",
            bit_width, num_keys
        ));

        let mut local_seed = 0;
        let data = loop {
            match Self::try_peel(sigs, &values, bit_width, local_seed, seg_size, pl) {
                Some(data) => break data,
                None => {
                    if local_seed == 0 {
                        // A duplicate signature makes every attempt fail;
                        // rule it out before retrying.
                        let mut sorted: Vec<u128> = sigs
                            .iter()
                            .map(|sig| ((sig[0] as u128) << 64) | sig[1] as u128)
                            .collect();
                        sorted.radix_sort_unstable();
                        if sorted.windows(2).any(|w| w[0] == w[1]) {
                            return Err(SolveError::DuplicateSignature);
                        }
                    }
                    local_seed += 1;
                    if local_seed == MAX_ATTEMPTS {
                        return Err(SolveError::Unsolvable(MAX_ATTEMPTS));
                    }
                    pl.info(format_args!(
                        "Peeling failed, retrying with local seed {}...",
                        local_seed
                    ));
                }
            }
        };

        pl.done_with_count(num_keys);
        log::debug!(
            "Built function: {} keys, {} vertices, local seed {}",
            num_keys,
            3 * seg_size,
            local_seed
        );

        Ok(Self {
            seed: store.seed(),
            local_seed,
            num_keys,
            seg_size,
            data,
        })
    }

    /// One peeling attempt. Returns the assigned vertex values, or `None`
    /// if the hypergraph induced by `local_seed` has a nonempty 2-core.
    fn try_peel<F>(
        sigs: &[[u64; 2]],
        values: &F,
        bit_width: usize,
        local_seed: u64,
        seg_size: usize,
        pl: &mut impl ProgressLog,
    ) -> Option<BitFieldVec>
    where
        F: Fn(usize) -> u64,
    {
        let num_keys = sigs.len();
        let num_vertices = 3 * seg_size;
        let mut deg = vec![0_u32; num_vertices];
        // XOR of the indices of the incident edges (Djamal's trick): when
        // the degree is one, this is the only incident edge.
        let mut edge_xor = vec![0_usize; num_vertices];

        for (i, sig) in sigs.iter().enumerate() {
            for v in edge(sig, local_seed, seg_size) {
                deg[v] += 1;
                edge_xor[v] ^= i;
            }
        }

        let mut stack: Vec<usize> = (0..num_vertices).filter(|&v| deg[v] == 1).collect();
        let mut peeled: Vec<(usize, usize)> = Vec::with_capacity(num_keys);

        while let Some(v) = stack.pop() {
            if deg[v] != 1 {
                continue;
            }
            let e = edge_xor[v];
            peeled.push((e, v));
            for u in edge(&sigs[e], local_seed, seg_size) {
                deg[u] -= 1;
                edge_xor[u] ^= e;
                if deg[u] == 1 {
                    stack.push(u);
                }
            }
        }

        if peeled.len() < num_keys {
            return None;
        }

        let mut data = BitFieldVec::new(bit_width, num_vertices);
        for &(e, v) in peeled.iter().rev() {
            let mut val = values(e);
            debug_assert!(bit_width == 64 || val < (1_u64 << bit_width));
            for u in edge(&sigs[e], local_seed, seg_size) {
                if u != v {
                    val ^= data.get(u);
                }
            }
            data.set(v, val);
            pl.light_update();
        }

        Some(data)
    }

    /// Return the value associated with a precomputed signature.
    ///
    /// The signature must have been computed under [the store
    /// seed](SigStore::seed) recorded by this function.
    #[inline(always)]
    pub fn get_by_sig(&self, sig: &[u64; 2]) -> u64 {
        if self.num_keys == 0 {
            return 0;
        }
        let e = edge(sig, self.local_seed, self.seg_size);
        self.data.get(e[0]) ^ self.data.get(e[1]) ^ self.data.get(e[2])
    }

    /// Return the value associated with a key.
    #[inline(always)]
    pub fn get<T: ToSig + ?Sized>(&self, key: &T) -> u64 {
        self.get_by_sig(&T::to_sig(key, self.seed))
    }

    /// Return the seed of the store this function was built from.
    #[inline(always)]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the number of keys this function was built on.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.num_keys
    }

    /// Return the bit width of the stored values.
    #[inline(always)]
    pub fn bit_width(&self) -> usize {
        self.data.bit_width()
    }

    /// Return the number of bits used by this structure.
    pub fn num_bits(&self) -> usize {
        self.data.num_bits()
    }
}
