/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Monotone minimal perfect hash functions over static, sorted key sets.

A monotone minimal perfect hash function maps a sorted set of `n` distinct
keys onto `[0..n)` *preserving order*, using asymptotically less space than
the `n` ⌈log `n`⌉ bits of an explicit table. This crate provides:

- [`LcpMonotoneMphf`](mph::LcpMonotoneMphf), a monotone minimal perfect
  hash function based on fixed-size bucketing that uses longest common
  prefixes as bucket identifiers;
- [`PacoTrieDistributor`](mph::PacoTrieDistributor), a succinct partial
  compacted trie stored as a recursive bitstream, ranking keys against the
  delimiters of a sorted key set;
- the supporting machinery: [bit vectors and key
  transformations](mod@bits), [static functions on
  3-hypergraphs](mod@func), [shared-seed signature
  stores](utils::SigStore) and [bit streams with instantaneous
  codes](mod@utils::bit_stream).

All structures are built once from an iterable of keys, are immutable
afterwards, can be serialized with [ε-serde](epserde), and are safe for
concurrent read-only access.

*/

#![deny(unconditional_recursion)]

pub mod bits;
pub mod func;
pub mod mph;
pub mod traits;
pub mod utils;

pub mod prelude {
    pub use crate::bits::*;
    pub use crate::func::*;
    pub use crate::mph::*;
    pub use crate::traits::rank_sel::*;
    pub use crate::utils::*;
}
