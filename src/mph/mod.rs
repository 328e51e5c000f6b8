/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Monotone minimal perfect hash functions.

Structures in this module map a *static, sorted* set of `n` distinct keys
onto `[0..n)` preserving order, using asymptotically less space than an
explicit table. They are built once and immutable afterwards: queries only
read serialized data and perform local arithmetic, so a built structure can
be shared freely across threads.

All builders consume keys through a [`BitTransform`](crate::bits::BitTransform)
and fail fatally on malformed input (out-of-order, duplicate or, where path
compaction requires it, non-prefix-free keys); queries on keys outside the
build set return unspecified values, except where a miss is detectable and a
default value is returned instead.

*/

/// Fatal errors while building a monotone structure.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    /// Two adjacent keys are out of order.
    #[error("Keys are not sorted at position {pos}")]
    NotSorted { pos: usize },
    /// Two adjacent keys are equal.
    #[error("Duplicate key at position {pos}")]
    DuplicateKey { pos: usize },
    /// A key is a proper prefix of its successor.
    #[error("Key at position {pos} has the previous key as a prefix")]
    NotPrefixFree { pos: usize },
    /// An underlying static function could not be built.
    #[error(transparent)]
    Function(#[from] crate::func::SolveError),
}

pub mod paco_trie;
pub use paco_trie::PacoTrieDistributor;

pub mod lcp_monotone;
pub use lcp_monotone::{LcpMonotoneMphf, LcpMonotoneMphfBuilder};
