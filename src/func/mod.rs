/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Static functions.

This module contains implementations of static functions, that is,
immutable data structures that store key/value pairs and allow to retrieve
the value associated to a key.

Differently from a dictionary, static functions may return any result on a
key that is not part of the original set of keys. This property makes it
possible to design static functions using space very close to the
theoretical lower bound, which, for a function with `n` keys and a `b`-bit
output, is `n * b + o(n)`.

All functions here are built from a [`SigStore`](crate::utils::SigStore)
and record its seed, so that several functions over the same keys share a
single hashing pass and can be queried with a precomputed signature.

*/

mod mwhc;
pub use mwhc::{Function, SolveError, GAMMA};

mod two_steps;
pub use two_steps::TwoStepsFunction;
