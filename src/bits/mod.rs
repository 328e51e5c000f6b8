/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Structures for [bit vectors](`mod@bit_vec`), [vectors of values of
//! bounded bit width](`mod@bit_field_vec`) and [key-to-bit-vector
//! transformation strategies](`mod@transform`).

pub mod bit_field_vec;
pub use bit_field_vec::*;

pub mod bit_vec;
pub use bit_vec::*;

pub mod transform;
pub use transform::*;
