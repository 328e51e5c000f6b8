/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Utility traits and implementations.

*/

pub mod bit_stream;
pub use bit_stream::*;

pub mod sig_store;
pub use sig_store::*;

pub mod spooky;
pub use spooky::*;
