/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Transformation strategies turning keys into bit vectors.

Structures ranking keys bit by bit do not work on the original keys, but on
a [`BitVec`] view of them produced by a [`BitTransform`]. A transformation
must be *monotone* (bit-vector order must agree with key order) and
*prefix-free* (no transformed key may be a proper prefix of another), since
path compaction and ranking rely on both properties.

Bytes and fixed-width integers are emitted most-significant bit first, so
that bit-lexicographic order coincides with the natural order of the keys.

*/

use epserde::*;
use mem_dbg::*;

use crate::bits::BitVec;

/// A strategy turning keys of type `T` into bit vectors.
pub trait BitTransform<T: ?Sized> {
    /// Return the bit-vector view of `key`.
    fn to_bit_vec(&self, key: &T) -> BitVec;

    /// Return the number of bits of metadata stored by this strategy.
    fn num_bits(&self) -> usize {
        0
    }
}

/// The identity strategy for keys that are bit vectors already.
#[derive(Epserde, Debug, Clone, Copy, Default, MemDbg, MemSize)]
pub struct Identity;

impl BitTransform<BitVec> for Identity {
    #[inline(always)]
    fn to_bit_vec(&self, key: &BitVec) -> BitVec {
        key.clone()
    }
}

/// A strategy mapping each character to its lower eight bits,
/// most-significant bit first, followed by a NUL terminator.
///
/// The terminator makes the resulting bit vectors prefix-free even when one
/// string is a prefix of another; for the same reason keys must not contain
/// NUL characters.
#[derive(Epserde, Debug, Clone, Copy, Default, MemDbg, MemSize)]
pub struct PrefixFreeIso;

fn iso_bits(bytes: &[u8]) -> BitVec {
    let mut bv = BitVec::with_capacity((bytes.len() + 1) * 8);
    for &b in bytes {
        debug_assert!(b != 0, "keys must not contain NUL characters");
        bv.push_bits((b as u64).reverse_bits() >> 56, 8);
    }
    bv.push_bits(0, 8);
    bv
}

impl BitTransform<str> for PrefixFreeIso {
    fn to_bit_vec(&self, key: &str) -> BitVec {
        iso_bits(key.as_bytes())
    }
}

impl BitTransform<String> for PrefixFreeIso {
    fn to_bit_vec(&self, key: &String) -> BitVec {
        iso_bits(key.as_bytes())
    }
}

impl BitTransform<[u8]> for PrefixFreeIso {
    fn to_bit_vec(&self, key: &[u8]) -> BitVec {
        iso_bits(key)
    }
}

/// A strategy mapping a 64-bit integer to its 64 bits, most-significant bit
/// first. Fixed width makes the result prefix-free.
#[derive(Epserde, Debug, Clone, Copy, Default, MemDbg, MemSize)]
pub struct FixedU64;

impl BitTransform<u64> for FixedU64 {
    fn to_bit_vec(&self, key: &u64) -> BitVec {
        let mut bv = BitVec::with_capacity(64);
        bv.push_bits(key.reverse_bits(), 64);
        bv
    }
}

impl BitTransform<usize> for FixedU64 {
    fn to_bit_vec(&self, key: &usize) -> BitVec {
        let mut bv = BitVec::with_capacity(64);
        bv.push_bits((*key as u64).reverse_bits(), 64);
        bv
    }
}

/// A strategy mapping a 32-bit integer to its 32 bits, most-significant bit
/// first.
#[derive(Epserde, Debug, Clone, Copy, Default, MemDbg, MemSize)]
pub struct FixedU32;

impl BitTransform<u32> for FixedU32 {
    fn to_bit_vec(&self, key: &u32) -> BitVec {
        let mut bv = BitVec::with_capacity(32);
        bv.push_bits((*key as u64).reverse_bits() >> 32, 32);
        bv
    }
}
