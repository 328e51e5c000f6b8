/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use dsi_progress_logger::*;
use epserde::prelude::*;
use epserde::utils::AlignedCursor;
use mmphf::bits::{FixedU32, PrefixFreeIso};
use mmphf::mph::{LcpMonotoneMphf, LcpMonotoneMphfBuilder, PacoTrieDistributor};

#[test]
fn test_mphf_round_trip() -> Result<()> {
    let keys: Vec<u32> = (0..1000).map(|i| i * 7 + 1).collect();
    let mphf: LcpMonotoneMphf<u32, FixedU32> =
        LcpMonotoneMphfBuilder::default().try_build(&keys, FixedU32, no_logging![])?;

    let mut cursor = AlignedCursor::<maligned::A16>::new();
    mphf.serialize(&mut cursor)?;
    cursor.set_position(0);
    let deser = <LcpMonotoneMphf<u32, FixedU32>>::deserialize_full(&mut cursor)?;

    assert_eq!(deser.size(), mphf.size());
    assert_eq!(deser.num_bits(), mphf.num_bits());
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(deser.rank(key), i);
        assert_eq!(deser.rank(key), mphf.rank(key));
    }
    Ok(())
}

#[test]
fn test_distributor_round_trip() -> Result<()> {
    let keys: Vec<String> = (0..300).map(|i| format!("{:08}", i * 3)).collect();
    let trie: PacoTrieDistributor<String, PrefixFreeIso> =
        PacoTrieDistributor::new(&keys, 4, PrefixFreeIso, no_logging![])?;

    let mut cursor = AlignedCursor::<maligned::A16>::new();
    trie.serialize(&mut cursor)?;
    cursor.set_position(0);
    let deser = <PacoTrieDistributor<String, PrefixFreeIso>>::deserialize_full(&mut cursor)?;

    assert_eq!(deser.num_leaves(), trie.num_leaves());
    assert_eq!(deser.offsets(), trie.offsets());
    assert_eq!(deser.num_bits(), trie.num_bits());
    for key in &keys {
        assert_eq!(deser.rank(key), trie.rank(key));
    }
    Ok(())
}
