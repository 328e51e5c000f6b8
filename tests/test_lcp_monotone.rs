/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::collections::BTreeSet;

use anyhow::Result;
use dsi_progress_logger::*;
use mmphf::bits::{FixedU32, FixedU64, PrefixFreeIso};
use mmphf::mph::{BuildError, LcpMonotoneMphf, LcpMonotoneMphfBuilder};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_binary_integers() -> Result<()> {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Info)
        .try_init();

    let mut pl = ProgressLogger::default();

    // 32-bit binary representations of 0..1000, buckets of 8.
    let keys: Vec<u32> = (0..1000).collect();
    let mphf: LcpMonotoneMphf<u32, FixedU32> = LcpMonotoneMphfBuilder::default()
        .log2_bucket_size(3)
        .try_build(&keys, FixedU32, &mut pl)?;
    assert_eq!(mphf.size(), 1000);
    assert_eq!(mphf.bucket_size(), 8);
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(mphf.rank(key), i, "error at key {}", i);
    }
    Ok(())
}

#[test]
fn test_various_sizes_and_buckets() -> Result<()> {
    let mut pl = ProgressLogger::default();
    for n in [1_u64, 2, 5, 100, 1000] {
        let keys: Vec<u64> = (0..n).map(|i| i * i + 3).collect();
        // Derived bucket size.
        let mphf: LcpMonotoneMphf<u64, FixedU64> =
            LcpMonotoneMphfBuilder::default().try_build(&keys, FixedU64, &mut pl)?;
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(mphf.rank(key), i);
        }
        // Forced bucket sizes, including degenerate ones.
        for log2_bucket_size in [0, 1, 4, 10] {
            let mphf: LcpMonotoneMphf<u64, FixedU64> = LcpMonotoneMphfBuilder::default()
                .log2_bucket_size(log2_bucket_size)
                .try_build(&keys, FixedU64, &mut pl)?;
            for (i, key) in keys.iter().enumerate() {
                assert_eq!(mphf.rank(key), i);
            }
        }
    }
    Ok(())
}

#[test]
fn test_strings() -> Result<()> {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Info)
        .try_init();

    let mut rng = SmallRng::seed_from_u64(0);
    let mut set = BTreeSet::new();
    while set.len() < 2000 {
        let len = rng.random_range(1..=12);
        let s: String = (0..len)
            .map(|_| rng.random_range(b'a'..=b'z') as char)
            .collect();
        set.insert(s);
    }
    let keys: Vec<String> = set.into_iter().collect();

    let mphf: LcpMonotoneMphf<String, PrefixFreeIso> = LcpMonotoneMphfBuilder::default()
        .try_build(&keys, PrefixFreeIso, no_logging![])?;
    assert!(mphf.num_bits() > 0);
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(mphf.rank(key), i, "error at key {}", key);
    }
    Ok(())
}

#[test]
fn test_empty() -> Result<()> {
    let keys: Vec<u64> = vec![];
    let mphf: LcpMonotoneMphf<u64, FixedU64> =
        LcpMonotoneMphfBuilder::default().try_build(&keys, FixedU64, no_logging![])?;
    assert_eq!(mphf.size(), 0);
    assert_eq!(mphf.num_bits(), 0);
    assert_eq!(mphf.rank(&42), usize::MAX);

    // The default return value is configurable.
    let mphf: LcpMonotoneMphf<u64, FixedU64> = LcpMonotoneMphfBuilder::default()
        .def_ret_value(12345)
        .try_build(&keys, FixedU64, no_logging![])?;
    assert_eq!(mphf.rank(&42), 12345);
    Ok(())
}

#[test]
fn test_singleton() -> Result<()> {
    let keys = ["just one"];
    let mphf: LcpMonotoneMphf<str, PrefixFreeIso> =
        LcpMonotoneMphfBuilder::default().try_build(keys, PrefixFreeIso, no_logging![])?;
    assert_eq!(mphf.size(), 1);
    assert_eq!(mphf.rank("just one"), 0);
    Ok(())
}

#[test]
fn test_seeds_agree() -> Result<()> {
    // Different seeds give different layouts but identical ranks.
    let keys: Vec<u64> = (0..500).map(|i| i * 3).collect();
    for seed in [0, 1, 0xdeadbeef] {
        let mphf: LcpMonotoneMphf<u64, FixedU64> = LcpMonotoneMphfBuilder::default()
            .seed(seed)
            .try_build(&keys, FixedU64, no_logging![])?;
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(mphf.rank(key), i);
        }
    }
    Ok(())
}

#[test]
#[cfg(feature = "slow_tests")]
fn test_large() -> Result<()> {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Info)
        .try_init();

    let mut pl = ProgressLogger::default();
    let keys: Vec<u64> = (0..1_000_000).map(|i| i * 13 + 1).collect();
    let mphf: LcpMonotoneMphf<u64, FixedU64> =
        LcpMonotoneMphfBuilder::default().try_build(&keys, FixedU64, &mut pl)?;
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(mphf.rank(key), i);
    }
    Ok(())
}

#[test]
fn test_fatal_inputs() {
    let res: Result<LcpMonotoneMphf<str, PrefixFreeIso>, _> =
        LcpMonotoneMphfBuilder::default().try_build(["b", "a"], PrefixFreeIso, no_logging![]);
    assert!(matches!(res, Err(BuildError::NotSorted { pos: 1 })));

    let res: Result<LcpMonotoneMphf<str, PrefixFreeIso>, _> =
        LcpMonotoneMphfBuilder::default().try_build(["a", "a"], PrefixFreeIso, no_logging![]);
    assert!(matches!(res, Err(BuildError::DuplicateKey { pos: 1 })));
}
