/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use dsi_progress_logger::*;
use mmphf::func::{Function, SolveError, TwoStepsFunction};
use mmphf::utils::{SigStore, ToSig};

#[test]
fn test_function() -> Result<()> {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Info)
        .try_init();

    let mut pl = ProgressLogger::default();

    for n in [1_usize, 2, 10, 1000, 100_000] {
        let mut store = SigStore::new(42);
        for i in 0..n {
            store.add(&i);
        }
        let values: Vec<u64> = (0..n).map(|i| (i as u64).wrapping_mul(31) % 1024).collect();
        let func = Function::new(&store, |i| values[i], 10, &mut pl)?;
        assert_eq!(func.size(), n);
        assert!(func.num_bits() > 0);
        for (i, &value) in values.iter().enumerate() {
            assert_eq!(func.get(&i), value, "error at key {}", i);
            assert_eq!(
                func.get_by_sig(&<usize as ToSig>::to_sig(&i, store.seed())),
                value
            );
        }
    }

    Ok(())
}

#[test]
fn test_function_strings() -> Result<()> {
    let keys: Vec<String> = (0..10_000).map(|i| format!("key{}", i)).collect();
    let mut store = SigStore::new(0);
    for key in &keys {
        store.add(key.as_str());
    }
    let func = Function::new(&store, |i| i as u64, 14, no_logging![])?;
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(func.get(key.as_str()), i as u64);
    }
    Ok(())
}

#[test]
fn test_function_empty() -> Result<()> {
    let store = SigStore::new(7);
    let func = Function::new(&store, |_| 0, 7, no_logging![])?;
    assert_eq!(func.size(), 0);
    assert_eq!(func.num_bits(), 0);
    assert_eq!(func.get(&123_usize), 0);
    Ok(())
}

#[test]
fn test_function_zero_width() -> Result<()> {
    // Width zero is legal when all values are zero.
    let mut store = SigStore::new(3);
    for i in 0..100_usize {
        store.add(&i);
    }
    let func = Function::new(&store, |_| 0, 0, no_logging![])?;
    for i in 0..100_usize {
        assert_eq!(func.get(&i), 0);
    }
    assert_eq!(func.num_bits(), 0);
    Ok(())
}

#[test]
fn test_function_duplicate() {
    let mut store = SigStore::new(0);
    for i in 0..100_usize {
        store.add(&i);
    }
    store.add(&50_usize);
    let res = Function::new(&store, |_| 0, 1, no_logging![]);
    assert!(matches!(res, Err(SolveError::DuplicateSignature)));
}

#[test]
fn test_two_steps() -> Result<()> {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Info)
        .try_init();

    let mut pl = ProgressLogger::default();

    for n in [0_usize, 1, 100, 50_000] {
        let mut store = SigStore::new(11);
        for i in 0..n {
            store.add(&i);
        }
        // Heavily skewed values with a long tail, as LCP lengths are.
        let values: Vec<u64> = (0..n)
            .map(|i| if i % 10 == 0 { (i as u64) % 997 } else { 7 })
            .collect();
        let func = TwoStepsFunction::new(&store, |i| values[i], &mut pl)?;
        assert_eq!(func.size(), n);
        for (i, &value) in values.iter().enumerate() {
            assert_eq!(func.get(&i), value, "error at key {}", i);
        }
    }

    Ok(())
}

#[test]
fn test_two_steps_single_value() -> Result<()> {
    // A constant function needs no second level at all.
    let mut store = SigStore::new(0);
    for i in 0..10_000_usize {
        store.add(&i);
    }
    let func = TwoStepsFunction::new(&store, |_| 12, no_logging![])?;
    for i in 0..10_000_usize {
        assert_eq!(func.get(&i), 12);
    }
    Ok(())
}

#[test]
fn test_deterministic() -> Result<()> {
    // Same keys, same seed: bit-identical layout and results.
    let build = || -> Result<Function> {
        let mut store = SigStore::new(99);
        for i in 0..1000_usize {
            store.add(&i);
        }
        Ok(Function::new(&store, |i| i as u64 & 0xff, 8, no_logging![])?)
    };
    let a = build()?;
    let b = build()?;
    for i in 0..1000_usize {
        assert_eq!(a.get(&i), b.get(&i));
    }
    assert_eq!(a.num_bits(), b.num_bits());
    Ok(())
}
