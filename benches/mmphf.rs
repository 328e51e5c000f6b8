/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use criterion::{criterion_group, criterion_main, Criterion};
use dsi_progress_logger::no_logging;
use mmphf::bits::FixedU64;
use mmphf::mph::{LcpMonotoneMphf, LcpMonotoneMphfBuilder, PacoTrieDistributor};
use std::hint::black_box;

fn bench_rank(c: &mut Criterion) {
    let keys: Vec<u64> = (0..100_000).map(|i| i * 7 + 3).collect();

    let mphf: LcpMonotoneMphf<u64, FixedU64> = LcpMonotoneMphfBuilder::default()
        .try_build(&keys, FixedU64, no_logging![])
        .unwrap();
    let trie: PacoTrieDistributor<u64, FixedU64> =
        PacoTrieDistributor::new(&keys, 64, FixedU64, no_logging![]).unwrap();

    let mut i = 0;
    c.bench_function("lcp_monotone_rank", |b| {
        b.iter(|| {
            i = (i + 12345) % keys.len();
            black_box(mphf.rank(black_box(&keys[i])))
        })
    });

    let mut i = 0;
    c.bench_function("paco_trie_rank", |b| {
        b.iter(|| {
            i = (i + 12345) % keys.len();
            black_box(trie.rank(black_box(&keys[i])))
        })
    });
}

criterion_group!(benches, bench_rank);
criterion_main!(benches);
