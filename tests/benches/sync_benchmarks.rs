//! # Meridian Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | Hasher | Double digest of a sealed block |
//! | Merkle | Root over growing transaction sets |
//! | Chain sync | Majority selection over a full fan-out round |
//! | Chain sync | Fork-point search over a scan window |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mc_chain_sync::{choose, find_fork_point};
use shared_crypto::{hash, merkle_root};
use shared_types::fixtures::{build_chain, fork_chain, sample_transactions};
use shared_types::{Block, BlockInfoResponse};

fn bench_block_hash(c: &mut Criterion) {
    let block = build_chain(2, 1).remove(1);
    c.bench_function("hash_block", |b| b.iter(|| hash(black_box(&block))));
}

fn bench_merkle_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("merkle_root");
    for size in [10u64, 100, 1_000] {
        let transactions = sample_transactions(size, 1);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &transactions, |b, txs| {
            b.iter(|| merkle_root(black_box(txs)))
        });
    }
    group.finish();
}

fn infos(chain: &[Block]) -> Vec<shared_types::BlockInfo> {
    chain.iter().map(Block::info).collect()
}

fn bench_majority_selection(c: &mut Criterion) {
    let main = build_chain(60, 1);
    let fork = fork_chain(&main, 40, 60, 2);
    let mut group = c.benchmark_group("choose");
    for peers in [5usize, 25, 50] {
        let responses: Vec<BlockInfoResponse> = (0..peers)
            .map(|i| {
                let chain = if i % 3 == 0 { &fork } else { &main };
                BlockInfoResponse::new(format!("peer-{i}"), infos(&chain[10..]))
            })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(peers), &responses, |b, r| {
            b.iter(|| choose(black_box(r.clone())))
        });
    }
    group.finish();
}

fn bench_fork_point(c: &mut Criterion) {
    let main = build_chain(60, 1);
    let fork = fork_chain(&main, 45, 60, 2);
    let local = infos(&main[40..50]);
    let peer = infos(&fork[40..]);
    c.bench_function("find_fork_point", |b| {
        b.iter(|| find_fork_point(black_box(&local), black_box(&peer)))
    });
}

criterion_group!(
    benches,
    bench_block_hash,
    bench_merkle_root,
    bench_majority_selection,
    bench_fork_point
);
criterion_main!(benches);
