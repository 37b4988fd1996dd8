//! Evaluation benchmarks using Criterion.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use groupeval_rs::{evaluate_groups, merge_groups, Group, MetricAggregator};

/// Scene with `n` groups of three agents; predictions shift every group by
/// one agent.
fn create_scene(n: i64) -> (Vec<Group<i64>>, Vec<Group<i64>>) {
    let truth = (0..n)
        .map(|g| Group::new(vec![3 * g, 3 * g + 1, 3 * g + 2]))
        .collect();
    let guesses = (0..n)
        .map(|g| Group::new(vec![3 * g + 1, 3 * g + 2, 3 * g + 3]))
        .collect();
    (guesses, truth)
}

/// Chain of `n` two-agent groups, each sharing one agent with the next.
fn create_chain(n: i64) -> Vec<Group<i64>> {
    (0..n).map(|i| Group::new(vec![i, i + 1])).collect()
}

fn benchmark_evaluate_groups_20(c: &mut Criterion) {
    let (guesses, truth) = create_scene(20);

    c.bench_function("evaluate_groups_20_groups", |b| {
        b.iter(|| {
            let mut working = guesses.clone();
            evaluate_groups(black_box(&mut working), black_box(&truth), 2.0 / 3.0, false).ok()
        })
    });
}

fn benchmark_evaluate_groups_non_reusable_100(c: &mut Criterion) {
    let (guesses, truth) = create_scene(100);

    c.bench_function("evaluate_groups_100_groups_non_reusable", |b| {
        b.iter(|| {
            let mut working = guesses.clone();
            evaluate_groups(black_box(&mut working), black_box(&truth), 2.0 / 3.0, true).ok()
        })
    });
}

fn benchmark_merge_chain_200(c: &mut Criterion) {
    let groups = create_chain(200);

    c.bench_function("merge_groups_chain_200", |b| {
        b.iter(|| merge_groups(black_box(groups.clone())))
    });
}

fn benchmark_aggregate_1000_scenes(c: &mut Criterion) {
    c.bench_function("aggregate_1000_scenes_3_slots", |b| {
        b.iter(|| {
            let mut acc = MetricAggregator::new(3);
            for i in 0..1000 {
                let p = (i % 10) as f64 / 10.0;
                acc.record_scene(black_box(&[(p, 1.0 - p), (p, p), (1.0, p)])).ok();
            }
            acc.finalize().ok()
        })
    });
}

criterion_group!(
    benches,
    benchmark_evaluate_groups_20,
    benchmark_evaluate_groups_non_reusable_100,
    benchmark_merge_chain_200,
    benchmark_aggregate_1000_scenes,
);

criterion_main!(benches);
