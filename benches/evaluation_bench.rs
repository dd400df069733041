//! Criterion benchmarks for trust evaluation.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use travos_trust::prelude::*;
use travos_trust::trust::{confidence, experience};

/// `users` users with a record for every ordered pair and `observations`
/// observations cycling through sender/recipient pairs.
fn make_scenario(users: usize, observations: usize) -> Scenario {
    let names: Vec<String> = (0..users).map(|i| format!("u{i}")).collect();
    let mut builder = Scenario::builder().users(names.iter().map(String::as_str));

    for (i, observer) in names.iter().enumerate() {
        for (j, subject) in names.iter().enumerate() {
            if i != j {
                builder = builder.history(observer.as_str(), subject.as_str(), (i * 7 + j) as u64 % 13, (i + j) as u64 % 5);
            }
        }
    }
    for k in 0..observations {
        let sender = k % users;
        let recipient = (k + 1 + k / users) % users;
        let recipient = if recipient == sender { (sender + 1) % users } else { recipient };
        builder = builder.observe(names[sender].as_str(), names[recipient].as_str(), format!("m{k}"));
    }
    builder.build().unwrap_or_else(|e| panic!("bench scenario: {e}"))
}

fn bench_confidence(c: &mut Criterion) {
    let sparse = HistoryEntry::new(2, 1);
    let dense = HistoryEntry::new(900, 100);

    c.bench_function("confidence_sparse_history", |bench| {
        bench.iter(|| confidence(experience(sparse), black_box(sparse)))
    });
    c.bench_function("confidence_dense_history", |bench| {
        bench.iter(|| confidence(experience(dense), black_box(dense)))
    });
}

fn bench_batch(c: &mut Criterion) {
    let scenario = make_scenario(20, 500);
    let sequential = BatchEvaluator::default().parallel(false);
    let parallel = BatchEvaluator::default().parallel(true);

    c.bench_function("batch_20_users_500_observations_sequential", |bench| {
        bench.iter(|| sequential.evaluate(black_box(&scenario)))
    });
    c.bench_function("batch_20_users_500_observations_parallel", |bench| {
        bench.iter(|| parallel.evaluate(black_box(&scenario)))
    });
}

criterion_group!(benches, bench_confidence, bench_batch);
criterion_main!(benches);
