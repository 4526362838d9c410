//! Criterion benchmarks for vesta-decay critical operations.
//!
//! Covers: a full-cap replay, planning a lock change, and a historical power query.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vesta_core::constants::{floor_week, MAXTIME, WEEK};
use vesta_core::types::Lock;
use vesta_decay::checkpoint::{CheckpointEngine, LockChange};

const DEPLOY: u64 = 2_000 * WEEK;

/// Engine with one lock expiring at each of the next `weeks` boundaries.
fn populated_engine(weeks: u64) -> CheckpointEngine {
    let mut engine = CheckpointEngine::new(DEPLOY);
    for w in 1..=weeks {
        let lock = Lock::new(w as u128 * MAXTIME as u128, floor_week(DEPLOY) + w * WEEK);
        let plan = engine
            .plan(DEPLOY, &[LockChange::new(Lock::ZERO, lock)])
            .expect("plan");
        engine.commit(plan);
    }
    engine
}

fn bench_full_replay(c: &mut Criterion) {
    let engine = populated_engine(200);
    let target = DEPLOY + 250 * WEEK;

    c.bench_function("checkpoint_replay_250_weeks", |b| {
        b.iter_batched(
            || engine.clone(),
            |mut e| e.checkpoint(black_box(target)),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_plan_lock_change(c: &mut Criterion) {
    let engine = populated_engine(50);
    let now = DEPLOY + 10 * WEEK + 77;
    let lock = Lock::new(1_000 * MAXTIME as u128, floor_week(now) + 100 * WEEK);
    let change = [LockChange::new(Lock::ZERO, lock)];

    c.bench_function("checkpoint_plan_create", |b| {
        b.iter(|| engine.plan(black_box(now), black_box(&change)))
    });
}

fn bench_total_power_at(c: &mut Criterion) {
    let engine = populated_engine(100);
    let t = DEPLOY + 60 * WEEK + 3;

    c.bench_function("total_power_at_60_weeks", |b| {
        b.iter(|| engine.total_power_at(black_box(t)))
    });
}

criterion_group!(
    benches,
    bench_full_replay,
    bench_plan_lock_change,
    bench_total_power_at
);
criterion_main!(benches);
