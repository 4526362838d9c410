//! Criterion benchmarks for the reward accumulator.

use alloy_primitives::{Address, U256};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vesta_core::constants::Q128;
use vesta_rewards::accumulator::{reward, RewardAccumulator};

fn bench_touch(c: &mut Criterion) {
    let mut pool = RewardAccumulator::new(Address::repeat_byte(1), 1_000_000_000_000_000_000, 0, 10_000_000);
    pool.add_stake(220_000_000_000_000_000).expect("stake");

    c.bench_function("reward_touch", |b| {
        b.iter(|| pool.touched(black_box(5_000_000)))
    });
}

fn bench_reward(c: &mut Criterion) {
    let acc = Q128 * U256::from(123_456_789u64);

    c.bench_function("reward_payout", |b| {
        b.iter(|| reward(black_box(1_744_038_559_107), U256::ZERO, black_box(acc)))
    });
}

criterion_group!(benches, bench_touch, bench_reward);
criterion_main!(benches);
