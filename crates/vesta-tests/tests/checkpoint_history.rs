//! Aggregate curve history over a long sequence of locks.
//!
//! A running model of `(bias, slope)` is advanced alongside the escrow and
//! every stored point is compared against it, including the intermediate
//! points recorded at weeks where locks expire.

use vesta_core::constants::{MAXTIME, WEEK};
use vesta_core::types::Point;
use vesta_decay::checkpoint::ReplayOutcome;
use vesta_escrow::PoolConfig;
use vesta_tests::helpers::*;

/// Running aggregate curve.
#[derive(Clone, Copy, Debug)]
struct Model {
    bias: i128,
    slope: i128,
    t: u64,
}

impl Model {
    fn advance(&mut self, to: u64) {
        self.bias -= self.slope * (to - self.t) as i128;
        self.t = to;
    }

    fn add(&mut self, seg: (i128, i128)) {
        self.bias += seg.0;
        self.slope += seg.1;
    }

    fn expire(&mut self, segs: &[(i128, i128)]) {
        for s in segs {
            self.slope -= s.1;
        }
    }

    fn point(&self) -> Point {
        Point::new(self.bias, self.slope, self.t)
    }
}

fn harness() -> Harness {
    let h = Harness::new(PoolConfig {
        provider: admin(),
        reward_per_block: 100_000_000_000_000_000,
        start_block: 0,
        end_block: 1_000,
    });
    h.fund(&addr(0x01), 100_000_000 * UNIT);
    h
}

#[test]
fn point_history_follows_locks_and_expiries() {
    let mut h = harness();
    let tester = addr(0x01);
    let mut balance = h.balance(&tester);
    let mut model = Model { bias: 0, slope: 0, t: T0 };

    // (start, unlock, amount in units)
    let locks = [
        (at(1, 1), at(20, 0), 10u128),
        (at(1, 6), at(25, 0), 5),
        (at(6, 3), at(30, 0), 7),
        (at(8, 2), at(10, 0), 30),
        (at(8, 3), at(10, 0), 23),
        (at(8, 4), at(11, 0), 92),
        (at(8, 5), at(11, 0), 18),
        (at(8, 6), at(11, 0), 12),
        (at(10, 0), at(35, 0), 215),
        (at(10, 2), at(25, 0), 11),
        (at(10, 3), at(20, 0), 115),
        (at(11, 1), at(20, 0), 51),
        (at(11, 2), at(30, 0), 16),
        (at(11, 3), at(25, 0), 6),
    ];
    let segs: Vec<(i128, i128)> = locks
        .iter()
        .map(|&(start, end, units)| segment(units * UNIT, end - start))
        .collect();

    let mut epoch = 0u64;
    for (i, &(start, end, units)) in locks.iter().enumerate() {
        // Weeks crossed since the previous lock.
        match i {
            8 => {
                model.advance(at(10, 0));
                model.expire(&[segs[3], segs[4]]);
            }
            11 => {
                model.advance(at(11, 0));
                model.expire(&[segs[5], segs[6], segs[7]]);
                epoch += 1;
                assert_eq!(h.escrow.point(epoch), Some(model.point()), "intermediate at week 11");
            }
            _ => {}
        }

        let amount = units * UNIT;
        let id = h
            .escrow
            .create_lock(&cx(tester, start, i as u64 + 1), amount, end)
            .unwrap();
        assert_eq!(id, i as u64 + 1);
        balance -= amount;
        assert_eq!(h.balance(&tester), balance);

        model.advance(start);
        model.add(segs[i]);
        epoch += 1;
        assert_eq!(h.escrow.epoch(), epoch, "lock {}", i + 1);
        assert_eq!(h.escrow.point(epoch), Some(model.point()), "lock {}", i + 1);
    }
    assert_eq!(epoch, 15);

    // Expiries at weeks 20, 25 and 30 land as intermediate points.
    let expiries = [
        (at(20, 0), vec![segs[11], segs[10], segs[0]]),
        (at(25, 0), vec![segs[13], segs[9], segs[1]]),
        (at(30, 0), vec![segs[12], segs[2]]),
    ];
    let mut expected = Vec::new();
    for (t, ended) in &expiries {
        model.advance(*t);
        model.expire(ended);
        expected.push(model.point());
    }
    model.advance(at(32, 0));

    let outcome = h.escrow.checkpoint(&cx(tester, at(32, 0), 20)).unwrap();
    assert_eq!(outcome, ReplayOutcome::CaughtUp);
    assert_eq!(h.escrow.epoch(), 19);
    for (k, point) in expected.iter().enumerate() {
        assert_eq!(h.escrow.point(16 + k as u64), Some(*point));
    }
    assert_eq!(h.escrow.point(19), Some(model.point()));
    assert_eq!(h.escrow.point(19).unwrap().slope, segs[8].1);
    assert_eq!(h.escrow.total_power_at(at(32, 0)).unwrap(), model.bias as u128);

    // Only lock 9 remains scheduled.
    assert_eq!(h.escrow.slope_change(at(35, 0)), -segs[8].1);
    assert_eq!(h.escrow.pending_slope_total(at(32, 0)), segs[8].1 as u128);
}

#[test]
fn locks_sharing_a_timestamp_share_one_point() {
    let mut h = harness();
    let tester = addr(0x01);
    let t = weeks_tenths(11);
    let units = [20u128, 6, 15];
    let ends = [at(20, 0), at(17, 0), at(25, 0)];
    for (u, end) in units.iter().zip(ends) {
        h.escrow
            .create_lock(&cx(tester, t, 1), u * MAXTIME as u128, end)
            .unwrap();
    }
    assert_eq!(h.escrow.epoch(), 1);
    let point = h.escrow.point(1).unwrap();
    assert_eq!(point.timestamp, t);
    assert_eq!(point.slope, 20 + 6 + 15);
    let bias: i128 = units
        .iter()
        .zip(ends)
        .map(|(u, end)| *u as i128 * (end - t) as i128)
        .sum();
    assert_eq!(point.bias, bias);
}

/// Eight locks in three batches, then withdrawals once some have expired.
/// Amounts are whole multiples of `MAXTIME` so slopes are exact.
fn withdraw_fixture() -> (Harness, Vec<(u64, u64, i128)>) {
    let mut h = harness();
    let tester = addr(0x01);
    let locks = vec![
        (weeks_tenths(11), at(20, 0), 20i128),
        (weeks_tenths(11), at(17, 0), 6),
        (weeks_tenths(11), at(25, 0), 15),
        (weeks_tenths(23), at(20, 0), 5),
        (weeks_tenths(23), at(16, 0), 21),
        (weeks_tenths(56), at(25, 0), 36),
        (weeks_tenths(56), at(16, 0), 12),
        (weeks_tenths(56), at(21, 0), 16),
    ];
    for &(start, end, slope) in &locks {
        h.escrow
            .create_lock(&cx(tester, start, 1), slope as u128 * MAXTIME as u128, end)
            .unwrap();
    }
    (h, locks)
}

/// Live `(bias, slope)` at `t` over `locks`, skipping the withdrawn ones.
fn live_curve(locks: &[(u64, u64, i128)], withdrawn: &[usize], t: u64) -> (i128, i128) {
    locks
        .iter()
        .enumerate()
        .filter(|(i, l)| !withdrawn.contains(i) && l.1 > t)
        .fold((0, 0), |(b, s), (_, &(_, end, slope))| {
            (b + slope * (end - t) as i128, s + slope)
        })
}

#[test]
fn withdraw_at_expiry_keeps_schedule_consistent() {
    let (mut h, mut locks) = withdraw_fixture();
    let tester = addr(0x01);
    let now = at(20, 0);
    let before = h.balance(&tester);

    let new_lock = (now, at(30, 0), 7i128);
    h.escrow
        .create_lock(&cx(tester, now, 2), 7 * MAXTIME as u128, new_lock.1)
        .unwrap();
    let returned = h.escrow.withdraw(&cx(tester, now, 2), 1).unwrap();
    locks.push(new_lock);

    assert_eq!(returned, 20 * MAXTIME as u128);
    assert_eq!(h.balance(&tester), before - 7 * MAXTIME as u128 + returned);
    assert_eq!(h.escrow.lock(1).amount, 0);
    assert_eq!(h.escrow.lock(1).end, 0);

    let (bias, slope) = live_curve(&locks, &[0], now);
    let point = h.escrow.point(h.escrow.epoch()).unwrap();
    assert_eq!(point, Point::new(bias, slope, now));

    for week in 21..=35 {
        assert_eq!(h.escrow.slope_change(at(week, 0) - WEEK / 2), 0);
        let scheduled: i128 = locks
            .iter()
            .filter(|l| l.1 == at(week, 0))
            .map(|l| -l.2)
            .sum();
        assert_eq!(h.escrow.slope_change(at(week, 0)), scheduled, "week {week}");
    }
}

#[test]
fn withdraw_long_expired_lock() {
    let (mut h, locks) = withdraw_fixture();
    let tester = addr(0x01);
    let now = weeks_tenths(205);

    let returned = h.escrow.withdraw(&cx(tester, now, 2), 7).unwrap();
    assert_eq!(returned, 12 * MAXTIME as u128);

    let (bias, slope) = live_curve(&locks, &[6], now);
    let point = h.escrow.point(h.escrow.epoch()).unwrap();
    assert_eq!(point, Point::new(bias, slope, now));
    assert_eq!(h.escrow.slope_change(at(21, 0)), -16);
    assert_eq!(h.escrow.slope_change(at(25, 0)), -(15 + 36));
    assert_eq!(h.escrow.supply(), locks.iter().map(|l| l.2 as u128).sum::<u128>() * MAXTIME as u128 - returned);
}

#[test]
fn replay_across_cap_resumes() {
    let mut config = vesta_escrow::EscrowConfig {
        escrow_address: escrow_account(),
        deploy_time: T0,
        ..vesta_escrow::EscrowConfig::default()
    };
    config.max_checkpoint_iterations = 4;
    let mut h = Harness::with_config(config);
    let tester = addr(0x01);
    h.fund(&tester, 1_000 * MAXTIME as u128);
    h.escrow
        .create_lock(&cx(tester, T0, 1), 10 * MAXTIME as u128, at(3, 0))
        .unwrap();

    let target = at(10, 0);
    assert_eq!(
        h.escrow.checkpoint(&cx(tester, target, 2)).unwrap(),
        ReplayOutcome::Partial { reached: at(4, 0) }
    );
    // Ops at the target stay blocked until the curve catches up.
    assert!(h.escrow.create_lock(&cx(tester, target, 3), MAXTIME as u128, at(20, 0)).is_err());
    assert_eq!(
        h.escrow.checkpoint(&cx(tester, target, 4)).unwrap(),
        ReplayOutcome::Partial { reached: at(8, 0) }
    );
    assert_eq!(h.escrow.checkpoint(&cx(tester, target, 5)).unwrap(), ReplayOutcome::CaughtUp);
    assert_eq!(h.escrow.total_power_at(target).unwrap(), 0);
    h.escrow
        .create_lock(&cx(tester, target, 6), MAXTIME as u128, at(20, 0))
        .unwrap();
}
