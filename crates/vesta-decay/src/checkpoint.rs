//! Global checkpoint engine: the aggregate voting-power curve.
//!
//! The curve is stored as a history of [`Point`]s indexed by epoch plus a
//! schedule of slope changes keyed by week-aligned timestamps. Every lock
//! ending at `t` registers a negative slope delta at `t`, so replaying the
//! schedule week by week from the latest point reproduces the aggregate
//! exactly: between two week boundaries the curve is linear.
//!
//! Replay work is bounded by `max_iterations` week steps. A replay that
//! cannot reach its target reports [`ReplayOutcome::Partial`] instead of
//! guessing.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vesta_core::constants::{floor_week, MAX_CHECKPOINT_ITERATIONS, WEEK};
use vesta_core::error::DecayError;
use vesta_core::types::{Lock, Point};

use crate::contribution::Contribution;

/// A lock's state before and after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockChange {
    pub old: Lock,
    pub new: Lock,
}

impl LockChange {
    pub fn new(old: Lock, new: Lock) -> Self {
        Self { old, new }
    }
}

/// Result of replaying the curve towards a target time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayOutcome {
    /// The latest point is at the target time.
    CaughtUp,
    /// The iteration cap was hit; the latest point is at `reached`.
    Partial { reached: u64 },
}

/// Points and slope updates computed against the current state, ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointPlan {
    points: Vec<Point>,
    slope_updates: BTreeMap<u64, i128>,
    outcome: ReplayOutcome,
}

impl CheckpointPlan {
    pub fn outcome(&self) -> ReplayOutcome {
        self.outcome
    }
}

struct Replay {
    last: Point,
    intermediates: Vec<Point>,
    outcome: ReplayOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointEngine {
    /// `points[epoch]`; epoch 0 is the genesis point.
    points: Vec<Point>,
    /// Signed (non-positive) slope deltas applied when replay reaches the key.
    slope_changes: BTreeMap<u64, i128>,
    max_iterations: usize,
}

impl CheckpointEngine {
    /// Engine whose genesis point sits at `deploy_time`.
    pub fn new(deploy_time: u64) -> Self {
        Self::with_max_iterations(deploy_time, MAX_CHECKPOINT_ITERATIONS)
    }

    /// Same as [`new`](Self::new) with a custom replay cap (at least 1).
    pub fn with_max_iterations(deploy_time: u64, max_iterations: usize) -> Self {
        Self {
            points: vec![Point::new(0, 0, deploy_time)],
            slope_changes: BTreeMap::new(),
            max_iterations: max_iterations.max(1),
        }
    }

    // --- views ---

    /// Current epoch (index of the latest point).
    pub fn epoch(&self) -> u64 {
        (self.points.len() - 1) as u64
    }

    pub fn point(&self, epoch: u64) -> Option<&Point> {
        usize::try_from(epoch).ok().and_then(|i| self.points.get(i))
    }

    pub fn last_point(&self) -> &Point {
        // points is never empty: genesis is pushed at construction.
        &self.points[self.points.len() - 1]
    }

    /// Scheduled slope delta at `t` (0 when none).
    pub fn slope_change(&self, t: u64) -> i128 {
        self.slope_changes.get(&t).copied().unwrap_or(0)
    }

    /// Total magnitude of slope changes scheduled strictly after `now`.
    pub fn pending_slope_total(&self, now: u64) -> u128 {
        self.slope_changes
            .range((Bound::Excluded(now), Bound::Unbounded))
            .fold(0u128, |acc, (_, d)| acc.saturating_add(d.unsigned_abs()))
    }

    /// Aggregate voting power at `t`.
    ///
    /// Replays from the latest stored point at or before `t`. Times before the
    /// genesis point have no power.
    pub fn total_power_at(&self, t: u64) -> Result<u128, DecayError> {
        let idx = self.points.partition_point(|p| p.timestamp <= t);
        if idx == 0 {
            return Ok(0);
        }
        let mut last = self.points[idx - 1];
        let mut t_i = floor_week(last.timestamp);
        let mut steps = 0usize;
        while last.timestamp < t {
            if steps == self.max_iterations {
                return Err(DecayError::ReplayLimit {
                    reached: last.timestamp,
                    target: t,
                });
            }
            steps += 1;
            t_i += WEEK;
            let d_slope = if t_i > t {
                t_i = t;
                0
            } else {
                self.slope_change(t_i)
            };
            advance(&mut last, t_i, d_slope)?;
        }
        Ok(last.bias.max(0) as u128)
    }

    /// Fail unless a replay to `now` fits within the iteration cap.
    pub fn ensure_can_catch_up(&self, now: u64) -> Result<(), DecayError> {
        let last = self.last_point().timestamp;
        if now < last {
            return Err(DecayError::TimeRegression { now, last });
        }
        let start = floor_week(last);
        let required = (now - start).div_ceil(WEEK);
        let cap = self.max_iterations as u64;
        if now > last && required > cap {
            return Err(DecayError::ReplayLimit {
                reached: start + cap * WEEK,
                target: now,
            });
        }
        Ok(())
    }

    // --- replay ---

    fn replay(&self, now: u64) -> Result<Replay, DecayError> {
        let mut last = *self.last_point();
        if now < last.timestamp {
            return Err(DecayError::TimeRegression {
                now,
                last: last.timestamp,
            });
        }
        let mut intermediates = Vec::new();
        let mut t_i = floor_week(last.timestamp);
        let mut steps = 0usize;
        while last.timestamp < now {
            if steps == self.max_iterations {
                return Ok(Replay {
                    last,
                    intermediates,
                    outcome: ReplayOutcome::Partial {
                        reached: last.timestamp,
                    },
                });
            }
            steps += 1;
            t_i += WEEK;
            let d_slope = if t_i > now {
                t_i = now;
                0
            } else {
                self.slope_change(t_i)
            };
            advance(&mut last, t_i, d_slope)?;
            if t_i < now && d_slope != 0 {
                intermediates.push(last);
            }
        }
        Ok(Replay {
            last,
            intermediates,
            outcome: ReplayOutcome::CaughtUp,
        })
    }

    /// Plan a checkpoint at `now` that applies `changes`.
    ///
    /// Fails with [`DecayError::ReplayLimit`] if the curve cannot be brought
    /// up to `now` first. Nothing is modified until [`commit`](Self::commit).
    pub fn plan(&self, now: u64, changes: &[LockChange]) -> Result<CheckpointPlan, DecayError> {
        let Replay {
            mut last,
            mut intermediates,
            outcome,
        } = self.replay(now)?;
        if let ReplayOutcome::Partial { reached } = outcome {
            return Err(DecayError::ReplayLimit {
                reached,
                target: now,
            });
        }

        let mut slope_updates = BTreeMap::new();
        for change in changes {
            self.apply_change(&mut last, &mut slope_updates, change, now)?;
        }

        intermediates.push(last);
        Ok(CheckpointPlan {
            points: intermediates,
            slope_updates,
            outcome,
        })
    }

    fn apply_change(
        &self,
        last: &mut Point,
        updates: &mut BTreeMap<u64, i128>,
        change: &LockChange,
        now: u64,
    ) -> Result<(), DecayError> {
        let old = Contribution::of(&change.old, now)?;
        let new = Contribution::of(&change.new, now)?;

        let slope_delta = new.slope.checked_sub(old.slope).ok_or(DecayError::ArithmeticOverflow)?;
        let bias_delta = new.bias.checked_sub(old.bias).ok_or(DecayError::ArithmeticOverflow)?;
        last.slope = last
            .slope
            .checked_add(slope_delta)
            .ok_or(DecayError::ArithmeticOverflow)?
            .max(0);
        last.bias = last
            .bias
            .checked_add(bias_delta)
            .ok_or(DecayError::ArithmeticOverflow)?
            .max(0);

        let scheduled = |updates: &BTreeMap<u64, i128>, t: u64| {
            updates.get(&t).copied().unwrap_or_else(|| self.slope_change(t))
        };

        if change.old.end > now {
            let mut old_dslope = scheduled(&*updates, change.old.end)
                .checked_add(old.slope)
                .ok_or(DecayError::ArithmeticOverflow)?;
            if change.new.end == change.old.end {
                old_dslope = old_dslope
                    .checked_sub(new.slope)
                    .ok_or(DecayError::ArithmeticOverflow)?;
            }
            updates.insert(change.old.end, old_dslope);
        }
        if change.new.end > now && change.new.end > change.old.end {
            let new_dslope = scheduled(&*updates, change.new.end)
                .checked_sub(new.slope)
                .ok_or(DecayError::ArithmeticOverflow)?;
            updates.insert(change.new.end, new_dslope);
        }
        Ok(())
    }

    /// Apply a plan produced by [`plan`](Self::plan) against the current state.
    pub fn commit(&mut self, plan: CheckpointPlan) -> ReplayOutcome {
        for (t, d) in plan.slope_updates {
            if d == 0 {
                self.slope_changes.remove(&t);
            } else {
                self.slope_changes.insert(t, d);
            }
        }
        for point in plan.points {
            self.store(point);
        }
        let head = self.last_point();
        debug!(
            epoch = self.epoch(),
            bias = head.bias,
            slope = head.slope,
            timestamp = head.timestamp,
            "checkpoint committed"
        );
        plan.outcome
    }

    /// Replay to `now` without any lock change, persisting partial progress.
    pub fn checkpoint(&mut self, now: u64) -> Result<ReplayOutcome, DecayError> {
        let Replay {
            last,
            mut intermediates,
            outcome,
        } = self.replay(now)?;
        if let ReplayOutcome::Partial { reached } = outcome {
            warn!(reached, target = now, "checkpoint replay hit iteration cap");
        }
        intermediates.push(last);
        Ok(self.commit(CheckpointPlan {
            points: intermediates,
            slope_updates: BTreeMap::new(),
            outcome,
        }))
    }

    /// Overwrite the latest non-genesis point when timestamps match, else append.
    fn store(&mut self, point: Point) {
        let len = self.points.len();
        if len > 1 && self.points[len - 1].timestamp == point.timestamp {
            self.points[len - 1] = point;
        } else {
            self.points.push(point);
        }
    }
}

/// Move `last` forward to `t` along its slope, then apply `d_slope`.
fn advance(last: &mut Point, t: u64, d_slope: i128) -> Result<(), DecayError> {
    let dt = i128::from(t - last.timestamp);
    let decay = last.slope.checked_mul(dt).ok_or(DecayError::ArithmeticOverflow)?;
    last.bias = last.bias.checked_sub(decay).ok_or(DecayError::ArithmeticOverflow)?.max(0);
    last.slope = last.slope.checked_add(d_slope).ok_or(DecayError::ArithmeticOverflow)?.max(0);
    last.timestamp = t;
    Ok(())
}
