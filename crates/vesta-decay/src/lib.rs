//! # vesta-decay: Linear voting-power decay.
//!
//! All calculations use integer arithmetic only.
//!
//! - **Per-lock contribution**: a lock decays at `amount / MAXTIME` per second
//!   and reaches zero at its week-aligned end.
//! - **Checkpoint engine**: the aggregate curve over every lock, kept as a
//!   point history plus a schedule of slope changes, replayed week by week
//!   under an iteration cap.

pub mod checkpoint;
pub mod contribution;

pub use checkpoint::{CheckpointEngine, CheckpointPlan, LockChange, ReplayOutcome};
pub use contribution::{slope_of, voting_power, Contribution};
