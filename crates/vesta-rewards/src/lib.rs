//! # vesta-rewards
//! Block-driven reward accrual for staked lock positions.

pub mod accumulator;

pub use accumulator::{reward, RewardAccumulator};
