//! Core protocol types: locks, checkpoints, reward pool and stake slots.
//!
//! Token amounts are `u128` in the locked token's smallest unit. Voting power
//! (`bias`) and decay rates (`slope`) are signed so intermediate arithmetic in
//! the checkpoint engine can be floored instead of wrapping.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Identifier of a lock position. Sequential, starting at 1.
pub type PositionId = u64;

/// Externally supplied call environment: who is calling, and at which
/// timestamp and block height the call executes.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallContext {
    /// The address invoking the operation.
    pub caller: Address,
    /// Unix timestamp of the executing block.
    pub timestamp: u64,
    /// Height of the executing block.
    pub block: u64,
}

impl CallContext {
    pub fn new(caller: Address, timestamp: u64, block: u64) -> Self {
        Self {
            caller,
            timestamp,
            block,
        }
    }
}

/// Tokens locked by a position and the week-aligned time they unlock.
///
/// `end == 0` means the lock was never created or has been withdrawn.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Lock {
    pub amount: u128,
    pub end: u64,
}

impl Lock {
    /// The empty lock.
    pub const ZERO: Self = Self { amount: 0, end: 0 };

    pub fn new(amount: u128, end: u64) -> Self {
        Self { amount, end }
    }

    /// Whether the lock has been created and not yet withdrawn.
    pub fn exists(&self) -> bool {
        self.end != 0
    }

    /// Whether the lock still contributes voting power at `timestamp`.
    pub fn is_live(&self, timestamp: u64) -> bool {
        self.end > timestamp && self.amount > 0
    }
}

/// A point on the aggregate voting-power curve.
///
/// Between two stored points the curve is linear: power at `t` is
/// `bias - slope * (t - timestamp)`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub bias: i128,
    pub slope: i128,
    pub timestamp: u64,
}

impl Point {
    pub fn new(bias: i128, slope: i128, timestamp: u64) -> Self {
        Self {
            bias,
            slope,
            timestamp,
        }
    }
}

/// The reward pool's parameters and accumulator.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RewardInfo {
    /// Account that funds payouts in the reward token.
    pub provider: Address,
    /// Reward per unit of staked amount, scaled by `Q128`.
    pub acc_reward_per_share: U256,
    /// Reward token units emitted per block across all stakers.
    pub reward_per_block: u128,
    /// Last block folded into `acc_reward_per_share`.
    pub last_touch_block: u64,
    pub start_block: u64,
    pub end_block: u64,
}

/// A staker's single live slot.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StakeSlot {
    /// Pool-wide stake counter value at the time of staking. Never 0 for a live slot.
    pub staking_id: u64,
    pub position_id: PositionId,
    /// Raw locked amount counted in the pool's denominator.
    pub lock_amount: u128,
    /// Position voting power captured at the last stake or collect.
    pub power_snapshot: u128,
    /// Accumulator value at the last stake or collect.
    pub acc_at_last_touch: U256,
}

/// Summary of an address's stake, all zero when the address is not staking.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct StakingInfo {
    pub staking_id: u64,
    pub position_id: PositionId,
    /// The power snapshot the next payout is weighted by.
    pub amount: u128,
}

impl From<Option<StakeSlot>> for StakingInfo {
    fn from(slot: Option<StakeSlot>) -> Self {
        match slot {
            Some(slot) => Self {
                staking_id: slot.staking_id,
                position_id: slot.position_id,
                amount: slot.power_snapshot,
            },
            None => Self::default(),
        }
    }
}
