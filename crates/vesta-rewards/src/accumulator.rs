//! Lazy reward accumulator.
//!
//! Rewards stream at `reward_per_block` between `start_block` and `end_block`
//! and are shared across stakers in proportion to their raw locked amount.
//! The accumulator only advances when touched: every touch folds the blocks
//! since the previous touch into `acc_reward_per_share` (scaled by `Q128`).
//!
//! A staker's payout is weighted by the voting-power snapshot taken at its
//! last stake or collect, while the denominator stays the raw amount.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use vesta_core::constants::Q128;
use vesta_core::error::RewardError;
use vesta_core::types::{RewardInfo, StakeSlot};

/// Reward pool state plus the total raw amount currently staked.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardAccumulator {
    info: RewardInfo,
    total_staked: u128,
}

impl RewardAccumulator {
    /// A pool that starts accruing at `start_block`. Callers validate `start_block < end_block`.
    pub fn new(provider: Address, reward_per_block: u128, start_block: u64, end_block: u64) -> Self {
        Self {
            info: RewardInfo {
                provider,
                acc_reward_per_share: U256::ZERO,
                reward_per_block,
                last_touch_block: start_block,
                start_block,
                end_block,
            },
            total_staked: 0,
        }
    }

    pub fn info(&self) -> &RewardInfo {
        &self.info
    }

    /// The denominator: raw locked amount over all staked positions.
    pub fn total_staked(&self) -> u128 {
        self.total_staked
    }

    pub fn acc_reward_per_share(&self) -> U256 {
        self.info.acc_reward_per_share
    }

    /// `block` clamped into the pool's `[start_block, end_block]` window.
    pub fn effective_block(&self, block: u64) -> u64 {
        block.min(self.info.end_block).max(self.info.start_block)
    }

    /// Fold blocks up to `block` into the accumulator.
    ///
    /// With nothing staked the blocks are skipped, not deferred. The touch
    /// block never moves backwards, so lowering `end_block` below it freezes
    /// the pool instead of re-accruing a range.
    pub fn touch(&mut self, block: u64) -> Result<(), RewardError> {
        let effective = self.effective_block(block);
        let last = self.info.last_touch_block;
        if effective <= last {
            return Ok(());
        }
        if self.total_staked > 0 {
            let delta = U256::from(effective - last)
                .checked_mul(U256::from(self.info.reward_per_block))
                .and_then(|v| v.checked_mul(Q128))
                .ok_or(RewardError::ArithmeticOverflow)?
                / U256::from(self.total_staked);
            self.info.acc_reward_per_share = self
                .info
                .acc_reward_per_share
                .checked_add(delta)
                .ok_or(RewardError::ArithmeticOverflow)?;
        }
        self.info.last_touch_block = effective;
        debug!(
            block,
            effective,
            total_staked = self.total_staked,
            acc = %self.info.acc_reward_per_share,
            "reward pool touched"
        );
        Ok(())
    }

    /// Copy of the pool touched at `block`; `self` is unchanged.
    pub fn touched(&self, block: u64) -> Result<Self, RewardError> {
        let mut next = *self;
        next.touch(block)?;
        Ok(next)
    }

    /// Reward owed to `slot` if the pool were touched at `block`.
    pub fn pending(&self, slot: &StakeSlot, block: u64) -> Result<u128, RewardError> {
        let acc = self.touched(block)?.acc_reward_per_share();
        reward(slot.power_snapshot, slot.acc_at_last_touch, acc)
    }

    pub fn add_stake(&mut self, amount: u128) -> Result<(), RewardError> {
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(RewardError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn remove_stake(&mut self, amount: u128) -> Result<(), RewardError> {
        self.total_staked = self
            .total_staked
            .checked_sub(amount)
            .ok_or(RewardError::ArithmeticOverflow)?;
        Ok(())
    }

    // --- parameter setters (callers touch first) ---

    pub fn set_reward_per_block(&mut self, reward_per_block: u128) {
        self.info.reward_per_block = reward_per_block;
    }

    pub fn set_end_block(&mut self, end_block: u64) {
        self.info.end_block = end_block;
    }

    pub fn set_provider(&mut self, provider: Address) {
        self.info.provider = provider;
    }

    /// Move the start and reset the touch block with it.
    pub fn set_start_block(&mut self, start_block: u64) {
        self.info.start_block = start_block;
        self.info.last_touch_block = start_block;
    }
}

/// Payout for `power` between two accumulator readings:
/// `(acc_now - acc_then) * power / Q128`.
pub fn reward(power: u128, acc_then: U256, acc_now: U256) -> Result<u128, RewardError> {
    let scaled = acc_now
        .saturating_sub(acc_then)
        .checked_mul(U256::from(power))
        .ok_or(RewardError::ArithmeticOverflow)?;
    u128::try_from(scaled / Q128).map_err(|_| RewardError::ArithmeticOverflow)
}
