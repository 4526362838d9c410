//! Staking surface: stake, collect, unstake.
//!
//! Each address stakes at most one position. While staked the escrow holds
//! custody of the position and the staker is recorded as its logical owner.
//! Every call touches the reward pool before computing anything.

use alloy_primitives::Address;
use tracing::{info, warn};

use vesta_core::error::{EscrowError, LockError, RewardError, StakeError};
use vesta_core::types::{CallContext, PositionId, StakeSlot};
use vesta_decay::contribution::voting_power;
use vesta_rewards::accumulator::reward;

use crate::escrow::VotingEscrow;

impl VotingEscrow {
    /// Stake position `id` held by the caller. Returns the new staking id.
    pub fn stake(&mut self, cx: &CallContext, id: PositionId) -> Result<u64, EscrowError> {
        let staker = cx.caller;
        if self.state.slots.contains_key(&staker) {
            return Err(StakeError::AlreadyStaking(staker).into());
        }
        if self.state.staked_owner.contains_key(&id) {
            return Err(StakeError::PositionAlreadyStaked(id).into());
        }
        if !self.collab.positions.is_holder(id, &staker) {
            return Err(StakeError::NotOwner {
                position: id,
                caller: staker,
            }
            .into());
        }

        // Only live locks join the denominator.
        let lock = self.existing_lock(id)?;
        if lock.end <= cx.timestamp {
            return Err(LockError::LockExpired(id).into());
        }
        let mut rewards = self.state.rewards.touched(cx.block)?;
        rewards.add_stake(lock.amount)?;
        let staking_id = self
            .state
            .stake_counter
            .checked_add(1)
            .ok_or(RewardError::ArithmeticOverflow)?;
        let slot = StakeSlot {
            staking_id,
            position_id: id,
            lock_amount: lock.amount,
            power_snapshot: voting_power(&lock, cx.timestamp),
            acc_at_last_touch: rewards.acc_reward_per_share(),
        };

        let escrow = self.state.escrow_address;
        self.collab.positions.transfer(&staker, &escrow, id)?;

        self.state.rewards = rewards;
        self.state.stake_counter = staking_id;
        self.state.slots.insert(staker, slot);
        self.state.staked_owner.insert(id, staker);
        info!(
            position = id,
            caller = %staker,
            staking_id,
            amount = lock.amount,
            power = slot.power_snapshot,
            "position staked"
        );
        Ok(staking_id)
    }

    /// Pay out the caller's accrued reward and refresh its power snapshot.
    ///
    /// The payout is weighted by the snapshot taken at the previous stake or
    /// collect; the snapshot is then re-taken at the current time.
    pub fn collect(&mut self, cx: &CallContext) -> Result<u128, EscrowError> {
        let staker = cx.caller;
        let slot = self
            .stake_slot(&staker)
            .ok_or(StakeError::NotStaking(staker))?;
        let rewards = self.state.rewards.touched(cx.block)?;
        let acc = rewards.acc_reward_per_share();
        let payout = reward(slot.power_snapshot, slot.acc_at_last_touch, acc)?;
        let refreshed = StakeSlot {
            acc_at_last_touch: acc,
            power_snapshot: voting_power(&self.lock(slot.position_id), cx.timestamp),
            ..slot
        };

        if payout > 0 {
            self.collab
                .reward_token
                .transfer(&rewards.info().provider, &staker, payout)?;
        }

        self.state.rewards = rewards;
        self.state.slots.insert(staker, refreshed);
        info!(
            position = slot.position_id,
            caller = %staker,
            payout,
            power = refreshed.power_snapshot,
            "rewards collected"
        );
        Ok(payout)
    }

    /// Pay out the caller's accrued reward, return custody of its position
    /// and clear its slot.
    pub fn unstake(&mut self, cx: &CallContext) -> Result<u128, EscrowError> {
        let staker = cx.caller;
        let slot = self
            .stake_slot(&staker)
            .ok_or(StakeError::NotStaking(staker))?;
        let mut rewards = self.state.rewards.touched(cx.block)?;
        let payout = reward(
            slot.power_snapshot,
            slot.acc_at_last_touch,
            rewards.acc_reward_per_share(),
        )?;
        rewards.remove_stake(slot.lock_amount)?;

        let escrow = self.state.escrow_address;
        let id = slot.position_id;
        self.collab.positions.transfer(&escrow, &staker, id)?;
        if payout > 0 {
            let provider = rewards.info().provider;
            if let Err(e) = self.collab.reward_token.transfer(&provider, &staker, payout) {
                let e = EscrowError::from(e);
                self.return_custody(&staker, id, &e);
                return Err(e);
            }
        }

        self.state.rewards = rewards;
        self.state.slots.remove(&staker);
        self.state.staked_owner.remove(&id);
        info!(position = id, caller = %staker, payout, "position unstaked");
        Ok(payout)
    }

    /// Take a position back into custody after a failed unstake.
    fn return_custody(&self, staker: &Address, id: PositionId, cause: &EscrowError) {
        let escrow = self.state.escrow_address;
        match self.collab.positions.transfer(staker, &escrow, id) {
            Ok(()) => warn!(position = id, "restored custody after failure: {cause}"),
            Err(e) => warn!(position = id, "failed to restore custody: {e}; original failure: {cause}"),
        }
    }
}
