//! Lock ledger operations: create, top up, extend, merge, withdraw, burn.
//!
//! Every operation that changes a lock's amount or end records one checkpoint
//! at the call's timestamp. Unlock times are rounded down to a week boundary
//! before they are validated.

use tracing::info;

use vesta_core::constants::{floor_week, MAXTIME};
use vesta_core::error::{EscrowError, LockError};
use vesta_core::types::{CallContext, Lock, PositionId};
use vesta_decay::checkpoint::{LockChange, ReplayOutcome};

use crate::escrow::VotingEscrow;

impl VotingEscrow {
    /// Lock `amount` until `unlock_time` (rounded down to a week) and mint a
    /// new position to the caller.
    pub fn create_lock(
        &mut self,
        cx: &CallContext,
        amount: u128,
        unlock_time: u64,
    ) -> Result<PositionId, EscrowError> {
        let now = cx.timestamp;
        self.state.checkpoints.ensure_can_catch_up(now)?;
        if amount == 0 {
            return Err(LockError::ZeroAmount.into());
        }
        let end = floor_week(unlock_time);
        if end <= now {
            return Err(LockError::UnlockTimeNotFuture { unlock_time: end, now }.into());
        }
        let max = now.saturating_add(MAXTIME);
        if end > max {
            return Err(LockError::UnlockTimeTooLate { unlock_time: end, max }.into());
        }
        let supply = self.grown_supply(amount)?;
        let id = self.state.next_position_id;
        let next_id = id.checked_add(1).ok_or(LockError::SupplyOverflow)?;

        let lock = Lock::new(amount, end);
        let plan = self
            .state
            .checkpoints
            .plan(now, &[LockChange::new(Lock::ZERO, lock)])?;

        let escrow = self.state.escrow_address;
        self.collab
            .locked_token
            .transfer(&cx.caller, &escrow, amount)?;
        if let Err(e) = self.collab.positions.mint(&cx.caller, id) {
            let e = EscrowError::from(e);
            Self::refund(self.collab.locked_token.as_ref(), &escrow, &cx.caller, amount, &e);
            return Err(e);
        }

        self.state.locks.insert(id, lock);
        self.state.supply = supply;
        self.state.next_position_id = next_id;
        self.state.checkpoints.commit(plan);
        info!(position = id, caller = %cx.caller, amount, end, "lock created");
        Ok(id)
    }

    /// Add `extra` tokens to a live lock. Anyone may top up any position.
    ///
    /// A staked position's raw amount in the reward pool grows with it; its
    /// power snapshot is not refreshed until the staker's next collect.
    pub fn increase_amount(
        &mut self,
        cx: &CallContext,
        id: PositionId,
        extra: u128,
    ) -> Result<(), EscrowError> {
        let now = cx.timestamp;
        self.state.checkpoints.ensure_can_catch_up(now)?;
        if extra == 0 {
            return Err(LockError::ZeroAmount.into());
        }
        let old = self.existing_lock(id)?;
        if old.end <= now {
            return Err(LockError::LockExpired(id).into());
        }
        let supply = self.grown_supply(extra)?;
        let new = Lock::new(
            old.amount.checked_add(extra).ok_or(LockError::SupplyOverflow)?,
            old.end,
        );
        let plan = self
            .state
            .checkpoints
            .plan(now, &[LockChange::new(old, new)])?;

        let staked = match self.state.staked_owner.get(&id) {
            Some(owner) => {
                let mut slot = self
                    .state
                    .slots
                    .get(owner)
                    .copied()
                    .ok_or(LockError::PositionStaked(id))?;
                let mut rewards = self.state.rewards.touched(cx.block)?;
                rewards.add_stake(extra)?;
                slot.lock_amount = slot
                    .lock_amount
                    .checked_add(extra)
                    .ok_or(LockError::SupplyOverflow)?;
                Some((*owner, slot, rewards))
            }
            None => None,
        };

        let escrow = self.state.escrow_address;
        self.collab
            .locked_token
            .transfer(&cx.caller, &escrow, extra)?;

        self.state.locks.insert(id, new);
        self.state.supply = supply;
        self.state.checkpoints.commit(plan);
        if let Some((owner, slot, rewards)) = staked {
            self.state.slots.insert(owner, slot);
            self.state.rewards = rewards;
        }
        info!(position = id, caller = %cx.caller, amount = extra, total = new.amount, "lock amount increased");
        Ok(())
    }

    /// Push a live lock's end out to `unlock_time` (rounded down to a week).
    ///
    /// The caller must be the position's holder or, while it is staked, its staker.
    pub fn increase_unlock_time(
        &mut self,
        cx: &CallContext,
        id: PositionId,
        unlock_time: u64,
    ) -> Result<(), EscrowError> {
        let now = cx.timestamp;
        self.state.checkpoints.ensure_can_catch_up(now)?;
        if self.logical_owner(id) != Some(cx.caller) {
            return Err(LockError::NotOwner {
                position: id,
                caller: cx.caller,
            }
            .into());
        }
        let old = self.existing_lock(id)?;
        if old.end <= now {
            return Err(LockError::LockExpired(id).into());
        }
        let end = floor_week(unlock_time);
        if end <= old.end {
            return Err(LockError::UnlockTimeNotIncreased {
                unlock_time: end,
                current: old.end,
            }
            .into());
        }
        let max = now.saturating_add(MAXTIME);
        if end > max {
            return Err(LockError::UnlockTimeTooLate { unlock_time: end, max }.into());
        }

        let new = Lock::new(old.amount, end);
        let plan = self
            .state
            .checkpoints
            .plan(now, &[LockChange::new(old, new)])?;

        self.state.locks.insert(id, new);
        self.state.checkpoints.commit(plan);
        info!(position = id, caller = %cx.caller, end, "lock extended");
        Ok(())
    }

    /// Move all tokens of `from` into `to`. Both ends stay as they were;
    /// `to` must not end before `from`.
    pub fn merge(
        &mut self,
        cx: &CallContext,
        from: PositionId,
        to: PositionId,
    ) -> Result<(), EscrowError> {
        self.state.checkpoints.ensure_can_catch_up(cx.timestamp)?;
        if from == to {
            return Err(LockError::SelfMerge(from).into());
        }
        self.ensure_not_staked(from)?;
        self.ensure_not_staked(to)?;
        self.ensure_holder(from, &cx.caller)?;
        self.ensure_holder(to, &cx.caller)?;
        let from_lock = self.existing_lock(from)?;
        let to_lock = self.existing_lock(to)?;
        if to_lock.end < from_lock.end {
            return Err(LockError::MergeDirection {
                from_end: from_lock.end,
                to_end: to_lock.end,
            }
            .into());
        }

        let drained = Lock::new(0, from_lock.end);
        let merged = Lock::new(
            to_lock
                .amount
                .checked_add(from_lock.amount)
                .ok_or(LockError::SupplyOverflow)?,
            to_lock.end,
        );
        let plan = self.state.checkpoints.plan(
            cx.timestamp,
            &[
                LockChange::new(from_lock, drained),
                LockChange::new(to_lock, merged),
            ],
        )?;

        self.state.locks.insert(from, drained);
        self.state.locks.insert(to, merged);
        self.state.checkpoints.commit(plan);
        info!(from, to, caller = %cx.caller, amount = from_lock.amount, "locks merged");
        Ok(())
    }

    /// Return an expired lock's tokens to its holder and zero the lock.
    pub fn withdraw(&mut self, cx: &CallContext, id: PositionId) -> Result<u128, EscrowError> {
        let now = cx.timestamp;
        self.state.checkpoints.ensure_can_catch_up(now)?;
        self.ensure_not_staked(id)?;
        self.ensure_holder(id, &cx.caller)?;
        let lock = self.existing_lock(id)?;
        if lock.end > now {
            return Err(LockError::LockNotExpired {
                position: id,
                end: lock.end,
            }
            .into());
        }
        let supply = self
            .state
            .supply
            .checked_sub(lock.amount)
            .ok_or(LockError::SupplyOverflow)?;
        let plan = self
            .state
            .checkpoints
            .plan(now, &[LockChange::new(lock, Lock::ZERO)])?;

        if lock.amount > 0 {
            let escrow = self.state.escrow_address;
            self.collab
                .locked_token
                .transfer(&escrow, &cx.caller, lock.amount)?;
        }

        self.state.locks.insert(id, Lock::ZERO);
        self.state.supply = supply;
        self.state.checkpoints.commit(plan);
        info!(position = id, caller = %cx.caller, amount = lock.amount, "lock withdrawn");
        Ok(lock.amount)
    }

    /// Destroy a position whose tokens have all left it.
    pub fn burn(&mut self, cx: &CallContext, id: PositionId) -> Result<(), EscrowError> {
        self.ensure_not_staked(id)?;
        self.ensure_holder(id, &cx.caller)?;
        let lock = self
            .state
            .locks
            .get(&id)
            .copied()
            .ok_or(LockError::PositionNotFound(id))?;
        if lock.amount != 0 {
            return Err(LockError::NotWithdrawn(id).into());
        }

        self.collab.positions.burn(id)?;

        self.state.locks.remove(&id);
        info!(position = id, caller = %cx.caller, "position burned");
        Ok(())
    }

    /// Bring the aggregate curve up to the call's timestamp. Anyone may call.
    ///
    /// Returns [`ReplayOutcome::Partial`] when the gap exceeds the replay cap;
    /// calling again continues from where it stopped.
    pub fn checkpoint(&mut self, cx: &CallContext) -> Result<ReplayOutcome, EscrowError> {
        Ok(self.state.checkpoints.checkpoint(cx.timestamp)?)
    }
}
