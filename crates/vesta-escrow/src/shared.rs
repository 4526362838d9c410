//! Thread-safe handle around a [`VotingEscrow`] that rejects re-entrant calls.
//!
//! Collaborators are foreign code: a token or registry may call back into
//! the escrow while one of its operations is in flight. The handle holds a
//! re-entrant lock so such a callback on the same thread does not deadlock,
//! and the inner `RefCell` turns it into [`EscrowError::Reentrancy`] instead
//! of letting it observe half-applied state. Calls from other threads wait.

use std::cell::RefCell;
use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::ReentrantMutex;
use tracing::warn;

use vesta_core::error::EscrowError;
use vesta_core::types::{CallContext, Lock, Point, PositionId, RewardInfo, StakingInfo};
use vesta_decay::checkpoint::ReplayOutcome;

use crate::escrow::{EscrowState, VotingEscrow};

#[derive(Clone)]
pub struct SharedEscrow {
    inner: Arc<ReentrantMutex<RefCell<VotingEscrow>>>,
}

impl SharedEscrow {
    pub fn new(escrow: VotingEscrow) -> Self {
        Self {
            inner: Arc::new(ReentrantMutex::new(RefCell::new(escrow))),
        }
    }

    /// Run `f` with exclusive access.
    pub fn with_mut<T>(
        &self,
        f: impl FnOnce(&mut VotingEscrow) -> Result<T, EscrowError>,
    ) -> Result<T, EscrowError> {
        let guard = self.inner.lock();
        let mut escrow = guard.try_borrow_mut().map_err(|_| {
            warn!("re-entrant escrow call rejected");
            EscrowError::Reentrancy
        })?;
        f(&mut *escrow)
    }

    /// Run `f` with shared access. Fails while a mutating call is in flight.
    pub fn with<T>(&self, f: impl FnOnce(&VotingEscrow) -> T) -> Result<T, EscrowError> {
        let guard = self.inner.lock();
        let escrow = guard.try_borrow().map_err(|_| {
            warn!("escrow read during in-flight mutation rejected");
            EscrowError::Reentrancy
        })?;
        Ok(f(&*escrow))
    }

    pub fn snapshot(&self) -> Result<EscrowState, EscrowError> {
        self.with(VotingEscrow::snapshot)
    }

    // --- ledger ---

    pub fn create_lock(
        &self,
        cx: &CallContext,
        amount: u128,
        unlock_time: u64,
    ) -> Result<PositionId, EscrowError> {
        self.with_mut(|e| e.create_lock(cx, amount, unlock_time))
    }

    pub fn increase_amount(&self, cx: &CallContext, id: PositionId, extra: u128) -> Result<(), EscrowError> {
        self.with_mut(|e| e.increase_amount(cx, id, extra))
    }

    pub fn increase_unlock_time(
        &self,
        cx: &CallContext,
        id: PositionId,
        unlock_time: u64,
    ) -> Result<(), EscrowError> {
        self.with_mut(|e| e.increase_unlock_time(cx, id, unlock_time))
    }

    pub fn merge(&self, cx: &CallContext, from: PositionId, to: PositionId) -> Result<(), EscrowError> {
        self.with_mut(|e| e.merge(cx, from, to))
    }

    pub fn withdraw(&self, cx: &CallContext, id: PositionId) -> Result<u128, EscrowError> {
        self.with_mut(|e| e.withdraw(cx, id))
    }

    pub fn burn(&self, cx: &CallContext, id: PositionId) -> Result<(), EscrowError> {
        self.with_mut(|e| e.burn(cx, id))
    }

    pub fn checkpoint(&self, cx: &CallContext) -> Result<ReplayOutcome, EscrowError> {
        self.with_mut(|e| e.checkpoint(cx))
    }

    // --- staking ---

    pub fn stake(&self, cx: &CallContext, id: PositionId) -> Result<u64, EscrowError> {
        self.with_mut(|e| e.stake(cx, id))
    }

    pub fn collect(&self, cx: &CallContext) -> Result<u128, EscrowError> {
        self.with_mut(|e| e.collect(cx))
    }

    pub fn unstake(&self, cx: &CallContext) -> Result<u128, EscrowError> {
        self.with_mut(|e| e.unstake(cx))
    }

    // --- admin ---

    pub fn modify_reward_per_block(&self, cx: &CallContext, reward_per_block: u128) -> Result<(), EscrowError> {
        self.with_mut(|e| e.modify_reward_per_block(cx, reward_per_block))
    }

    pub fn modify_end_block(&self, cx: &CallContext, end_block: u64) -> Result<(), EscrowError> {
        self.with_mut(|e| e.modify_end_block(cx, end_block))
    }

    pub fn modify_provider(&self, cx: &CallContext, provider: Address) -> Result<(), EscrowError> {
        self.with_mut(|e| e.modify_provider(cx, provider))
    }

    pub fn modify_start_block(&self, cx: &CallContext, start_block: u64) -> Result<(), EscrowError> {
        self.with_mut(|e| e.modify_start_block(cx, start_block))
    }

    // --- views ---

    pub fn lock(&self, id: PositionId) -> Result<Lock, EscrowError> {
        self.with(|e| e.lock(id))
    }

    pub fn supply(&self) -> Result<u128, EscrowError> {
        self.with(VotingEscrow::supply)
    }

    pub fn epoch(&self) -> Result<u64, EscrowError> {
        self.with(VotingEscrow::epoch)
    }

    pub fn point(&self, epoch: u64) -> Result<Option<Point>, EscrowError> {
        self.with(|e| e.point(epoch))
    }

    pub fn slope_change(&self, t: u64) -> Result<i128, EscrowError> {
        self.with(|e| e.slope_change(t))
    }

    pub fn total_power_at(&self, t: u64) -> Result<u128, EscrowError> {
        self.with(|e| e.total_power_at(t))?
    }

    pub fn reward_info(&self) -> Result<RewardInfo, EscrowError> {
        self.with(VotingEscrow::reward_info)
    }

    pub fn staking_info(&self, staker: &Address) -> Result<StakingInfo, EscrowError> {
        self.with(|e| e.staking_info(staker))
    }

    pub fn pending_reward(&self, staker: &Address, block: u64) -> Result<u128, EscrowError> {
        self.with(|e| e.pending_reward(staker, block))?
    }
}
