//! The composed vote-escrow: state, collaborators and read views.
//!
//! [`VotingEscrow`] owns the lock records, the checkpoint engine and the reward
//! accumulator. Mutating operations live in [`ledger`](crate::ledger),
//! [`staking`](crate::staking) and [`admin`](crate::admin); each one validates
//! and computes its full effect first, then calls the collaborators, and only
//! then commits to `self`. A collaborator failure after an earlier transfer is
//! compensated before the error is returned.

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::warn;

use vesta_core::constants::{FIRST_POSITION_ID, MAXTIME, WEEK};
use vesta_core::error::{EscrowError, LockError};
use vesta_core::traits::{AccessControl, FungibleToken, PositionRegistry};
use vesta_core::types::{Lock, Point, PositionId, RewardInfo, StakeSlot, StakingInfo};
use vesta_decay::checkpoint::CheckpointEngine;
use vesta_decay::contribution::voting_power;
use vesta_rewards::accumulator::RewardAccumulator;

use crate::config::EscrowConfig;

/// External services the escrow calls into.
#[derive(Clone)]
pub struct Collaborators {
    /// Token users lock.
    pub locked_token: Arc<dyn FungibleToken>,
    /// Token the reward pool pays out. May be the same ledger as `locked_token`.
    pub reward_token: Arc<dyn FungibleToken>,
    /// Ownership of lock positions.
    pub positions: Arc<dyn PositionRegistry>,
    /// Gate for the reward pool setters.
    pub admin: Arc<dyn AccessControl>,
}

/// Everything the escrow persists between calls.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EscrowState {
    /// Account holding locked tokens and staked positions.
    pub escrow_address: Address,
    /// Lock per minted position. Withdrawn positions keep a zero lock until burned.
    pub locks: BTreeMap<PositionId, Lock>,
    /// Sum of all locked amounts.
    pub supply: u128,
    pub next_position_id: PositionId,
    pub checkpoints: CheckpointEngine,
    pub rewards: RewardAccumulator,
    /// Live stake slot per staker.
    pub slots: BTreeMap<Address, StakeSlot>,
    /// Logical owner of each position held in custody.
    pub staked_owner: BTreeMap<PositionId, Address>,
    /// Number of successful stakes so far.
    pub stake_counter: u64,
}

impl EscrowState {
    /// Fresh state for a deployment described by `config`.
    pub fn genesis(config: &EscrowConfig) -> Self {
        let pool = &config.reward;
        Self {
            escrow_address: config.escrow_address,
            locks: BTreeMap::new(),
            supply: 0,
            next_position_id: FIRST_POSITION_ID,
            checkpoints: CheckpointEngine::with_max_iterations(
                config.deploy_time,
                config.max_checkpoint_iterations,
            ),
            rewards: RewardAccumulator::new(
                pool.provider,
                pool.reward_per_block,
                pool.start_block,
                pool.end_block,
            ),
            slots: BTreeMap::new(),
            staked_owner: BTreeMap::new(),
            stake_counter: 0,
        }
    }
}

pub struct VotingEscrow {
    pub(crate) state: EscrowState,
    pub(crate) collab: Collaborators,
}

impl VotingEscrow {
    pub const WEEK: u64 = WEEK;
    pub const MAXTIME: u64 = MAXTIME;

    pub fn new(config: &EscrowConfig, collab: Collaborators) -> Result<Self, EscrowError> {
        config.validate()?;
        Ok(Self {
            state: EscrowState::genesis(config),
            collab,
        })
    }

    /// Resume from a previously taken [`snapshot`](Self::snapshot).
    pub fn restore(state: EscrowState, collab: Collaborators) -> Self {
        Self { state, collab }
    }

    pub fn snapshot(&self) -> EscrowState {
        self.state.clone()
    }

    pub fn escrow_address(&self) -> Address {
        self.state.escrow_address
    }

    // --- lock views ---

    /// Lock of `id`; the zero lock for unknown or burned positions.
    pub fn lock(&self, id: PositionId) -> Lock {
        self.state.locks.get(&id).copied().unwrap_or_default()
    }

    pub fn supply(&self) -> u128 {
        self.state.supply
    }

    /// Id the next `create_lock` will mint.
    pub fn next_position_id(&self) -> PositionId {
        self.state.next_position_id
    }

    /// Voting power of a single position at `t`.
    pub fn position_power(&self, id: PositionId, t: u64) -> u128 {
        voting_power(&self.lock(id), t)
    }

    // --- checkpoint views ---

    pub fn epoch(&self) -> u64 {
        self.state.checkpoints.epoch()
    }

    pub fn point(&self, epoch: u64) -> Option<Point> {
        self.state.checkpoints.point(epoch).copied()
    }

    pub fn slope_change(&self, t: u64) -> i128 {
        self.state.checkpoints.slope_change(t)
    }

    pub fn pending_slope_total(&self, now: u64) -> u128 {
        self.state.checkpoints.pending_slope_total(now)
    }

    pub fn total_power_at(&self, t: u64) -> Result<u128, EscrowError> {
        Ok(self.state.checkpoints.total_power_at(t)?)
    }

    // --- reward views ---

    pub fn reward_info(&self) -> RewardInfo {
        *self.state.rewards.info()
    }

    pub fn total_staked(&self) -> u128 {
        self.state.rewards.total_staked()
    }

    pub fn stake_slot(&self, staker: &Address) -> Option<StakeSlot> {
        self.state.slots.get(staker).copied()
    }

    pub fn staking_info(&self, staker: &Address) -> StakingInfo {
        StakingInfo::from(self.stake_slot(staker))
    }

    /// Position staked by `staker`, if any.
    pub fn staked_position(&self, staker: &Address) -> Option<PositionId> {
        self.state.slots.get(staker).map(|s| s.position_id)
    }

    /// Logical owner of a staked position.
    pub fn staked_owner(&self, id: PositionId) -> Option<Address> {
        self.state.staked_owner.get(&id).copied()
    }

    /// Reward `staker` would receive from `collect` at `block`.
    pub fn pending_reward(&self, staker: &Address, block: u64) -> Result<u128, EscrowError> {
        match self.state.slots.get(staker) {
            Some(slot) => Ok(self.state.rewards.pending(slot, block)?),
            None => Ok(0),
        }
    }

    // --- shared helpers ---

    /// The registry holder, or the staker while the escrow holds custody.
    pub fn logical_owner(&self, id: PositionId) -> Option<Address> {
        self.staked_owner(id)
            .or_else(|| self.collab.positions.owner_of(id))
    }

    /// The stored lock of `id`, failing for unknown positions and for locks
    /// that were never created or have been withdrawn.
    pub(crate) fn existing_lock(&self, id: PositionId) -> Result<Lock, LockError> {
        let lock = self
            .state
            .locks
            .get(&id)
            .copied()
            .ok_or(LockError::PositionNotFound(id))?;
        if !lock.exists() {
            return Err(LockError::NoLock(id));
        }
        Ok(lock)
    }

    pub(crate) fn ensure_holder(&self, id: PositionId, caller: &Address) -> Result<(), LockError> {
        if self.collab.positions.is_holder(id, caller) {
            Ok(())
        } else {
            Err(LockError::NotOwner {
                position: id,
                caller: *caller,
            })
        }
    }

    pub(crate) fn ensure_not_staked(&self, id: PositionId) -> Result<(), LockError> {
        if self.state.staked_owner.contains_key(&id) {
            return Err(LockError::PositionStaked(id));
        }
        Ok(())
    }

    /// Locked supply after adding `extra`, bounded by `i128::MAX`.
    pub(crate) fn grown_supply(&self, extra: u128) -> Result<u128, LockError> {
        self.state
            .supply
            .checked_add(extra)
            .filter(|s| *s <= i128::MAX as u128)
            .ok_or(LockError::SupplyOverflow)
    }

    /// Undo a token move after a later step failed.
    pub(crate) fn refund(
        token: &dyn FungibleToken,
        from: &Address,
        to: &Address,
        amount: u128,
        cause: &EscrowError,
    ) {
        match token.transfer(from, to, amount) {
            Ok(()) => warn!(%from, %to, amount, "reverted token transfer after failure: {cause}"),
            Err(e) => warn!(%from, %to, amount, "failed to revert token transfer: {e}; original failure: {cause}"),
        }
    }
}
