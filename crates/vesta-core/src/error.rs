//! Error types for the vesta escrow.
use alloy_primitives::Address;
use thiserror::Error;

use crate::types::PositionId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    #[error("lock amount must be non-zero")] ZeroAmount,
    #[error("unlock time {unlock_time} is not after now {now}")] UnlockTimeNotFuture { unlock_time: u64, now: u64 },
    #[error("unlock time {unlock_time} exceeds max {max}")] UnlockTimeTooLate { unlock_time: u64, max: u64 },
    #[error("unlock time {unlock_time} does not extend current end {current}")] UnlockTimeNotIncreased { unlock_time: u64, current: u64 },
    #[error("position not found: {0}")] PositionNotFound(PositionId),
    #[error("caller {caller} does not own position {position}")] NotOwner { position: PositionId, caller: Address },
    #[error("no lock on position {0}")] NoLock(PositionId),
    #[error("lock on position {0} has expired")] LockExpired(PositionId),
    #[error("lock on position {position} expires at {end}")] LockNotExpired { position: PositionId, end: u64 },
    #[error("position {0} is staked")] PositionStaked(PositionId),
    #[error("cannot merge position {0} into itself")] SelfMerge(PositionId),
    #[error("merge target ends at {to_end}, before source end {from_end}")] MergeDirection { from_end: u64, to_end: u64 },
    #[error("position {0} still holds locked tokens")] NotWithdrawn(PositionId),
    #[error("locked supply overflow")] SupplyOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakeError {
    #[error("{0} already has a staked position")] AlreadyStaking(Address),
    #[error("position {0} is already staked")] PositionAlreadyStaked(PositionId),
    #[error("{0} has no staked position")] NotStaking(Address),
    #[error("caller {caller} does not own position {position}")] NotOwner { position: PositionId, caller: Address },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("unauthorized: {0}")] Unauthorized(Address),
    #[error("pool already started at block {start_block}")] PoolAlreadyStarted { start_block: u64 },
    #[error("start block {start} is not after current block {block}")] StartBlockNotFuture { start: u64, block: u64 },
    #[error("start block {start} is not before end block {end}")] StartBlockAfterEnd { start: u64, end: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecayError {
    #[error("checkpoint replay stopped at {reached}, target {target}")] ReplayLimit { reached: u64, target: u64 },
    #[error("timestamp {now} precedes last checkpoint {last}")] TimeRegression { now: u64, last: u64 },
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewardError {
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: u128, need: u128 },
    #[error("balance overflow")] Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("position already minted: {0}")] AlreadyMinted(PositionId),
    #[error("position not found: {0}")] NotFound(PositionId),
    #[error("{caller} does not hold position {position}")] NotOwner { position: PositionId, caller: Address },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("load: {0}")] Load(String),
    #[error("start block {start} is not before end block {end}")] InvalidBlockRange { start: u64, end: u64 },
    #[error("checkpoint iteration cap must be non-zero")] ZeroIterationCap,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    #[error(transparent)] Lock(#[from] LockError),
    #[error(transparent)] Stake(#[from] StakeError),
    #[error(transparent)] Admin(#[from] AdminError),
    #[error(transparent)] Decay(#[from] DecayError),
    #[error(transparent)] Reward(#[from] RewardError),
    #[error(transparent)] Token(#[from] TokenError),
    #[error(transparent)] Registry(#[from] RegistryError),
    #[error(transparent)] Config(#[from] ConfigError),
    #[error("re-entrant call rejected")] Reentrancy,
}
