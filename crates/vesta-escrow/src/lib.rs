//! # vesta-escrow: Vote-escrow locks, staking and reward pool administration.
//!
//! Composes the Vesta subsystems into one escrow:
//! - [`escrow::VotingEscrow`]: lock records, checkpoint engine and reward pool
//! - [`ledger`]: create, top up, extend, merge, withdraw, burn, checkpoint
//! - [`staking`]: stake, collect, unstake
//! - [`admin`]: reward pool setters behind an access gate
//! - [`shared::SharedEscrow`]: thread-safe handle that rejects re-entrant calls
//! - [`config::EscrowConfig`]: deployment configuration

pub mod admin;
pub mod config;
pub mod escrow;
pub mod ledger;
pub mod shared;
pub mod staking;

pub use config::{EscrowConfig, PoolConfig};
pub use escrow::{Collaborators, EscrowState, VotingEscrow};
pub use shared::SharedEscrow;
