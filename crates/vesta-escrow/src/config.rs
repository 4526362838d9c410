//! Escrow configuration.
//!
//! Provides [`EscrowConfig`] with defaults for the escrow account, genesis
//! time, reward pool parameters and the checkpoint replay cap. Hosts can
//! build it programmatically or load it from a file with `VESTA__*`
//! environment overrides (e.g. `VESTA__REWARD__END_BLOCK=20000`).

use std::path::Path;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use vesta_core::constants::MAX_CHECKPOINT_ITERATIONS;
use vesta_core::error::ConfigError;

/// Reward pool parameters at deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Account that funds payouts in the reward token.
    pub provider: Address,
    /// Reward token units emitted per block.
    pub reward_per_block: u128,
    /// First block that accrues rewards.
    pub start_block: u64,
    /// Last block that accrues rewards.
    pub end_block: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            provider: Address::ZERO,
            reward_per_block: 0,
            start_block: 0,
            end_block: u64::MAX,
        }
    }
}

/// Configuration for a [`VotingEscrow`](crate::VotingEscrow) instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscrowConfig {
    /// Account that holds locked tokens and staked positions.
    pub escrow_address: Address,
    /// Timestamp of the genesis checkpoint.
    pub deploy_time: u64,
    /// Reward pool parameters.
    pub reward: PoolConfig,
    /// Maximum week steps one checkpoint replay may take.
    pub max_checkpoint_iterations: usize,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            escrow_address: Address::ZERO,
            deploy_time: 0,
            reward: PoolConfig::default(),
            max_checkpoint_iterations: MAX_CHECKPOINT_ITERATIONS,
        }
    }
}

impl EscrowConfig {
    /// Load from `path` (format inferred from the extension), then apply
    /// `VESTA__`-prefixed environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("VESTA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        let cfg: Self = settings
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reward.start_block >= self.reward.end_block {
            return Err(ConfigError::InvalidBlockRange {
                start: self.reward.start_block,
                end: self.reward.end_block,
            });
        }
        if self.max_checkpoint_iterations == 0 {
            return Err(ConfigError::ZeroIterationCap);
        }
        Ok(())
    }
}
