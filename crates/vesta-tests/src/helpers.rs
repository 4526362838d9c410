//! Shared test helpers for the scenario and adversarial tests.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use vesta_core::constants::{MAXTIME, Q128, WEEK};
use vesta_core::registry::MemoryPositionRegistry;
use vesta_core::token::MemoryToken;
use vesta_core::traits::FungibleToken;
use vesta_core::types::CallContext;
use vesta_escrow::{Collaborators, EscrowConfig, PoolConfig, VotingEscrow};

/// Week-aligned start time used by every scenario.
pub const T0: u64 = 2_800 * WEEK;

/// One token unit with 18 decimals.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address::repeat_byte(seed)
}

pub fn admin() -> Address {
    addr(0xAD)
}

pub fn escrow_account() -> Address {
    addr(0xEE)
}

/// `T0` plus a fractional number of weeks, in tenths (`weeks_tenths(52)` is 5.2 weeks).
pub fn weeks_tenths(tenths: u64) -> u64 {
    T0 + WEEK * tenths / 10
}

/// `T0` plus whole weeks and days.
pub fn at(weeks: u64, days: u64) -> u64 {
    T0 + weeks * WEEK + days * 86_400
}

pub fn cx(caller: Address, timestamp: u64, block: u64) -> CallContext {
    CallContext::new(caller, timestamp, block)
}

/// Expected `(bias, slope)` of a fresh lock of `amount` with `remaining` seconds left.
pub fn segment(amount: u128, remaining: u64) -> (i128, i128) {
    let slope = (amount / MAXTIME as u128) as i128;
    (slope * remaining as i128, slope)
}

/// Accumulator increment for `blocks` at `rate` over `staked`.
pub fn acc_step(rate: u128, blocks: u64, staked: u128) -> U256 {
    U256::from(rate) * U256::from(blocks) * Q128 / U256::from(staked)
}

/// Payout of `power` over an accumulator delta.
pub fn payout(power: u128, acc_delta: U256) -> u128 {
    u128::try_from(U256::from(power) * acc_delta / Q128).unwrap()
}

/// An escrow over in-memory collaborators.
///
/// The locked and the reward token are one ledger, as in a single-token
/// deployment.
pub struct Harness {
    pub escrow: VotingEscrow,
    pub token: Arc<MemoryToken>,
    pub registry: Arc<MemoryPositionRegistry>,
}

impl Harness {
    pub fn new(pool: PoolConfig) -> Self {
        Self::with_config(EscrowConfig {
            escrow_address: escrow_account(),
            deploy_time: T0,
            reward: pool,
            ..EscrowConfig::default()
        })
    }

    pub fn with_config(config: EscrowConfig) -> Self {
        let token = Arc::new(MemoryToken::new());
        let registry = Arc::new(MemoryPositionRegistry::new());
        let collab = Collaborators {
            locked_token: token.clone(),
            reward_token: token.clone(),
            positions: registry.clone(),
            admin: Arc::new(admin()),
        };
        let escrow = VotingEscrow::new(&config, collab).unwrap();
        Self {
            escrow,
            token,
            registry,
        }
    }

    /// A pool paying `rate` per block over `[start, end)`, funded by `provider`.
    pub fn with_pool(provider: Address, rate: u128, start: u64, end: u64) -> Self {
        let h = Self::new(PoolConfig {
            provider,
            reward_per_block: rate,
            start_block: start,
            end_block: end,
        });
        h.fund(&provider, 100 * UNIT);
        h
    }

    pub fn fund(&self, who: &Address, amount: u128) {
        self.token.mint(who, amount).unwrap();
    }

    pub fn balance(&self, who: &Address) -> u128 {
        self.token.balance_of(who)
    }
}
