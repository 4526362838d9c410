//! Reward pool administration.
//!
//! Every setter touches the pool at the call's block first, so blocks before
//! the change accrue under the old parameters.

use alloy_primitives::Address;
use tracing::info;

use vesta_core::error::{AdminError, EscrowError};
use vesta_core::types::CallContext;

use crate::escrow::VotingEscrow;

impl VotingEscrow {
    fn ensure_admin(&self, caller: &Address) -> Result<(), AdminError> {
        if self.collab.admin.is_admin(caller) {
            Ok(())
        } else {
            Err(AdminError::Unauthorized(*caller))
        }
    }

    pub fn modify_reward_per_block(
        &mut self,
        cx: &CallContext,
        reward_per_block: u128,
    ) -> Result<(), EscrowError> {
        self.ensure_admin(&cx.caller)?;
        let mut rewards = self.state.rewards.touched(cx.block)?;
        rewards.set_reward_per_block(reward_per_block);
        self.state.rewards = rewards;
        info!(block = cx.block, reward_per_block, "reward rate changed");
        Ok(())
    }

    /// Move the end of the pool. An end below the last touch freezes accrual.
    pub fn modify_end_block(&mut self, cx: &CallContext, end_block: u64) -> Result<(), EscrowError> {
        self.ensure_admin(&cx.caller)?;
        let mut rewards = self.state.rewards.touched(cx.block)?;
        rewards.set_end_block(end_block);
        self.state.rewards = rewards;
        info!(block = cx.block, end_block, "reward end block changed");
        Ok(())
    }

    pub fn modify_provider(&mut self, cx: &CallContext, provider: Address) -> Result<(), EscrowError> {
        self.ensure_admin(&cx.caller)?;
        let mut rewards = self.state.rewards.touched(cx.block)?;
        rewards.set_provider(provider);
        self.state.rewards = rewards;
        info!(block = cx.block, %provider, "reward provider changed");
        Ok(())
    }

    /// Reschedule a pool that has not started yet. The new start must lie
    /// strictly between the current block and the end block.
    pub fn modify_start_block(
        &mut self,
        cx: &CallContext,
        start_block: u64,
    ) -> Result<(), EscrowError> {
        self.ensure_admin(&cx.caller)?;
        let info = self.reward_info();
        if cx.block >= info.start_block {
            return Err(AdminError::PoolAlreadyStarted {
                start_block: info.start_block,
            }
            .into());
        }
        if start_block <= cx.block {
            return Err(AdminError::StartBlockNotFuture {
                start: start_block,
                block: cx.block,
            }
            .into());
        }
        if start_block >= info.end_block {
            return Err(AdminError::StartBlockAfterEnd {
                start: start_block,
                end: info.end_block,
            }
            .into());
        }
        let mut rewards = self.state.rewards.touched(cx.block)?;
        rewards.set_start_block(start_block);
        self.state.rewards = rewards;
        info!(block = cx.block, start_block, "reward start block changed");
        Ok(())
    }
}
