//! Collaborator interfaces consumed by the escrow.
//!
//! - [`FungibleToken`]: balance moves for the locked and the reward token
//! - [`PositionRegistry`]: ownership of lock positions (mint, burn, custody transfer)
//! - [`AccessControl`]: gate for the reward pool's admin setters
//!
//! The escrow holds them as `Arc<dyn Trait>` and calls them with `&self`;
//! implementations bring their own interior mutability.

use alloy_primitives::Address;

use crate::error::{RegistryError, TokenError};
use crate::types::PositionId;

/// A fungible token ledger.
///
/// The escrow always names both sides of a transfer explicitly: it pulls
/// from users into its own account and pays out from the escrow or the
/// reward provider. Allowance handling is the host's concern.
pub trait FungibleToken: Send + Sync {
    /// Balance of `owner` in the token's smallest unit.
    fn balance_of(&self, owner: &Address) -> u128;

    /// Move `amount` from `from` to `to`. Fails without moving anything.
    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError>;
}

/// Non-fungible ownership of lock positions.
pub trait PositionRegistry: Send + Sync {
    /// Current holder of `id`, or `None` if it was never minted or has been burned.
    fn owner_of(&self, id: PositionId) -> Option<Address>;

    /// Create `id` held by `to`.
    fn mint(&self, to: &Address, id: PositionId) -> Result<(), RegistryError>;

    /// Move `id` from `from` to `to`. `from` must be the current holder.
    fn transfer(&self, from: &Address, to: &Address, id: PositionId) -> Result<(), RegistryError>;

    /// Destroy `id`.
    fn burn(&self, id: PositionId) -> Result<(), RegistryError>;

    /// Number of positions held by `owner`.
    fn balance_of(&self, owner: &Address) -> u64;

    /// Whether `who` currently holds `id`.
    ///
    /// Default implementation delegates to [`owner_of`](Self::owner_of).
    fn is_holder(&self, id: PositionId, who: &Address) -> bool {
        self.owner_of(id).as_ref() == Some(who)
    }
}

/// Admin gate for reward pool parameters.
pub trait AccessControl: Send + Sync {
    fn is_admin(&self, who: &Address) -> bool;
}

/// A single owner address.
impl AccessControl for Address {
    fn is_admin(&self, who: &Address) -> bool {
        self == who
    }
}
