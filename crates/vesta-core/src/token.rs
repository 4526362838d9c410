//! In-memory fungible token ledger.

use std::collections::HashMap;

use alloy_primitives::Address;
use parking_lot::RwLock;

use crate::error::TokenError;
use crate::traits::FungibleToken;

/// A balance map behind a lock. Used by tests and by hosts that keep
/// token balances in process.
#[derive(Debug, Default)]
pub struct MemoryToken {
    balances: RwLock<HashMap<Address, u128>>,
}

impl MemoryToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `to` out of thin air.
    pub fn mint(&self, to: &Address, amount: u128) -> Result<(), TokenError> {
        let mut balances = self.balances.write();
        let balance = balances.entry(*to).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> u128 {
        self.balances
            .read()
            .values()
            .fold(0u128, |acc, b| acc.saturating_add(*b))
    }
}

impl FungibleToken for MemoryToken {
    fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.read().get(owner).copied().unwrap_or(0)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        let mut balances = self.balances.write();
        let have = balances.get(from).copied().unwrap_or(0);
        if have < amount {
            return Err(TokenError::InsufficientBalance { have, need: amount });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = balances.get(to).copied().unwrap_or(0);
        let credited = to_balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        balances.insert(*from, have - amount);
        balances.insert(*to, credited);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::repeat_byte(b)
    }

    #[test]
    fn mint_and_transfer() {
        let token = MemoryToken::new();
        token.mint(&addr(1), 100).unwrap();
        token.transfer(&addr(1), &addr(2), 30).unwrap();
        assert_eq!(token.balance_of(&addr(1)), 70);
        assert_eq!(token.balance_of(&addr(2)), 30);
        assert_eq!(token.total_supply(), 100);
    }

    #[test]
    fn insufficient_balance_moves_nothing() {
        let token = MemoryToken::new();
        token.mint(&addr(1), 10).unwrap();
        let err = token.transfer(&addr(1), &addr(2), 11).unwrap_err();
        assert_eq!(err, TokenError::InsufficientBalance { have: 10, need: 11 });
        assert_eq!(token.balance_of(&addr(1)), 10);
        assert_eq!(token.balance_of(&addr(2)), 0);
    }

    #[test]
    fn credit_overflow_moves_nothing() {
        let token = MemoryToken::new();
        token.mint(&addr(1), 1).unwrap();
        token.mint(&addr(2), u128::MAX).unwrap();
        assert_eq!(token.transfer(&addr(1), &addr(2), 1), Err(TokenError::Overflow));
        assert_eq!(token.balance_of(&addr(1)), 1);
    }

    #[test]
    fn self_transfer_is_noop() {
        let token = MemoryToken::new();
        token.mint(&addr(1), 5).unwrap();
        token.transfer(&addr(1), &addr(1), 5).unwrap();
        assert_eq!(token.balance_of(&addr(1)), 5);
    }
}
