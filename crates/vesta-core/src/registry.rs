//! In-memory position ownership registry.

use std::collections::HashMap;

use alloy_primitives::Address;
use parking_lot::RwLock;

use crate::error::RegistryError;
use crate::traits::PositionRegistry;
use crate::types::PositionId;

/// Position holders keyed by id.
#[derive(Debug, Default)]
pub struct MemoryPositionRegistry {
    owners: RwLock<HashMap<PositionId, Address>>,
}

impl MemoryPositionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids held by `owner`, ascending.
    pub fn positions_of(&self, owner: &Address) -> Vec<PositionId> {
        let mut ids: Vec<PositionId> = self
            .owners
            .read()
            .iter()
            .filter(|(_, o)| *o == owner)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl PositionRegistry for MemoryPositionRegistry {
    fn owner_of(&self, id: PositionId) -> Option<Address> {
        self.owners.read().get(&id).copied()
    }

    fn mint(&self, to: &Address, id: PositionId) -> Result<(), RegistryError> {
        let mut owners = self.owners.write();
        if owners.contains_key(&id) {
            return Err(RegistryError::AlreadyMinted(id));
        }
        owners.insert(id, *to);
        Ok(())
    }

    fn transfer(&self, from: &Address, to: &Address, id: PositionId) -> Result<(), RegistryError> {
        let mut owners = self.owners.write();
        let owner = owners.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        if owner != from {
            return Err(RegistryError::NotOwner {
                position: id,
                caller: *from,
            });
        }
        *owner = *to;
        Ok(())
    }

    fn burn(&self, id: PositionId) -> Result<(), RegistryError> {
        self.owners
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(RegistryError::NotFound(id))
    }

    fn balance_of(&self, owner: &Address) -> u64 {
        self.owners.read().values().filter(|o| *o == owner).count() as u64
    }
}
