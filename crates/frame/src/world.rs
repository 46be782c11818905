use crate::{StorageKey, StorageValue};
use alloy_primitives::Address;

/// Storage access on a single account.
pub trait Account {
    /// Reads the value at `key`, priming whatever caches the implementation
    /// keeps for later reads.
    fn storage_value(&mut self, key: StorageKey) -> StorageValue;
}

/// The slice of world state the frame core consumes: account lookup while
/// seeding access-list warm-ups at construction.
pub trait WorldUpdater {
    /// Returns the account at `address`, if it exists.
    fn get(&mut self, address: &Address) -> Option<&mut dyn Account>;
}
