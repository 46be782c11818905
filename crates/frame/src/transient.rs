use crate::{StorageKey, StorageValue};
use alloy_primitives::{map::HashMap, Address};

/// Per-frame transient storage overlay, keyed by `(address, slot)`.
///
/// This is only the local layer: resolution through ancestor frames, the
/// implicit-zero default and commit-to-parent live on
/// [`FrameStack`][crate::FrameStack], which can see the whole chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransientStorage {
    slots: HashMap<(Address, StorageKey), StorageValue>,
}

impl TransientStorage {
    /// Returns a new, empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// The value set in this frame for `(address, slot)`, if any.
    #[inline]
    pub fn get(&self, address: &Address, slot: &StorageKey) -> Option<StorageValue> {
        self.slots.get(&(*address, *slot)).copied()
    }

    /// Sets `(address, slot)` in this frame only.
    #[inline]
    pub fn insert(&mut self, address: Address, slot: StorageKey, value: StorageValue) {
        self.slots.insert((address, slot), value);
    }

    /// Overwrites this overlay with every entry of `other`, last write wins.
    /// This is the commit half of a child completing successfully.
    pub fn extend_from(&mut self, other: &TransientStorage) {
        for (key, value) in other.slots.iter() {
            self.slots.insert(*key, *value);
        }
    }

    /// Number of entries set in this frame.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether this frame set any entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[test]
    fn unset_slots_are_absent() {
        let storage = TransientStorage::new();
        assert!(storage.is_empty());
        assert_eq!(storage.get(&Address::ZERO, &U256::from(5)), None);
    }

    #[test]
    fn insert_then_get() {
        let mut storage = TransientStorage::new();
        storage.insert(Address::ZERO, U256::from(5), U256::from(42));
        assert_eq!(
            storage.get(&Address::ZERO, &U256::from(5)),
            Some(U256::from(42))
        );
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn extend_overwrites_existing_keys() {
        let mut parent = TransientStorage::new();
        parent.insert(Address::ZERO, U256::from(5), U256::from(1));

        let mut child = TransientStorage::new();
        child.insert(Address::ZERO, U256::from(5), U256::from(2));
        child.insert(Address::ZERO, U256::from(6), U256::from(3));

        parent.extend_from(&child);
        assert_eq!(
            parent.get(&Address::ZERO, &U256::from(5)),
            Some(U256::from(2))
        );
        assert_eq!(
            parent.get(&Address::ZERO, &U256::from(6)),
            Some(U256::from(3))
        );
    }
}
