use crate::StorageKey;
use alloy_primitives::{map::HashSet, Address};

/// Warm addresses and storage slots accumulated by a single frame.
///
/// Membership is monotone for the life of the frame; a reverting frame is
/// discarded wholesale rather than rolled back. Whether an entry is warm in
/// the EIP-2929 sense also depends on ancestor frames, which is answered by
/// [`FrameStack`][crate::FrameStack].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WarmSets {
    addresses: HashSet<Address>,
    storage: HashSet<(Address, StorageKey)>,
}

impl WarmSets {
    /// Returns new, empty warm sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `address` to the local set. Returns whether the local set
    /// already held it.
    #[inline]
    pub fn warm_up_address(&mut self, address: Address) -> bool {
        !self.addresses.insert(address)
    }

    /// Adds `(address, slot)` to the local set. Returns whether the local
    /// set already held it.
    #[inline]
    pub fn warm_up_storage(&mut self, address: Address, slot: StorageKey) -> bool {
        !self.storage.insert((address, slot))
    }

    /// Whether `address` is warm in this frame alone.
    #[inline]
    pub fn contains_address(&self, address: &Address) -> bool {
        self.addresses.contains(address)
    }

    /// Whether `(address, slot)` is warm in this frame alone.
    #[inline]
    pub fn contains_storage(&self, address: &Address, slot: &StorageKey) -> bool {
        self.storage.contains(&(*address, *slot))
    }

    /// Unions `other` into this set. Idempotent and commutative; this is
    /// the merge applied when a child frame completes successfully.
    pub fn extend(&mut self, other: &WarmSets) {
        self.addresses.extend(other.addresses.iter().copied());
        self.storage.extend(other.storage.iter().copied());
    }

    /// The warm addresses of this frame.
    #[inline]
    pub fn addresses(&self) -> &HashSet<Address> {
        &self.addresses
    }

    /// The warm storage slots of this frame.
    #[inline]
    pub fn storage(&self) -> &HashSet<(Address, StorageKey)> {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[test]
    fn warm_up_reports_prior_local_membership() {
        let mut warm = WarmSets::new();
        let address = Address::with_last_byte(1);
        assert!(!warm.warm_up_address(address));
        assert!(warm.warm_up_address(address));
        assert!(warm.contains_address(&address));

        assert!(!warm.warm_up_storage(address, U256::from(7)));
        assert!(warm.warm_up_storage(address, U256::from(7)));
        assert!(!warm.warm_up_storage(address, U256::from(8)));
    }

    #[test]
    fn extend_is_idempotent() {
        let mut a = WarmSets::new();
        a.warm_up_address(Address::with_last_byte(1));

        let mut b = WarmSets::new();
        b.warm_up_address(Address::with_last_byte(2));
        b.warm_up_storage(Address::with_last_byte(2), U256::from(1));

        a.extend(&b);
        let once = a.clone();
        a.extend(&b);
        assert_eq!(a, once);
        assert!(a.contains_address(&Address::with_last_byte(1)));
        assert!(a.contains_storage(&Address::with_last_byte(2), &U256::from(1)));
    }
}
