use alloy_primitives::{map::HashMap, Bytes, B256, U256};
use std::{boxed::Box, string::String};

/// Narrow read-only view of the enclosing block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockValues {
    /// Block height.
    pub number: u64,
    /// Timestamp in seconds since the UNIX epoch.
    pub timestamp: u64,
    /// Gas limit of the block.
    pub gas_limit: u64,
    /// Base fee per gas, if the fee market is active.
    pub basefee: U256,
    /// Difficulty of the block. Unused after the merge.
    pub difficulty: U256,
    /// Output of the randomness beacon, replacing `difficulty` after the
    /// merge.
    pub prevrandao: Option<B256>,
}

/// Resolves a block number to its hash.
pub type BlockHashLookup = Box<dyn Fn(u64) -> B256>;

/// A typed context value attached to a frame at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContextValue {
    Bool(bool),
    Word(U256),
    Hash(B256),
    Bytes(Bytes),
}

/// Out-of-band values the embedder threads through to operations, fixed at
/// frame construction.
///
/// Values are discriminated rather than type-erased, so lookups never
/// downcast; pull what you need out once when the frame is built rather
/// than per instruction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContextVariables {
    vars: HashMap<String, ContextValue>,
}

impl ContextVariables {
    /// Returns a new, empty variable map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`.
    pub fn insert(&mut self, name: impl Into<String>, value: ContextValue) {
        self.vars.insert(name.into(), value);
    }

    /// The value stored under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&ContextValue> {
        self.vars.get(name)
    }

    /// Whether a value is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// The boolean stored under `name`, or `default` when absent or of
    /// another type.
    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.vars.get(name) {
            Some(ContextValue::Bool(value)) => *value,
            _ => default,
        }
    }

    /// The word stored under `name`, if present with that type.
    pub fn get_word(&self, name: &str) -> Option<U256> {
        match self.vars.get(name) {
            Some(ContextValue::Word(value)) => Some(*value),
            _ => None,
        }
    }

    /// The hash stored under `name`, if present with that type.
    pub fn get_hash(&self, name: &str) -> Option<B256> {
        match self.vars.get(name) {
            Some(ContextValue::Hash(value)) => Some(*value),
            _ => None,
        }
    }

    /// The byte string stored under `name`, if present with that type.
    pub fn get_bytes(&self, name: &str) -> Option<&Bytes> {
        match self.vars.get(name) {
            Some(ContextValue::Bytes(value)) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_lookups() {
        let mut vars = ContextVariables::new();
        vars.insert("persisting", ContextValue::Bool(true));
        vars.insert("tx-hash", ContextValue::Hash(B256::with_last_byte(9)));

        assert!(vars.contains("persisting"));
        assert!(vars.get_bool("persisting", false));
        assert!(!vars.get_bool("missing", false));
        assert_eq!(vars.get_hash("tx-hash"), Some(B256::with_last_byte(9)));
        // a value of the wrong type falls back
        assert!(!vars.get_bool("tx-hash", false));
        assert_eq!(vars.get_word("tx-hash"), None);
    }
}
