use alloy_primitives::{Address, B256, U256};

/// Distribution mode of a private transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Restriction {
    /// Payload distributed only to the named participants. The only mode
    /// currently implemented.
    Restricted,
    /// Payload visible to every node.
    Unrestricted,
}

/// The fields of a private transaction that validation consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrivateTransaction {
    /// Sender nonce within the private state.
    pub nonce: u64,
    /// Transferred value. Must be zero for private transactions.
    pub value: U256,
    /// Chain id the signature committed to, if replay protected.
    pub chain_id: Option<u64>,
    /// Distribution mode.
    pub restriction: Restriction,
    /// Sender recovered from the signature, or `None` when recovery
    /// failed.
    pub sender: Option<Address>,
    /// Transaction hash, for logging.
    pub hash: B256,
}
