use crate::{PrivateTransaction, Restriction};
use log::debug;

/// Why a private transaction failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrivateTransactionInvalidReason {
    #[error("private transaction value is not zero")]
    PrivateValueNotZero,
    #[error("unsupported private transaction type")]
    PrivateUnimplementedTransactionType,
    #[error("sender could not be extracted from transaction signature")]
    InvalidSignature,
    #[error("transaction was meant for another chain")]
    WrongChainId,
    #[error("replay protection (chainId) is not supported")]
    ReplayProtectedSignaturesNotSupported,
    #[error("private transaction nonce is lower than sender account nonce")]
    PrivateNonceTooLow,
    #[error("private transaction nonce does not match sender account nonce")]
    IncorrectPrivateNonce,
}

/// Validates private transactions against this node's chain id and the
/// sender's private account state.
#[derive(Clone, Debug, Default)]
pub struct PrivateTransactionValidator {
    chain_id: Option<u64>,
}

impl PrivateTransactionValidator {
    /// Returns a validator for a node on `chain_id`, or a chain without
    /// replay protection when `None`.
    pub fn new(chain_id: Option<u64>) -> Self {
        Self { chain_id }
    }

    /// Validates `transaction` against `account_nonce`, the sender's
    /// current nonce in the private state. `allow_future_nonces` permits
    /// nonces beyond the next expected one.
    pub fn validate(
        &self,
        transaction: &PrivateTransaction,
        account_nonce: u64,
        allow_future_nonces: bool,
    ) -> Result<(), PrivateTransactionInvalidReason> {
        debug!(
            "validating private transaction fields of {}",
            transaction.hash
        );
        if let Err(reason) = self.validate_private_fields(transaction) {
            debug!(
                "private transaction fields are invalid {}, {}",
                transaction.hash, reason
            );
            return Err(reason);
        }

        debug!(
            "validating the signature of private transaction {}",
            transaction.hash
        );
        if let Err(reason) = self.validate_signature(transaction) {
            debug!(
                "private transaction {} failed validation, {}",
                transaction.hash, reason
            );
            return Err(reason);
        }

        debug!(
            "validating actual nonce {} with expected nonce {}",
            transaction.nonce, account_nonce
        );
        if account_nonce > transaction.nonce {
            debug!(
                "private transaction nonce {} is lower than sender account nonce {}",
                transaction.nonce, account_nonce
            );
            return Err(PrivateTransactionInvalidReason::PrivateNonceTooLow);
        }
        if !allow_future_nonces && account_nonce != transaction.nonce {
            debug!(
                "private transaction nonce {} does not match sender account nonce {}",
                transaction.nonce, account_nonce
            );
            return Err(PrivateTransactionInvalidReason::IncorrectPrivateNonce);
        }

        Ok(())
    }

    fn validate_private_fields(
        &self,
        transaction: &PrivateTransaction,
    ) -> Result<(), PrivateTransactionInvalidReason> {
        if !transaction.value.is_zero() {
            return Err(PrivateTransactionInvalidReason::PrivateValueNotZero);
        }
        if transaction.restriction != Restriction::Restricted {
            return Err(PrivateTransactionInvalidReason::PrivateUnimplementedTransactionType);
        }
        Ok(())
    }

    fn validate_signature(
        &self,
        transaction: &PrivateTransaction,
    ) -> Result<(), PrivateTransactionInvalidReason> {
        match (self.chain_id, transaction.chain_id) {
            (Some(ours), Some(theirs)) if ours != theirs => {
                return Err(PrivateTransactionInvalidReason::WrongChainId);
            }
            (None, Some(_)) => {
                return Err(
                    PrivateTransactionInvalidReason::ReplayProtectedSignaturesNotSupported,
                );
            }
            _ => {}
        }
        if transaction.sender.is_none() {
            return Err(PrivateTransactionInvalidReason::InvalidSignature);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, U256};

    fn transaction() -> PrivateTransaction {
        PrivateTransaction {
            nonce: 5,
            value: U256::ZERO,
            chain_id: Some(1),
            restriction: Restriction::Restricted,
            sender: Some(Address::with_last_byte(1)),
            hash: B256::with_last_byte(0xfe),
        }
    }

    #[test]
    fn accepts_a_well_formed_transaction() {
        let validator = PrivateTransactionValidator::new(Some(1));
        assert_eq!(validator.validate(&transaction(), 5, false), Ok(()));
    }

    #[test]
    fn rejects_nonzero_value() {
        let validator = PrivateTransactionValidator::new(Some(1));
        let tx = PrivateTransaction {
            value: U256::from(1),
            ..transaction()
        };
        assert_eq!(
            validator.validate(&tx, 5, false),
            Err(PrivateTransactionInvalidReason::PrivateValueNotZero)
        );
    }

    #[test]
    fn rejects_unrestricted_distribution() {
        let validator = PrivateTransactionValidator::new(Some(1));
        let tx = PrivateTransaction {
            restriction: Restriction::Unrestricted,
            ..transaction()
        };
        assert_eq!(
            validator.validate(&tx, 5, false),
            Err(PrivateTransactionInvalidReason::PrivateUnimplementedTransactionType)
        );
    }

    #[test]
    fn rejects_mismatched_chain_id() {
        let validator = PrivateTransactionValidator::new(Some(1));
        let tx = PrivateTransaction {
            chain_id: Some(2),
            ..transaction()
        };
        assert_eq!(
            validator.validate(&tx, 5, false),
            Err(PrivateTransactionInvalidReason::WrongChainId)
        );
    }

    #[test]
    fn rejects_replay_protection_when_unsupported() {
        let validator = PrivateTransactionValidator::new(None);
        let tx = PrivateTransaction {
            chain_id: Some(1),
            ..transaction()
        };
        assert_eq!(
            validator.validate(&tx, 5, false),
            Err(PrivateTransactionInvalidReason::ReplayProtectedSignaturesNotSupported)
        );
    }

    #[test]
    fn accepts_unprotected_signature_on_unprotected_chain() {
        let validator = PrivateTransactionValidator::new(None);
        let tx = PrivateTransaction {
            chain_id: None,
            ..transaction()
        };
        assert_eq!(validator.validate(&tx, 5, false), Ok(()));
    }

    #[test]
    fn rejects_unrecoverable_sender() {
        let validator = PrivateTransactionValidator::new(Some(1));
        let tx = PrivateTransaction {
            sender: None,
            ..transaction()
        };
        assert_eq!(
            validator.validate(&tx, 5, false),
            Err(PrivateTransactionInvalidReason::InvalidSignature)
        );
    }

    #[test]
    fn rejects_stale_nonce() {
        let validator = PrivateTransactionValidator::new(Some(1));
        let tx = PrivateTransaction {
            nonce: 4,
            ..transaction()
        };
        assert_eq!(
            validator.validate(&tx, 5, false),
            Err(PrivateTransactionInvalidReason::PrivateNonceTooLow)
        );
    }

    #[test]
    fn future_nonce_needs_opt_in() {
        let validator = PrivateTransactionValidator::new(Some(1));
        let tx = PrivateTransaction {
            nonce: 6,
            ..transaction()
        };
        assert_eq!(
            validator.validate(&tx, 5, false),
            Err(PrivateTransactionInvalidReason::IncorrectPrivateNonce)
        );
        assert_eq!(validator.validate(&tx, 5, true), Ok(()));
    }
}
