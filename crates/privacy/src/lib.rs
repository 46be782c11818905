//! # evmframe-privacy
//!
//! Validation rules for private transactions: zero value, the supported
//! restriction mode, chain-id pairing, signature recovery and nonce
//! progression against the sender's private account state.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc as std;

mod transaction;
mod validator;

pub use transaction::{PrivateTransaction, Restriction};
pub use validator::{PrivateTransactionInvalidReason, PrivateTransactionValidator};
