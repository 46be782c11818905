//! # evmframe
//!
//! The per-call execution context of an EVM interpreter.
//!
//! A message corresponds to an interaction between two accounts. Every
//! message executed within a transaction is backed by a [`MessageFrame`]:
//! the container the interpreter mutates on each instruction. Frames are
//! created through [`MessageFrameBuilder`], live on a [`FrameStack`], and
//! are merged into (or discarded by) their parent when they terminate.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(not(feature = "std"))]
extern crate alloc as std;

mod code;
mod env;
mod frame;
mod frame_stack;
mod halt;
mod memory;
mod return_stack;
mod stack;
mod substate;
mod transient;
mod warm;
mod world;

pub use code::{Code, CodeSection};
pub use env::{BlockHashLookup, BlockValues, ContextValue, ContextVariables};
pub use frame::{
    Completer, FrameBuildError, FrameState, FrameType, MemoryEntry, MessageFrame,
    MessageFrameBuilder, Operation, StorageEntry, DEFAULT_MAX_STACK_SIZE,
};
pub use frame_stack::FrameStack;
pub use halt::ExceptionalHaltReason;
pub use memory::{num_words, Memory};
pub use return_stack::{ReturnStack, ReturnStackItem};
pub use stack::{Stack, STACK_LIMIT};
pub use substate::Substate;
pub use transient::TransientStorage;
pub use warm::WarmSets;
pub use world::{Account, WorldUpdater};

/// Storage slot key within an account.
pub type StorageKey = alloy_primitives::U256;

/// Value held in a storage slot.
pub type StorageValue = alloy_primitives::U256;
