use crate::{
    env::{BlockHashLookup, BlockValues, ContextVariables},
    frame_stack::FrameStack,
    Code, ExceptionalHaltReason, Memory, ReturnStack, ReturnStackItem, Stack, StorageKey,
    StorageValue, Substate, TransientStorage, WarmSets, WorldUpdater,
};
use alloy_primitives::{map::HashSet, Address, Bytes, Log, B256, U256};
use core::fmt;
use std::{boxed::Box, sync::Arc, vec::Vec};

/// Default operand stack bound of a frame.
pub const DEFAULT_MAX_STACK_SIZE: usize = crate::STACK_LIMIT;

/// The kind of message a frame executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameType {
    /// Contract initialization code with a value endowment.
    ContractCreation,
    /// A call between two accounts, possibly executing recipient code.
    MessageCall,
}

/// Execution lifecycle of a frame.
///
/// ```text
/// NOT_STARTED ──► CODE_EXECUTING ──► CODE_SUCCESS ──► COMPLETED_SUCCESS
///            │         │    ▲                │
///            │         │    └──CODE_SUSPENDED┘          (child call in flight)
///            │         ├──► EXCEPTIONAL_HALT ──► COMPLETED_FAILED
///            │         └──► REVERT           ──► COMPLETED_FAILED
///            └─────────────► EXCEPTIONAL_HALT ──► COMPLETED_FAILED
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameState {
    /// Execution has not started.
    NotStarted,
    /// Code execution is in progress.
    CodeExecuting,
    /// Code execution finished successfully.
    CodeSuccess,
    /// Execution is suspended while a child frame runs.
    CodeSuspended,
    /// An exceptional halting condition occurred.
    ExceptionalHalt,
    /// State changes were reverted during execution.
    Revert,
    /// The frame failed to complete successfully and has been finalized.
    CompletedFailed,
    /// The frame completed successfully and has been finalized.
    CompletedSuccess,
}

impl FrameState {
    /// Whether the frame has been finalized.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::CompletedSuccess | Self::CompletedFailed)
    }

    /// Whether the lifecycle permits moving to `next` from this state.
    pub const fn can_transition_to(self, next: FrameState) -> bool {
        match self {
            Self::NotStarted => {
                matches!(next, Self::CodeExecuting | Self::ExceptionalHalt)
            }
            Self::CodeExecuting => matches!(
                next,
                Self::CodeSuccess | Self::CodeSuspended | Self::ExceptionalHalt | Self::Revert
            ),
            Self::CodeSuspended => matches!(next, Self::CodeExecuting),
            Self::CodeSuccess => matches!(next, Self::CompletedSuccess),
            Self::ExceptionalHalt | Self::Revert => matches!(next, Self::CompletedFailed),
            Self::CompletedSuccess | Self::CompletedFailed => false,
        }
    }
}

/// Descriptor of the operation currently executing, for tracers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operation {
    /// Opcode byte.
    pub opcode: u8,
    /// Mnemonic.
    pub name: &'static str,
}

/// The last explicit memory mutation, for tracers.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryEntry {
    /// Offset of the write.
    pub offset: u64,
    /// Image of the bytes written, padding included.
    pub value: Bytes,
}

/// The last explicit storage mutation, for tracers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageEntry {
    /// Slot written.
    pub slot: StorageKey,
    /// Value written.
    pub value: StorageValue,
}

/// Callback invoked exactly once when a frame reaches a terminal state.
pub type Completer = Box<dyn FnOnce(&mut MessageFrame)>;

/// Frame construction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameBuildError {
    /// A mandatory builder field was not provided.
    #[error("missing message frame {0}")]
    MissingField(&'static str),
}

/// A container object for all the state associated with a message.
///
/// A message corresponds to an interaction between two accounts; a
/// transaction spawns at least one, and messages spawn further messages as
/// calls nest. The interpreter picks the frame off the top of a
/// [`FrameStack`], reads its environment, and mutates its machine state and
/// substate one instruction at a time. Frames are created through
/// [`MessageFrame::builder`].
pub struct MessageFrame {
    // Metadata.
    frame_type: FrameType,
    state: FrameState,

    // Machine state.
    gas_remaining: i64,
    pc: i64,
    section: usize,
    max_stack_size: usize,
    stack: Stack,
    return_stack: ReturnStack,
    memory: Memory,
    output_data: Bytes,
    return_data: Bytes,
    is_static: bool,
    depth: u32,

    // Substate.
    substate: Substate,
    warm: WarmSets,
    transient_storage: TransientStorage,

    // Execution environment, fixed at construction.
    recipient: Address,
    originator: Address,
    contract: Address,
    sender: Address,
    value: U256,
    apparent_value: U256,
    gas_price: U256,
    input_data: Bytes,
    code: Arc<Code>,
    block_values: BlockValues,
    mining_beneficiary: Address,
    block_hash_lookup: BlockHashLookup,
    context_variables: ContextVariables,
    versioned_hashes: Option<Vec<B256>>,

    // Tracer hooks.
    maybe_updated_memory: Option<MemoryEntry>,
    maybe_updated_storage: Option<StorageEntry>,
    exceptional_halt_reason: Option<ExceptionalHaltReason>,
    current_operation: Option<Operation>,
    revert_reason: Option<Bytes>,

    // Links.
    parent: Option<usize>,
    completer: Option<Completer>,
}

impl fmt::Debug for MessageFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageFrame")
            .field("type", &self.frame_type)
            .field("state", &self.state)
            .field("gas_remaining", &self.gas_remaining)
            .field("pc", &self.pc)
            .field("section", &self.section)
            .field("stack_size", &self.stack.len())
            .field("recipient", &self.recipient)
            .field("contract", &self.contract)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl MessageFrame {
    /// Returns a builder for a new frame.
    pub fn builder<'a>() -> MessageFrameBuilder<'a> {
        MessageFrameBuilder::default()
    }

    // -- Machine state -------------------------------------------------

    /// The program counter. May legally be `-1` transiently: section
    /// transfers pre-compensate for the interpreter's post-operation
    /// increment.
    #[inline]
    pub fn pc(&self) -> i64 {
        self.pc
    }

    /// Sets the program counter.
    #[inline]
    pub fn set_pc(&mut self, pc: i64) {
        self.pc = pc;
    }

    /// The current code section index. Always zero for legacy code.
    #[inline]
    pub fn section(&self) -> usize {
        self.section
    }

    /// Sets the code section index.
    #[inline]
    pub fn set_section(&mut self, section: usize) {
        self.section = section;
    }

    /// Whether the frame executes under static restrictions.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// The message stack depth of this frame.
    #[inline]
    pub fn message_stack_depth(&self) -> u32 {
        self.depth
    }

    // -- Gas -----------------------------------------------------------

    /// The amount of remaining gas.
    #[inline]
    pub fn remaining_gas(&self) -> i64 {
        self.gas_remaining
    }

    /// Sets the amount of remaining gas.
    #[inline]
    pub fn set_gas_remaining(&mut self, amount: i64) {
        self.gas_remaining = amount;
    }

    /// Increments the amount of remaining gas.
    #[inline]
    pub fn increment_remaining_gas(&mut self, amount: i64) {
        self.gas_remaining += amount;
    }

    /// Decrements the remaining gas and returns the new amount. The result
    /// may be negative; the caller treats a negative balance as
    /// insufficient gas.
    #[inline]
    pub fn decrement_remaining_gas(&mut self, amount: i64) -> i64 {
        self.gas_remaining -= amount;
        self.gas_remaining
    }

    /// Deducts all remaining gas.
    #[inline]
    pub fn clear_gas_remaining(&mut self) {
        self.gas_remaining = 0;
    }

    // -- Operand stack -------------------------------------------------

    /// Read-only view of the operand stack.
    #[inline]
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// The current operand stack size.
    #[inline]
    pub fn stack_size(&self) -> usize {
        self.stack.len()
    }

    /// The operand stack bound.
    #[inline]
    pub fn max_stack_size(&self) -> usize {
        self.max_stack_size
    }

    /// Pushes a value onto the operand stack.
    #[inline]
    pub fn push_stack_item(&mut self, value: U256) -> Result<(), ExceptionalHaltReason> {
        self.stack.push(value)
    }

    /// Pops the top of the operand stack.
    #[inline]
    pub fn pop_stack_item(&mut self) -> Result<U256, ExceptionalHaltReason> {
        self.stack.pop()
    }

    /// Pops `n` items off the operand stack.
    #[inline]
    pub fn pop_stack_items(&mut self, n: usize) -> Result<(), ExceptionalHaltReason> {
        self.stack.bulk_pop(n)
    }

    /// The item at `offset` from the top of the operand stack.
    #[inline]
    pub fn stack_item(&self, offset: usize) -> Result<U256, ExceptionalHaltReason> {
        self.stack.peek(offset)
    }

    /// Sets the item at `offset` from the top of the operand stack.
    #[inline]
    pub fn set_stack_item(
        &mut self,
        offset: usize,
        value: U256,
    ) -> Result<(), ExceptionalHaltReason> {
        self.stack.set(offset, value)
    }

    // -- Return stack --------------------------------------------------

    /// Read-only view of the return stack.
    #[inline]
    pub fn return_stack(&self) -> &ReturnStack {
        &self.return_stack
    }

    /// The current return stack size.
    #[inline]
    pub fn return_stack_size(&self) -> usize {
        self.return_stack.len()
    }

    /// The top of the return stack, if any.
    #[inline]
    pub fn peek_return_stack(&self) -> Option<ReturnStackItem> {
        self.return_stack.peek()
    }

    /// Whether the return stack holds no entries.
    #[inline]
    pub fn return_stack_is_empty(&self) -> bool {
        self.return_stack.is_empty()
    }

    /// Pushes an entry onto the return stack.
    #[inline]
    pub fn push_return_stack_item(&mut self, item: ReturnStackItem) {
        self.return_stack.push(item);
    }

    /// Pops the top entry off the return stack, if any.
    #[inline]
    pub fn pop_return_stack_item(&mut self) -> Option<ReturnStackItem> {
        self.return_stack.pop()
    }

    // -- Code-section control flow ------------------------------------

    /// CALLF: transfers execution to `called_section`, recording where to
    /// resume on the return stack.
    pub fn call_function(&mut self, called_section: usize) -> Result<(), ExceptionalHaltReason> {
        let Some(info) = self.code.code_section(called_section).copied() else {
            return Err(ExceptionalHaltReason::CodeSectionMissing);
        };
        if self.stack.len() + info.max_stack_height as usize > self.max_stack_size {
            return Err(ExceptionalHaltReason::TooManyStackItems);
        }
        if self.stack.len() < info.inputs as usize {
            return Err(ExceptionalHaltReason::TooFewInputsForCodeSection);
        }
        self.return_stack.push(ReturnStackItem::new(
            self.section,
            self.pc + 2,
            self.stack.len() - info.inputs as usize,
        ));
        // will be +1ed at the end of the operation loop
        self.pc = info.entry_point as i64 - 1;
        self.section = called_section;
        Ok(())
    }

    /// JUMPF: tail-transfers execution to `section` without growing the
    /// return stack.
    pub fn jump_function(&mut self, section: usize) -> Result<(), ExceptionalHaltReason> {
        let Some(info) = self.code.code_section(section).copied() else {
            return Err(ExceptionalHaltReason::CodeSectionMissing);
        };
        let return_height = self.peek_return_stack().map_or(0, |item| item.stack_height);
        if self.stack.len() != return_height + info.inputs as usize {
            return Err(ExceptionalHaltReason::JumpfStackMismatch);
        }
        // will be +1ed at the end of the operation loop
        self.pc = -1;
        self.section = section;
        Ok(())
    }

    /// RETF: returns from the current code section. Returning past the
    /// bottom of the return stack completes code execution.
    pub fn return_function(&mut self) -> Result<(), ExceptionalHaltReason> {
        let Some(info) = self.code.code_section(self.section).copied() else {
            return Err(ExceptionalHaltReason::CodeSectionMissing);
        };
        let Some(return_info) = self.return_stack.pop() else {
            return Err(ExceptionalHaltReason::StackUnderflow);
        };
        if return_info.stack_height + info.outputs as usize != self.stack.len() {
            return Err(ExceptionalHaltReason::IncorrectCodeSectionReturnOutputs);
        }
        if self.return_stack.is_empty() {
            self.set_state(FrameState::CodeSuccess);
            self.output_data = Bytes::new();
        } else {
            self.pc = return_info.pc;
            self.section = return_info.code_section_index;
        }
        Ok(())
    }

    // -- Memory --------------------------------------------------------

    /// Read-only view of the frame memory.
    #[inline]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// The memory word count if the given access were performed. Does not
    /// mutate.
    #[inline]
    pub fn calculate_memory_expansion(&self, offset: u64, length: u64) -> usize {
        self.memory.calculate_new_active_words(offset, length)
    }

    /// Expands memory to accommodate the given access.
    #[inline]
    pub fn expand_memory(&mut self, offset: u64, length: u64) {
        self.memory.ensure_capacity_for_bytes(offset, length);
    }

    /// Number of active bytes in memory.
    #[inline]
    pub fn memory_byte_size(&self) -> u64 {
        self.memory.active_bytes()
    }

    /// Number of active words in memory.
    #[inline]
    pub fn memory_word_size(&self) -> usize {
        self.memory.active_words()
    }

    /// Reads `length` bytes of memory at `offset` as an owned copy.
    pub fn read_memory(&mut self, offset: u64, length: u64) -> Bytes {
        self.memory.get_bytes(offset, length)
    }

    /// Reads `length` bytes of memory at `offset` as a mutable view.
    /// Contents are not stable beyond the current operation. When
    /// `explicit_read` is set the access is recorded for tracers.
    pub fn read_mutable_memory(
        &mut self,
        offset: u64,
        length: u64,
        explicit_read: bool,
    ) -> &mut [u8] {
        if explicit_read {
            let image = self.memory.get_bytes(offset, length);
            self.maybe_updated_memory = Some(MemoryEntry {
                offset,
                value: image,
            });
        }
        self.memory.get_mut_bytes(offset, length)
    }

    /// Writes a single byte of memory. `explicit_update` marks writes made
    /// by opcode semantics, which are recorded for tracers; internal writes
    /// are not.
    pub fn write_memory_byte(&mut self, offset: u64, value: u8, explicit_update: bool) {
        self.memory.set_byte(offset, value);
        if explicit_update {
            self.maybe_updated_memory = Some(MemoryEntry {
                offset,
                value: Bytes::copy_from_slice(&[value]),
            });
        }
    }

    /// Writes `length` bytes of memory at `offset`, right-padding a short
    /// source with zeros.
    pub fn write_memory(&mut self, offset: u64, length: u64, value: &Bytes, explicit_update: bool) {
        self.memory.set_bytes(offset, length, value);
        if explicit_update {
            self.record_updated_memory(offset, 0, length, value);
        }
    }

    /// Writes `length` bytes of memory at `offset` taken from
    /// `value[source_offset..]`, zero-filling what the source cannot cover.
    pub fn write_memory_from(
        &mut self,
        offset: u64,
        source_offset: u64,
        length: u64,
        value: &Bytes,
        explicit_update: bool,
    ) {
        self.memory.set_bytes_from(offset, source_offset, length, value);
        if explicit_update && length > 0 {
            self.record_updated_memory(offset, source_offset, length, value);
        }
    }

    /// Writes `value` right-aligned into `[offset, offset + length)`,
    /// left-padding a short source with zeros.
    pub fn write_memory_right_aligned(
        &mut self,
        offset: u64,
        length: u64,
        value: &Bytes,
        explicit_update: bool,
    ) {
        self.memory.set_bytes_right_aligned(offset, length, value);
        if explicit_update && length > 0 {
            let len = length as usize;
            let image = if value.len() >= len {
                Bytes::copy_from_slice(&value[..len])
            } else {
                let mut padded = std::vec![0u8; len];
                padded[len - value.len()..].copy_from_slice(value);
                Bytes::from(padded)
            };
            self.maybe_updated_memory = Some(MemoryEntry {
                offset,
                value: image,
            });
        }
    }

    /// Copies bytes within memory, as if through an intermediate buffer.
    pub fn copy_memory(&mut self, dst: u64, src: u64, length: u64, explicit_update: bool) {
        if length > 0 {
            self.memory.copy(dst, src, length);
            if explicit_update {
                let image = self.memory.get_bytes(dst, length);
                self.maybe_updated_memory = Some(MemoryEntry {
                    offset: dst,
                    value: image,
                });
            }
        }
    }

    fn record_updated_memory(&mut self, offset: u64, source_offset: u64, length: u64, value: &Bytes) {
        if length == 0 {
            return;
        }
        let len = length as usize;
        let src_start = core::cmp::min(source_offset as usize, value.len());
        let src_end = core::cmp::min(src_start + len, value.len());
        let mut image = std::vec![0u8; len];
        image[..src_end - src_start].copy_from_slice(&value[src_start..src_end]);
        self.maybe_updated_memory = Some(MemoryEntry {
            offset,
            value: Bytes::from(image),
        });
    }

    // -- Output and return data ---------------------------------------

    /// The output data.
    #[inline]
    pub fn output_data(&self) -> &Bytes {
        &self.output_data
    }

    /// Sets the output data.
    #[inline]
    pub fn set_output_data(&mut self, output: Bytes) {
        self.output_data = output;
    }

    /// Clears the output data buffer.
    #[inline]
    pub fn clear_output_data(&mut self) {
        self.output_data = Bytes::new();
    }

    /// The return data of the most recently completed child.
    #[inline]
    pub fn return_data(&self) -> &Bytes {
        &self.return_data
    }

    /// Sets the return data.
    #[inline]
    pub fn set_return_data(&mut self, return_data: Bytes) {
        self.return_data = return_data;
    }

    /// Clears the return data buffer.
    #[inline]
    pub fn clear_return_data(&mut self) {
        self.return_data = Bytes::new();
    }

    // -- Substate ------------------------------------------------------

    /// Read-only view of the accumulated substate.
    #[inline]
    pub fn substate(&self) -> &Substate {
        &self.substate
    }

    /// Accumulates a log.
    #[inline]
    pub fn add_log(&mut self, log: Log) {
        self.substate.add_log(log);
    }

    /// Accumulates logs in order.
    #[inline]
    pub fn add_logs(&mut self, logs: impl IntoIterator<Item = Log>) {
        self.substate.add_logs(logs);
    }

    /// Increments the gas refund.
    #[inline]
    pub fn increment_gas_refund(&mut self, amount: u64) {
        self.substate.increment_gas_refund(amount);
    }

    /// The accumulated gas refund.
    #[inline]
    pub fn gas_refund(&self) -> u64 {
        self.substate.gas_refund()
    }

    /// Adds `address` to the self-destruct set.
    #[inline]
    pub fn add_self_destruct(&mut self, address: Address) {
        self.substate.add_self_destruct(address);
    }

    /// Adds `address` to the create set.
    #[inline]
    pub fn add_create(&mut self, address: Address) {
        self.substate.add_create(address);
    }

    /// Records a refund owed to `beneficiary`.
    #[inline]
    pub fn add_refund(&mut self, beneficiary: Address, amount: U256) {
        self.substate.add_refund(beneficiary, amount);
    }

    /// Folds a successfully completed child's substate into this frame.
    /// The failed counterpart is simply not calling this.
    pub fn absorb_child_substate(&mut self, child: &MessageFrame) {
        self.substate.absorb(&child.substate);
    }

    // -- Warm sets and transient storage ------------------------------

    /// Read-only view of this frame's warm sets. Whether an entry is warm
    /// for gas purposes also depends on ancestors; ask the
    /// [`FrameStack`] for the chain-wide answer.
    #[inline]
    pub fn warm_sets(&self) -> &WarmSets {
        &self.warm
    }

    pub(crate) fn warm_sets_mut(&mut self) -> &mut WarmSets {
        &mut self.warm
    }

    /// Unions a successfully completed child's warm sets into this frame.
    pub fn merge_warmed_up_fields(&mut self, child: &MessageFrame) {
        if core::ptr::eq(self, child) {
            return;
        }
        self.warm.extend(&child.warm);
    }

    /// Read-only view of this frame's transient storage overlay. Reads that
    /// resolve through ancestors live on the [`FrameStack`].
    #[inline]
    pub fn transient_storage(&self) -> &TransientStorage {
        &self.transient_storage
    }

    pub(crate) fn transient_storage_mut(&mut self) -> &mut TransientStorage {
        &mut self.transient_storage
    }

    /// Sets a transient storage slot in this frame only.
    #[inline]
    pub fn set_transient_storage_value(
        &mut self,
        address: Address,
        slot: StorageKey,
        value: StorageValue,
    ) {
        self.transient_storage.insert(address, slot, value);
    }

    // -- Lifecycle -----------------------------------------------------

    /// The current execution state.
    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Sets the execution state.
    ///
    /// # Panics
    ///
    /// Panics when the transition is not part of the lifecycle; driving the
    /// state machine out of order is a programmer error.
    pub fn set_state(&mut self, state: FrameState) {
        assert!(
            self.state.can_transition_to(state),
            "illegal frame state transition: {:?} -> {:?}",
            self.state,
            state
        );
        self.state = state;
    }

    /// Invokes the completer. The first call after reaching a terminal
    /// state runs it; later calls are no-ops.
    pub fn notify_completion(&mut self) {
        debug_assert!(self.state.is_terminal());
        if let Some(completer) = self.completer.take() {
            completer(self);
        }
    }

    // -- Tracer hooks --------------------------------------------------

    /// The last explicit memory mutation, if any since [`reset`][Self::reset].
    #[inline]
    pub fn maybe_updated_memory(&self) -> Option<&MemoryEntry> {
        self.maybe_updated_memory.as_ref()
    }

    /// The last explicit storage mutation, if any since [`reset`][Self::reset].
    #[inline]
    pub fn maybe_updated_storage(&self) -> Option<&StorageEntry> {
        self.maybe_updated_storage.as_ref()
    }

    /// Records a storage mutation for tracers.
    #[inline]
    pub fn storage_was_updated(&mut self, slot: StorageKey, value: StorageValue) {
        self.maybe_updated_storage = Some(StorageEntry { slot, value });
    }

    /// Clears the per-operation tracer hooks. Called at the start of each
    /// operation.
    pub fn reset(&mut self) {
        self.maybe_updated_memory = None;
        self.maybe_updated_storage = None;
    }

    /// The reason for an exceptional halt, if one occurred.
    #[inline]
    pub fn exceptional_halt_reason(&self) -> Option<ExceptionalHaltReason> {
        self.exceptional_halt_reason
    }

    /// Sets the exceptional halt reason.
    #[inline]
    pub fn set_exceptional_halt_reason(&mut self, reason: Option<ExceptionalHaltReason>) {
        self.exceptional_halt_reason = reason;
    }

    /// The operation currently executing, if the interpreter published it.
    #[inline]
    pub fn current_operation(&self) -> Option<Operation> {
        self.current_operation
    }

    /// Publishes the operation about to execute.
    #[inline]
    pub fn set_current_operation(&mut self, operation: Operation) {
        self.current_operation = Some(operation);
    }

    /// The revert reason, if execution reverted with one.
    #[inline]
    pub fn revert_reason(&self) -> Option<&Bytes> {
        self.revert_reason.as_ref()
    }

    /// Sets the revert reason.
    #[inline]
    pub fn set_revert_reason(&mut self, reason: Bytes) {
        self.revert_reason = Some(reason);
    }

    // -- Environment ---------------------------------------------------

    /// The kind of message this frame executes.
    #[inline]
    pub fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    /// The account the message is addressed to.
    #[inline]
    pub fn recipient_address(&self) -> Address {
        self.recipient
    }

    /// The account that originated the transaction.
    #[inline]
    pub fn originator_address(&self) -> Address {
        self.originator
    }

    /// The account whose code is executing.
    #[inline]
    pub fn contract_address(&self) -> Address {
        self.contract
    }

    /// The account the message was sent from.
    #[inline]
    pub fn sender_address(&self) -> Address {
        self.sender
    }

    /// The value being transferred.
    #[inline]
    pub fn value(&self) -> U256 {
        self.value
    }

    /// The value as visible to the executing code; differs from
    /// [`value`][Self::value] under delegated calls.
    #[inline]
    pub fn apparent_value(&self) -> U256 {
        self.apparent_value
    }

    /// The gas price of the transaction.
    #[inline]
    pub fn gas_price(&self) -> U256 {
        self.gas_price
    }

    /// The input data of the message.
    #[inline]
    pub fn input_data(&self) -> &Bytes {
        &self.input_data
    }

    /// The code this frame executes.
    #[inline]
    pub fn code(&self) -> &Arc<Code> {
        &self.code
    }

    /// The enclosing block's values.
    #[inline]
    pub fn block_values(&self) -> &BlockValues {
        &self.block_values
    }

    /// The beneficiary of the block's fees.
    #[inline]
    pub fn mining_beneficiary(&self) -> Address {
        self.mining_beneficiary
    }

    /// Resolves the hash of block `number` through the configured lookup.
    #[inline]
    pub fn block_hash(&self, number: u64) -> B256 {
        (self.block_hash_lookup)(number)
    }

    /// The typed context variables attached at construction.
    #[inline]
    pub fn context_variables(&self) -> &ContextVariables {
        &self.context_variables
    }

    /// The versioned hashes of the transaction, if present.
    #[inline]
    pub fn versioned_hashes(&self) -> Option<&[B256]> {
        self.versioned_hashes.as_deref()
    }

    /// The index of the frame that spawned this one, or `None` for the
    /// root. Indexes into the owning [`FrameStack`].
    #[inline]
    pub fn parent_index(&self) -> Option<usize> {
        self.parent
    }
}

/// Validated, named-field construction of a [`MessageFrame`].
///
/// All fields without a documented default are mandatory; [`build`]
/// reports the first one missing.
///
/// [`build`]: MessageFrameBuilder::build
pub struct MessageFrameBuilder<'a> {
    frame_type: Option<FrameType>,
    world_updater: Option<&'a mut dyn WorldUpdater>,
    initial_gas: Option<i64>,
    recipient: Option<Address>,
    originator: Option<Address>,
    contract: Option<Address>,
    gas_price: Option<U256>,
    input_data: Option<Bytes>,
    sender: Option<Address>,
    value: Option<U256>,
    apparent_value: Option<U256>,
    code: Option<Arc<Code>>,
    block_values: Option<BlockValues>,
    depth: Option<u32>,
    is_static: bool,
    max_stack_size: usize,
    completer: Option<Completer>,
    mining_beneficiary: Option<Address>,
    block_hash_lookup: Option<BlockHashLookup>,
    context_variables: Option<ContextVariables>,
    reason: Option<Bytes>,
    access_list_warm_addresses: HashSet<Address>,
    access_list_warm_storage: HashSet<(Address, StorageKey)>,
    versioned_hashes: Option<Vec<B256>>,
}

impl Default for MessageFrameBuilder<'_> {
    fn default() -> Self {
        Self {
            frame_type: None,
            world_updater: None,
            initial_gas: None,
            recipient: None,
            originator: None,
            contract: None,
            gas_price: None,
            input_data: None,
            sender: None,
            value: None,
            apparent_value: None,
            code: None,
            block_values: None,
            depth: None,
            is_static: false,
            max_stack_size: DEFAULT_MAX_STACK_SIZE,
            completer: None,
            mining_beneficiary: None,
            block_hash_lookup: None,
            context_variables: None,
            reason: None,
            access_list_warm_addresses: HashSet::default(),
            access_list_warm_storage: HashSet::default(),
            versioned_hashes: None,
        }
    }
}

impl<'a> MessageFrameBuilder<'a> {
    /// Sets the frame type.
    pub fn frame_type(mut self, frame_type: FrameType) -> Self {
        self.frame_type = Some(frame_type);
        self
    }

    /// Sets the world updater used for access-list pre-warming.
    pub fn world_updater(mut self, world_updater: &'a mut dyn WorldUpdater) -> Self {
        self.world_updater = Some(world_updater);
        self
    }

    /// Sets the initial gas.
    pub fn initial_gas(mut self, initial_gas: i64) -> Self {
        self.initial_gas = Some(initial_gas);
        self
    }

    /// Sets the recipient address.
    pub fn recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    /// Sets the originator address.
    pub fn originator(mut self, originator: Address) -> Self {
        self.originator = Some(originator);
        self
    }

    /// Sets the executing contract address.
    pub fn contract(mut self, contract: Address) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Sets the gas price.
    pub fn gas_price(mut self, gas_price: U256) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    /// Sets the input data.
    pub fn input_data(mut self, input_data: Bytes) -> Self {
        self.input_data = Some(input_data);
        self
    }

    /// Sets the sender address.
    pub fn sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Sets the transferred value.
    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the apparent transferred value.
    pub fn apparent_value(mut self, apparent_value: U256) -> Self {
        self.apparent_value = Some(apparent_value);
        self
    }

    /// Sets the code to execute.
    pub fn code(mut self, code: impl Into<Arc<Code>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the block values.
    pub fn block_values(mut self, block_values: BlockValues) -> Self {
        self.block_values = Some(block_values);
        self
    }

    /// Sets the message stack depth.
    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Marks the frame static. Defaults to false.
    pub fn is_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Overrides the operand stack bound. Defaults to
    /// [`DEFAULT_MAX_STACK_SIZE`].
    pub fn max_stack_size(mut self, max_stack_size: usize) -> Self {
        self.max_stack_size = max_stack_size;
        self
    }

    /// Sets the completion callback.
    pub fn completer(mut self, completer: Completer) -> Self {
        self.completer = Some(completer);
        self
    }

    /// Sets the mining beneficiary.
    pub fn mining_beneficiary(mut self, mining_beneficiary: Address) -> Self {
        self.mining_beneficiary = Some(mining_beneficiary);
        self
    }

    /// Sets the block hash lookup.
    pub fn block_hash_lookup(mut self, block_hash_lookup: BlockHashLookup) -> Self {
        self.block_hash_lookup = Some(block_hash_lookup);
        self
    }

    /// Sets the context variables. Defaults to empty.
    pub fn context_variables(mut self, context_variables: ContextVariables) -> Self {
        self.context_variables = Some(context_variables);
        self
    }

    /// Sets a pre-existing revert reason.
    pub fn reason(mut self, reason: Bytes) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Seeds the warm address set from the transaction access list.
    pub fn access_list_warm_addresses(mut self, addresses: HashSet<Address>) -> Self {
        self.access_list_warm_addresses = addresses;
        self
    }

    /// Seeds the warm storage set from the transaction access list.
    pub fn access_list_warm_storage(mut self, storage: HashSet<(Address, StorageKey)>) -> Self {
        self.access_list_warm_storage = storage;
        self
    }

    /// Sets the versioned hashes of the transaction.
    pub fn versioned_hashes(mut self, versioned_hashes: Vec<B256>) -> Self {
        self.versioned_hashes = Some(versioned_hashes);
        self
    }

    /// Builds the frame, links it under the current top of `stack` and
    /// pushes it. Returns the index of the new frame.
    pub fn build(self, stack: &mut FrameStack) -> Result<usize, FrameBuildError> {
        let frame_type = self.frame_type.ok_or(FrameBuildError::MissingField("type"))?;
        let world_updater = self
            .world_updater
            .ok_or(FrameBuildError::MissingField("world updater"))?;
        let initial_gas = self
            .initial_gas
            .ok_or(FrameBuildError::MissingField("initial gas"))?;
        let recipient = self
            .recipient
            .ok_or(FrameBuildError::MissingField("recipient"))?;
        let originator = self
            .originator
            .ok_or(FrameBuildError::MissingField("originator"))?;
        let contract = self
            .contract
            .ok_or(FrameBuildError::MissingField("contract"))?;
        let gas_price = self
            .gas_price
            .ok_or(FrameBuildError::MissingField("gas price"))?;
        let input_data = self
            .input_data
            .ok_or(FrameBuildError::MissingField("input data"))?;
        let sender = self.sender.ok_or(FrameBuildError::MissingField("sender"))?;
        let value = self.value.ok_or(FrameBuildError::MissingField("value"))?;
        let apparent_value = self
            .apparent_value
            .ok_or(FrameBuildError::MissingField("apparent value"))?;
        let code = self.code.ok_or(FrameBuildError::MissingField("code"))?;
        let block_values = self
            .block_values
            .ok_or(FrameBuildError::MissingField("block values"))?;
        let depth = self.depth.ok_or(FrameBuildError::MissingField("depth"))?;
        let completer = self
            .completer
            .ok_or(FrameBuildError::MissingField("completer"))?;
        let mining_beneficiary = self
            .mining_beneficiary
            .ok_or(FrameBuildError::MissingField("mining beneficiary"))?;
        let block_hash_lookup = self
            .block_hash_lookup
            .ok_or(FrameBuildError::MissingField("block hash lookup"))?;

        let max_stack_size = self.max_stack_size;

        // Seed warmth: the access list plus the participants themselves.
        let mut warm = WarmSets::new();
        for address in self.access_list_warm_addresses.iter() {
            warm.warm_up_address(*address);
        }
        warm.warm_up_address(sender);
        warm.warm_up_address(contract);
        for (address, slot) in self.access_list_warm_storage.iter() {
            warm.warm_up_storage(*address, *slot);
        }

        // The warm addresses are a superset of the address keys in the warm
        // storage, so one pass over the access list primes every slot.
        for address in self.access_list_warm_addresses.iter() {
            if let Some(account) = world_updater.get(address) {
                for (slot_address, slot) in self.access_list_warm_storage.iter() {
                    if slot_address == address {
                        account.storage_value(*slot);
                    }
                }
            }
        }

        let pc = if code.is_valid() {
            code.code_section(0).map_or(0, |s| s.entry_point as i64)
        } else {
            0
        };

        let mut return_stack = ReturnStack::new();
        return_stack.push(ReturnStackItem::new(0, 0, 0));

        let frame = MessageFrame {
            frame_type,
            state: FrameState::NotStarted,
            gas_remaining: initial_gas,
            pc,
            section: 0,
            max_stack_size,
            stack: Stack::new(max_stack_size),
            return_stack,
            memory: Memory::new(),
            output_data: Bytes::new(),
            return_data: Bytes::new(),
            is_static: self.is_static,
            depth,
            substate: Substate::new(),
            warm,
            transient_storage: TransientStorage::new(),
            recipient,
            originator,
            contract,
            sender,
            value,
            apparent_value,
            gas_price,
            input_data,
            code,
            block_values,
            mining_beneficiary,
            block_hash_lookup,
            context_variables: self.context_variables.unwrap_or_default(),
            versioned_hashes: self.versioned_hashes,
            maybe_updated_memory: None,
            maybe_updated_storage: None,
            exceptional_halt_reason: None,
            current_operation: None,
            revert_reason: self.reason,
            parent: stack.top_index(),
            completer: Some(completer),
        };

        Ok(stack.push(frame))
    }
}
