use crate::{MessageFrame, StorageKey, StorageValue};
use alloy_primitives::Address;
use std::vec::Vec;

/// The stack of message frames of a transaction, exactly one of which is
/// executing at a time.
///
/// The stack owns every frame; frames refer to their parent by index, so a
/// child never outlives the entry holding its parent. Operations whose
/// answer depends on ancestor frames — EIP-2929 warmth, transient-storage
/// resolution, create tracking — live here and act on the executing (top)
/// frame.
#[derive(Debug, Default)]
pub struct FrameStack {
    frames: Vec<MessageFrame>,
}

impl FrameStack {
    /// Returns a new, empty frame stack.
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Number of frames on the stack.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the stack holds no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The executing frame, if any.
    #[inline]
    pub fn top(&self) -> Option<&MessageFrame> {
        self.frames.last()
    }

    /// The executing frame, if any.
    #[inline]
    pub fn top_mut(&mut self) -> Option<&mut MessageFrame> {
        self.frames.last_mut()
    }

    /// Index of the executing frame, if any.
    #[inline]
    pub fn top_index(&self) -> Option<usize> {
        self.frames.len().checked_sub(1)
    }

    /// The frame at `index`, if present.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&MessageFrame> {
        self.frames.get(index)
    }

    /// The frame at `index`, if present.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut MessageFrame> {
        self.frames.get_mut(index)
    }

    pub(crate) fn push(&mut self, frame: MessageFrame) -> usize {
        self.frames.push(frame);
        self.frames.len() - 1
    }

    /// Pops the completed top frame, handing ownership to the caller for
    /// merging or discarding.
    #[inline]
    pub fn pop(&mut self) -> Option<MessageFrame> {
        self.frames.pop()
    }

    // -- EIP-2929 warmth ----------------------------------------------

    /// Warms up `address` in the executing frame. Returns whether it was
    /// already warm in that frame or any of its ancestors.
    pub fn warm_up_address(&mut self, address: Address) -> bool {
        let Some(top) = self.frames.last_mut() else {
            return false;
        };
        let parent = top.parent_index();
        if top.warm_sets_mut().warm_up_address(address) {
            return true;
        }
        self.is_address_warm_from(parent, &address)
    }

    /// Warms up `(address, slot)` in the executing frame. Returns whether
    /// it was already warm in that frame or any of its ancestors.
    pub fn warm_up_storage(&mut self, address: Address, slot: StorageKey) -> bool {
        let Some(top) = self.frames.last_mut() else {
            return false;
        };
        let parent = top.parent_index();
        if top.warm_sets_mut().warm_up_storage(address, slot) {
            return true;
        }
        self.is_storage_warm_from(parent, &address, &slot)
    }

    fn is_address_warm_from(&self, mut cursor: Option<usize>, address: &Address) -> bool {
        while let Some(index) = cursor {
            let frame = &self.frames[index];
            if frame.warm_sets().contains_address(address) {
                return true;
            }
            cursor = frame.parent_index();
        }
        false
    }

    fn is_storage_warm_from(
        &self,
        mut cursor: Option<usize>,
        address: &Address,
        slot: &StorageKey,
    ) -> bool {
        while let Some(index) = cursor {
            let frame = &self.frames[index];
            if frame.warm_sets().contains_storage(address, slot) {
                return true;
            }
            cursor = frame.parent_index();
        }
        false
    }

    // -- Transient storage --------------------------------------------

    /// Reads `(address, slot)` from the executing frame, resolving through
    /// ancestors and defaulting to zero. The resolved value — the implicit
    /// zero included — is memoized in the executing frame, so later reads
    /// stop at the local overlay.
    pub fn transient_storage_value(&mut self, address: Address, slot: StorageKey) -> StorageValue {
        let Some(top) = self.frames.last() else {
            return StorageValue::ZERO;
        };
        if let Some(value) = top.transient_storage().get(&address, &slot) {
            return value;
        }
        let mut cursor = top.parent_index();
        let mut resolved = StorageValue::ZERO;
        while let Some(index) = cursor {
            let frame = &self.frames[index];
            if let Some(value) = frame.transient_storage().get(&address, &slot) {
                resolved = value;
                break;
            }
            cursor = frame.parent_index();
        }
        if let Some(top) = self.frames.last_mut() {
            top.transient_storage_mut().insert(address, slot, resolved);
        }
        resolved
    }

    /// Writes the executing frame's transient storage into its parent,
    /// last write wins. Call this only when the frame completed
    /// successfully; a reverted frame's overlay is simply dropped with it.
    pub fn commit_transient_storage(&mut self) {
        let Some(top_index) = self.top_index() else {
            return;
        };
        let Some(parent_index) = self.frames[top_index].parent_index() else {
            return;
        };
        debug_assert!(parent_index < top_index);
        let (head, tail) = self.frames.split_at_mut(top_index);
        head[parent_index]
            .transient_storage_mut()
            .extend_from(tail[0].transient_storage());
    }

    // -- Create tracking ----------------------------------------------

    /// Whether `address` was created by the executing frame or any of its
    /// ancestors within this transaction.
    pub fn was_created_in_transaction(&self, address: &Address) -> bool {
        let mut cursor = self.top_index();
        while let Some(index) = cursor {
            let frame = &self.frames[index];
            if frame.substate().contains_create(address) {
                return true;
            }
            cursor = frame.parent_index();
        }
        false
    }
}
