use crate::ExceptionalHaltReason;
use alloy_primitives::U256;
use core::fmt;
use std::vec::Vec;

/// Default operand stack limit.
pub const STACK_LIMIT: usize = 1024;

/// Bounded LIFO operand stack of 256-bit words.
///
/// The bound is enforced by [`push`][Stack::push]; callers that know the
/// eventual height up front (function entry checks) may also reject before
/// pushing.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stack {
    data: Vec<U256>,
    max_size: usize,
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, x) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{x}")?;
        }
        f.write_str("]")
    }
}

impl Default for Stack {
    #[inline]
    fn default() -> Self {
        Self::new(STACK_LIMIT)
    }
}

impl Stack {
    /// Instantiate a new stack bounded at `max_size` items.
    #[inline]
    pub fn new(max_size: usize) -> Self {
        Self {
            data: Vec::with_capacity(max_size),
            max_size,
        }
    }

    /// Returns the number of items on the stack.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether the stack is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the stack bound.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the underlying data of the stack, bottom first.
    #[inline]
    pub fn data(&self) -> &[U256] {
        &self.data
    }

    /// Push a new value onto the stack.
    ///
    /// If it would exceed the stack bound, returns `StackOverflow` and
    /// leaves the stack unchanged.
    #[inline]
    pub fn push(&mut self, value: U256) -> Result<(), ExceptionalHaltReason> {
        if self.data.len() == self.max_size {
            return Err(ExceptionalHaltReason::StackOverflow);
        }
        self.data.push(value);
        Ok(())
    }

    /// Removes the topmost element from the stack and returns it, or
    /// `StackUnderflow` if it is empty.
    #[inline]
    pub fn pop(&mut self) -> Result<U256, ExceptionalHaltReason> {
        self.data.pop().ok_or(ExceptionalHaltReason::StackUnderflow)
    }

    /// Peek a value at given index, where the top of the stack is at index
    /// `0`. If the index is too large, `StackUnderflow` is returned.
    #[inline]
    pub fn peek(&self, no_from_top: usize) -> Result<U256, ExceptionalHaltReason> {
        if self.data.len() > no_from_top {
            Ok(self.data[self.data.len() - no_from_top - 1])
        } else {
            Err(ExceptionalHaltReason::StackUnderflow)
        }
    }

    /// Set a value at given index, where the top of the stack is at index
    /// `0`. If the index is too large, `StackUnderflow` is returned.
    #[inline]
    pub fn set(&mut self, no_from_top: usize, value: U256) -> Result<(), ExceptionalHaltReason> {
        if self.data.len() > no_from_top {
            let len = self.data.len();
            self.data[len - no_from_top - 1] = value;
            Ok(())
        } else {
            Err(ExceptionalHaltReason::StackUnderflow)
        }
    }

    /// Removes the topmost `n` elements from the stack, or `StackUnderflow`
    /// if fewer are present.
    #[inline]
    pub fn bulk_pop(&mut self, n: usize) -> Result<(), ExceptionalHaltReason> {
        if self.data.len() < n {
            return Err(ExceptionalHaltReason::StackUnderflow);
        }
        self.data.truncate(self.data.len() - n);
        Ok(())
    }
}
