use core::fmt;

/// Exceptional halting conditions surfaced by frame operations.
///
/// Operations return these instead of raising; the interpreter reads the
/// value, transitions the frame to [`ExceptionalHalt`][crate::FrameState]
/// and discards the frame's substate. Individual opcodes own further
/// reasons beyond this set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExceptionalHaltReason {
    /// The code section targeted by CALLF or JUMPF does not exist.
    CodeSectionMissing,
    /// Entering the target section could exceed the operand stack limit.
    TooManyStackItems,
    /// Fewer operand stack items than the target section's declared inputs.
    TooFewInputsForCodeSection,
    /// JUMPF operand stack height does not line up with the target's inputs.
    JumpfStackMismatch,
    /// RETF stack height does not match the current section's declared outputs.
    IncorrectCodeSectionReturnOutputs,
    /// Pop or peek past the bottom of the operand stack.
    StackUnderflow,
    /// Push past the operand stack limit.
    StackOverflow,
    /// Gas remaining went below the cost of the current operation.
    InsufficientGas,
    /// Jump to a destination that is not a valid JUMPDEST.
    InvalidJumpDestination,
}

impl ExceptionalHaltReason {
    /// Human readable description, stable across releases.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::CodeSectionMissing => "No code section at requested index",
            Self::TooManyStackItems => "Too many stack items",
            Self::TooFewInputsForCodeSection => "Code section has insufficient inputs",
            Self::JumpfStackMismatch => {
                "JUMPF stack height does not match called code section requirements"
            }
            Self::IncorrectCodeSectionReturnOutputs => {
                "Incorrect number of outputs at code section return"
            }
            Self::StackUnderflow => "Operand stack underflow",
            Self::StackOverflow => "Operand stack overflow",
            Self::InsufficientGas => "Out of gas",
            Self::InvalidJumpDestination => "Bad jump destination",
        }
    }
}

impl fmt::Display for ExceptionalHaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
