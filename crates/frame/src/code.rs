use alloy_primitives::Bytes;
use std::vec::Vec;

/// A contiguous block of instructions with a declared stack contract.
///
/// Field widths follow the container format: `inputs` is `0x00..=0x7f`,
/// `outputs` is `0x00..=0x80` (`0x80` marks a non-returning section) and
/// `max_stack_height` is `0x0000..=0x03ff`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeSection {
    /// Offset of the section's first instruction within the container.
    pub entry_point: usize,
    /// Number of stack elements the section consumes.
    pub inputs: u8,
    /// Number of stack elements the section returns.
    pub outputs: u8,
    /// Maximum additional stack depth the section may use.
    pub max_stack_height: u16,
}

impl CodeSection {
    /// Returns a new code section.
    pub const fn new(inputs: u8, outputs: u8, max_stack_height: u16, entry_point: usize) -> Self {
        Self {
            entry_point,
            inputs,
            outputs,
            max_stack_height,
        }
    }

    /// Difference between outputs and inputs.
    #[inline]
    pub const fn io_diff(&self) -> i32 {
        self.outputs as i32 - self.inputs as i32
    }
}

/// Executable code, exposed to the frame as one or more sections.
///
/// Legacy bytecode is a single implicit section starting at offset zero;
/// structured containers declare many. An invalid container carries no
/// sections and execution starts at offset zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Code {
    bytecode: Bytes,
    sections: Vec<CodeSection>,
    valid: bool,
}

impl Code {
    /// Wraps legacy bytecode as a single section entered at offset zero.
    pub fn legacy(bytecode: Bytes) -> Self {
        Self {
            bytecode,
            sections: std::vec![CodeSection::new(0, 0, 0x03ff, 0)],
            valid: true,
        }
    }

    /// Wraps a structured container with its declared sections.
    pub fn structured(bytecode: Bytes, sections: Vec<CodeSection>) -> Self {
        Self {
            bytecode,
            sections,
            valid: true,
        }
    }

    /// Wraps a container that failed validation. Section lookup is unsafe on
    /// invalid code, so none are exposed.
    pub fn invalid(bytecode: Bytes) -> Self {
        Self {
            bytecode,
            sections: Vec::new(),
            valid: false,
        }
    }

    /// Whether the container passed validation and section lookup is safe.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The raw container bytes.
    #[inline]
    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Size of the container in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.bytecode.len()
    }

    /// Returns the code section at `index`, if declared.
    #[inline]
    pub fn code_section(&self, index: usize) -> Option<&CodeSection> {
        self.sections.get(index)
    }

    /// Number of declared code sections. Always one for legacy code.
    #[inline]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_code_is_single_section() {
        let code = Code::legacy(Bytes::from_static(&[0x60, 0x01, 0x00]));
        assert!(code.is_valid());
        assert_eq!(code.section_count(), 1);
        let section = code.code_section(0).unwrap();
        assert_eq!(section.entry_point, 0);
        assert_eq!(section.inputs, 0);
        assert!(code.code_section(1).is_none());
    }

    #[test]
    fn invalid_code_has_no_sections() {
        let code = Code::invalid(Bytes::from_static(&[0xef, 0x00]));
        assert!(!code.is_valid());
        assert!(code.code_section(0).is_none());
        assert_eq!(code.size(), 2);
    }

    #[test]
    fn structured_code_section_lookup() {
        let sections = std::vec![
            CodeSection::new(0, 0, 2, 0),
            CodeSection::new(1, 1, 1, 16),
        ];
        let code = Code::structured(Bytes::new(), sections);
        assert_eq!(code.section_count(), 2);
        assert_eq!(code.code_section(1).unwrap().entry_point, 16);
        assert_eq!(code.code_section(1).unwrap().io_diff(), 0);
    }
}
