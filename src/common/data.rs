//! Memory Access Types.
//!
//! This module defines the classification of memory accesses fed into the
//! trace decoder. Mode and width decide how the decoder interprets a raw
//! value, in particular whether a jump-table slot read is eligible for
//! opcode interpretation.

use std::fmt;

/// Direction of a traced memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessMode {
    /// Data read access.
    Read,

    /// Data write access.
    Write,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "R"),
            Self::Write => write!(f, "W"),
        }
    }
}

/// Width of a traced memory access.
///
/// The 68k accesses memory as bytes, words (16-bit), or longs (32-bit).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessWidth {
    /// 8-bit access.
    Byte,

    /// 16-bit access.
    Word,

    /// 32-bit access.
    Long,
}

impl AccessWidth {
    /// Returns the access size in bytes.
    pub fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Long => 4,
        }
    }

    /// Renders a raw value at this width into a fixed 8-character column
    /// (2, 4, or 8 hex digits, space padded).
    pub fn format_value(self, value: u32) -> String {
        match self {
            Self::Byte => format!("{:02x}      ", value),
            Self::Word => format!("{:04x}    ", value),
            Self::Long => format!("{:08x}", value),
        }
    }
}
