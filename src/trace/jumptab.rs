//! Jump-table vector classification.
//!
//! Every library exposes an array of fixed-size vector slots immediately
//! below its base address, one per exported function. A slot holds either a
//! reserved trap pattern (the host intercepts the fetch and runs the virtual
//! implementation), an absolute-long jump into relocated native code, or the
//! historic reset pattern of an uninitialized vector. This module recognizes
//! exactly those three encodings and otherwise reports an inconclusive
//! decode; it is a coarse heuristic, not a disassembler.

use crate::common::{AccessMode, AccessWidth};
use crate::label::FdTable;

use super::Classification;

/// Absolute-long jump opcode occupying vectors that forward to genuine
/// relocated native code.
const OP_JMP: u32 = 0x4ef9;

/// Reset pattern left in vectors that were never initialized.
const OP_RESET: u32 = 0x04e70;

/// Byte stride of one vector slot.
const VECTOR_SIZE: u32 = 6;

/// Classifies an access into a library's jump table.
///
/// Applies only to addresses below the library base; an access at or above
/// the base is a normal field access inside the library node and gets no
/// decoration. Only byte and word reads attempt opcode interpretation;
/// writes and long reads below the base always degrade to an inconclusive
/// `JumpUnknown`.
pub(super) fn decode_vector(
    mode: AccessMode,
    width: AccessWidth,
    addr: u32,
    value: u32,
    lib_base: u32,
    fd: Option<&dyn FdTable>,
) -> (Classification, String) {
    if addr >= lib_base {
        return (Classification::None, String::new());
    }
    if mode != AccessMode::Read || width == AccessWidth::Long {
        return (Classification::JumpUnknown, String::new());
    }
    if (value & 0xf000) == 0xa000 {
        // trap pattern: host intercepts the fetch
        let bias = lib_base - addr;
        let mut addon = format!("-{} [{}]  ", bias, bias / VECTOR_SIZE);
        addon.push_str(&fd_signature(fd, bias));
        (Classification::Trap, addon)
    } else if value == OP_JMP {
        let bias = lib_base - addr;
        let mut addon = format!("-{}  ", bias);
        addon.push_str(&fd_signature(fd, bias));
        (Classification::Jump, addon)
    } else if value == OP_RESET {
        (Classification::Reset, String::new())
    } else {
        (Classification::JumpUnknown, String::new())
    }
}

fn fd_signature(fd: Option<&dyn FdTable>, bias: u32) -> String {
    fd.and_then(|table| table.func_by_bias(bias))
        .map(|func| func.signature)
        .unwrap_or_default()
}
