//! Memory labels and symbolic lookup interfaces.
//!
//! A label is an allocator-supplied descriptor for an address range: a name
//! plus at most one extension telling the trace decoder what the region is
//! (a library node with its jump table, a typed structure instance, or a
//! loaded code segment with debug info). Labels are read-only views; this
//! core queries them but never owns or mutates them.
//!
//! The traits in this module are the contracts of external collaborators
//! (loader, allocator, disassembler); production implementations live in the
//! respective subsystems.

use std::rc::Rc;

/// One exported library function as listed in a function-descriptor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDef {
    /// Function name.
    pub name: String,

    /// Negative byte offset of the function's vector slot from the library
    /// base.
    pub bias: u32,

    /// Rendered call signature, appended to trap/jump trace annotations.
    pub signature: String,
}

/// Function-descriptor table of a library, keyed by vector bias.
pub trait FdTable {
    /// Looks up the function occupying the vector slot at `bias`.
    fn func_by_bias(&self, bias: u32) -> Option<FuncDef>;
}

/// A source file/line pair from a segment's debug-line table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// Source file name.
    pub file: String,

    /// 1-based source line.
    pub line: u32,
}

/// Symbol and debug-line access for a loaded code/data segment.
pub trait SegmentInfo {
    /// Returns the symbol enclosing `rel_addr` (relative to the segment
    /// start), if the segment carries a symbol table.
    fn find_symbol(&self, rel_addr: u32) -> Option<String>;

    /// Returns the source location for `rel_addr`, if the segment carries a
    /// debug-line table.
    fn find_debug_line(&self, rel_addr: u32) -> Option<SourceLine>;
}

/// Region-kind extension of a label.
///
/// At most one extension applies per label. Modeled as a sum type so decode
/// logic is exhaustive and a new region kind is a compile-time-checked
/// addition.
pub enum LabelExt {
    /// Plain region without further structure.
    None,

    /// The region is a library's in-memory node plus its negative-offset
    /// jump table.
    Lib {
        /// Base address of the library node; the jump table occupies
        /// addresses below it.
        lib_base: u32,
        /// Function-descriptor table for annotating vector accesses.
        fd: Option<Rc<dyn FdTable>>,
    },

    /// The region holds an instance of a typed structure.
    Struct {
        /// Address of the first structure byte.
        begin: u32,
        /// Structure size in bytes.
        size: u32,
        /// Structure type identifier for field lookup.
        type_name: String,
    },

    /// The region belongs to a loaded code/data segment.
    Segment {
        /// Symbol table and debug-line access for the segment.
        segment: Rc<dyn SegmentInfo>,
    },
}

/// An allocator-supplied descriptor for an address range.
pub struct Label {
    /// First address of the range.
    pub addr: u32,

    /// Range size in bytes.
    pub size: u32,

    /// Human-readable region name.
    pub name: String,

    /// Region-kind extension.
    pub ext: LabelExt,
}

impl Label {
    /// Creates a plain label without an extension.
    pub fn new(addr: u32, size: u32, name: &str) -> Self {
        Self {
            addr,
            size,
            name: name.to_string(),
            ext: LabelExt::None,
        }
    }

    /// Creates a label with a region-kind extension.
    pub fn with_ext(addr: u32, size: u32, name: &str, ext: LabelExt) -> Self {
        Self {
            addr,
            size,
            name: name.to_string(),
            ext,
        }
    }

    /// Returns whether `addr` falls inside this label's range.
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.addr && addr - self.addr < self.size
    }
}

/// Maps an address to the label covering it.
///
/// Supplied by the loader/allocator subsystem.
pub trait LabelResolver {
    /// Returns the label whose range contains `addr`, if any.
    fn lookup(&self, addr: u32) -> Option<&Label>;
}

/// A structure field resolved from a byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Canonical name of the containing structure type.
    pub type_name: String,

    /// Dotted path of the field inside the structure.
    pub field_path: String,

    /// Type signature of the field.
    pub type_sig: String,

    /// Byte offset of the access within the field.
    pub field_delta: u32,
}

/// Resolves a byte offset inside a typed region to a field path.
pub trait StructDecoder {
    /// Returns the field at `offset` within the structure type `type_name`.
    fn field_at_offset(&self, type_name: &str, offset: u32) -> Option<FieldInfo>;
}

/// Renders machine code at an address to mnemonic text.
pub trait Disassembler {
    /// Disassembles one instruction at `addr`, returning its byte length and
    /// mnemonic text.
    fn disassemble(&self, addr: u32) -> (u32, String);
}
