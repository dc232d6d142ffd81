//! Access and instruction trace decoding.
//!
//! The trace decoder turns raw memory access events and instruction-pointer
//! samples into symbolic diagnostic records. It is read-only with respect to
//! emulator state: decoding never alters the traced value, and the hook
//! variants return the neutral indicator the CPU callback contract expects,
//! so execution continues unmodified.

pub mod jumptab;

use std::fmt;

use tracing::info;

use crate::common::{AccessMode, AccessWidth};
use crate::label::{Disassembler, LabelExt, LabelResolver, StructDecoder};

/// One raw memory access as reported by the CPU core.
///
/// Ephemeral and immutable; produced once per access and consumed
/// synchronously. `text`/`addon` are normally empty — internal
/// instrumentation calls may pre-fill them, which suppresses decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Read or write.
    pub mode: AccessMode,

    /// Access width.
    pub width: AccessWidth,

    /// Accessed address.
    pub addr: u32,

    /// Raw value read or written.
    pub value: u32,

    /// Caller-supplied classification text, used verbatim when non-empty.
    pub text: String,

    /// Caller-supplied annotation, used verbatim when `text` or `addon` is
    /// non-empty.
    pub addon: String,
}

impl TraceEvent {
    /// Creates an access event for decoding.
    pub fn new(mode: AccessMode, width: AccessWidth, addr: u32, value: u32) -> Self {
        Self {
            mode,
            width,
            addr,
            value,
            text: String::new(),
            addon: String::new(),
        }
    }

    /// Creates an instrumentation event carrying explicit text and
    /// annotation.
    pub fn with_text(
        mode: AccessMode,
        width: AccessWidth,
        addr: u32,
        value: u32,
        text: &str,
        addon: &str,
    ) -> Self {
        Self {
            mode,
            width,
            addr,
            value,
            text: text.to_string(),
            addon: addon.to_string(),
        }
    }
}

/// Outcome of decoding one access.
///
/// `JumpUnknown` is an explicit "decoding gave up" result, distinct from
/// `None` ("nothing to report").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No decoration applies.
    None,

    /// Jump-table slot holding a trap pattern intercepted by the host.
    Trap,

    /// Jump-table slot forwarding to relocated native code.
    Jump,

    /// Access inside the jump table that could not be interpreted.
    JumpUnknown,

    /// Jump-table slot holding the uninitialized reset pattern.
    Reset,

    /// Access inside a typed structure instance.
    Struct,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "",
            Self::Trap => "TRAP",
            Self::Jump => "JUMP",
            Self::JumpUnknown => "JUMP?",
            Self::Reset => "RESET",
            Self::Struct => "Struct",
        };
        write!(f, "{}", s)
    }
}

/// Symbolic record derived from one access event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    /// Resolved location text (`@addr +delta name`, or `??`).
    pub location: String,

    /// Access classification.
    pub classification: Classification,

    /// Classification-specific annotation text.
    pub annotation: String,

    /// Fully formatted diagnostic line.
    pub line: String,
}

/// One decoded instruction-pointer sample.
///
/// The decoder is stateless: symbol and source are reported on every call
/// and a caller wanting a header only when a new symbol is entered compares
/// consecutive outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    /// Sampled program counter.
    pub pc: u32,

    /// Resolved location text (`@addr +delta name`, or `N/A`).
    pub location: String,

    /// Enclosing symbol, if the label carries segment debug info.
    pub symbol: Option<String>,

    /// Source location text `[file:line]`, if available.
    pub source: Option<String>,

    /// Disassembled mnemonic text.
    pub text: String,
}

impl CodeLine {
    /// Renders the main diagnostic line.
    pub fn format_line(&self) -> String {
        format!("{:<40}  {:06x}    {:<20}", self.location, self.pc, self.text)
    }

    /// Renders the indented symbol header, if a symbol is known.
    pub fn format_symbol_header(&self) -> Option<String> {
        self.symbol.as_ref().map(|sym| format!("{:40}{}:", "", sym))
    }

    /// Renders the indented source location, if available.
    pub fn format_source(&self) -> Option<String> {
        self.source.as_ref().map(|src| format!("{:50}{}", "", src))
    }
}

/// Decodes access events and instruction samples against the label space.
pub struct TraceDecoder<'a> {
    labels: &'a dyn LabelResolver,
    structs: &'a dyn StructDecoder,
    disasm: &'a dyn Disassembler,
}

impl<'a> TraceDecoder<'a> {
    /// Creates a decoder over the given collaborators.
    pub fn new(
        labels: &'a dyn LabelResolver,
        structs: &'a dyn StructDecoder,
        disasm: &'a dyn Disassembler,
    ) -> Self {
        Self {
            labels,
            structs,
            disasm,
        }
    }

    /// Decodes one memory access into a symbolic record.
    ///
    /// Explicit caller-supplied text/addon wins over decoding; otherwise a
    /// library label runs the jump-table classifier and a struct label runs
    /// the field lookup.
    pub fn decode_access(&self, event: &TraceEvent) -> DecodedRecord {
        let label = self.labels.lookup(event.addr);
        let location = match label {
            Some(l) => format!("@{:06x} +{:06x} {}", l.addr, event.addr - l.addr, l.name),
            None => "??".to_string(),
        };

        let (classification, text, annotation) =
            if !event.text.is_empty() || !event.addon.is_empty() {
                (
                    Classification::None,
                    event.text.clone(),
                    event.addon.clone(),
                )
            } else {
                let (class, addon) = match label.map(|l| &l.ext) {
                    Some(LabelExt::Lib { lib_base, fd }) => jumptab::decode_vector(
                        event.mode,
                        event.width,
                        event.addr,
                        event.value,
                        *lib_base,
                        fd.as_deref(),
                    ),
                    Some(LabelExt::Struct {
                        begin,
                        size,
                        type_name,
                    }) => self.decode_struct(event.addr, *begin, *size, type_name),
                    _ => (Classification::None, String::new()),
                };
                (class, class.to_string(), addon)
            };

        let value = event.width.format_value(event.value);
        let line = format!(
            "{}({}): {:06x}: {}  {:>6}  [{}] {}",
            event.mode,
            event.width.bytes(),
            event.addr,
            value,
            text,
            location,
            annotation
        );
        DecodedRecord {
            location,
            classification,
            annotation,
            line,
        }
    }

    /// Decodes one instruction-pointer sample.
    ///
    /// Resolves the label at `pc`, pulls symbol and source info from a
    /// segment extension when present, and renders the instruction via the
    /// external disassembler.
    pub fn decode_instruction(&self, pc: u32) -> CodeLine {
        let (location, symbol, source) = match self.labels.lookup(pc) {
            Some(l) => {
                let location = format!("@{:06x} +{:06x} {}", l.addr, pc - l.addr, l.name);
                let (symbol, source) = if let LabelExt::Segment { segment } = &l.ext {
                    let rel_addr = pc - l.addr;
                    let symbol = segment.find_symbol(rel_addr);
                    let source = segment
                        .find_debug_line(rel_addr)
                        .map(|src| format!("[{}:{}]", src.file, src.line));
                    (symbol, source)
                } else {
                    (None, None)
                };
                (location, symbol, source)
            }
            None => ("N/A".to_string(), None, None),
        };
        let (_len, text) = self.disasm.disassemble(pc);
        CodeLine {
            pc,
            location,
            symbol,
            source,
            text,
        }
    }

    /// Memory-access trace hook.
    ///
    /// Logs the decoded record and returns the neutral indicator expected by
    /// the CPU access callback; the traced value passes through unmodified.
    pub fn trace_mem(&self, event: &TraceEvent) -> u32 {
        let record = self.decode_access(event);
        info!(target: "mem", "{}", record.line);
        0
    }

    /// Instruction trace hook.
    ///
    /// Logs symbol header, source location, and the diagnostic line, and
    /// returns the decoded sample.
    pub fn trace_code_line(&self, pc: u32) -> CodeLine {
        let code = self.decode_instruction(pc);
        if let Some(header) = code.format_symbol_header() {
            info!(target: "instr", "{}", header);
        }
        if let Some(source) = code.format_source() {
            info!(target: "instr", "{}", source);
        }
        info!(target: "instr", "{}", code.format_line());
        code
    }

    fn decode_struct(
        &self,
        addr: u32,
        begin: u32,
        size: u32,
        type_name: &str,
    ) -> (Classification, String) {
        let delta = match addr.checked_sub(begin) {
            Some(delta) if delta < size => delta,
            _ => return (Classification::None, String::new()),
        };
        match self.structs.field_at_offset(type_name, delta) {
            Some(field) => {
                let addon = format!(
                    "{}+{} = {}({})+{}",
                    field.type_name, delta, field.field_path, field.type_sig, field.field_delta
                );
                (Classification::Struct, addon)
            }
            None => (Classification::None, String::new()),
        }
    }
}
