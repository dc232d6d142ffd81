//! Integration tests for the access and instruction trace decoder.

use std::rc::Rc;

use amiga_emulator::common::{AccessMode, AccessWidth};
use amiga_emulator::label::{
    Disassembler, FdTable, FieldInfo, FuncDef, Label, LabelExt, LabelResolver, SegmentInfo,
    SourceLine, StructDecoder,
};
use amiga_emulator::trace::{Classification, TraceDecoder, TraceEvent};

/// Label resolver stub over a fixed label list.
#[derive(Default)]
struct StubLabels {
    labels: Vec<Label>,
}

impl LabelResolver for StubLabels {
    fn lookup(&self, addr: u32) -> Option<&Label> {
        self.labels.iter().find(|label| label.contains(addr))
    }
}

/// Struct decoder stub resolving every in-range offset of "Task".
struct StubStructs;

impl StructDecoder for StubStructs {
    fn field_at_offset(&self, type_name: &str, offset: u32) -> Option<FieldInfo> {
        if type_name != "Task" {
            return None;
        }
        Some(FieldInfo {
            type_name: "Task".to_string(),
            field_path: "tc_Node.ln_Type".to_string(),
            type_sig: "UBYTE".to_string(),
            field_delta: offset % 2,
        })
    }
}

/// Disassembler stub returning a fixed mnemonic.
struct StubDisasm;

impl Disassembler for StubDisasm {
    fn disassemble(&self, _addr: u32) -> (u32, String) {
        (2, "moveq #0,d0".to_string())
    }
}

/// Function-descriptor table stub with one entry at bias 6.
struct StubFd;

impl FdTable for StubFd {
    fn func_by_bias(&self, bias: u32) -> Option<FuncDef> {
        if bias == 6 {
            Some(FuncDef {
                name: "Open".to_string(),
                bias,
                signature: "Open(name/a0, ver/d0)".to_string(),
            })
        } else {
            None
        }
    }
}

/// Segment info stub with one symbol and one source line.
struct StubSegment;

impl SegmentInfo for StubSegment {
    fn find_symbol(&self, rel_addr: u32) -> Option<String> {
        if rel_addr < 0x100 {
            Some("_main".to_string())
        } else {
            None
        }
    }

    fn find_debug_line(&self, rel_addr: u32) -> Option<SourceLine> {
        if rel_addr < 0x100 {
            Some(SourceLine {
                file: "main.c".to_string(),
                line: 42,
            })
        } else {
            None
        }
    }
}

const LIB_BASE: u32 = 0x2000;

fn lib_labels() -> StubLabels {
    // jump table below the base, node above: one label covers both
    StubLabels {
        labels: vec![Label::with_ext(
            LIB_BASE - 0x100,
            0x200,
            "exec.library",
            LabelExt::Lib {
                lib_base: LIB_BASE,
                fd: Some(Rc::new(StubFd)),
            },
        )],
    }
}

fn decode(
    labels: &StubLabels,
    mode: AccessMode,
    width: AccessWidth,
    addr: u32,
    value: u32,
) -> (Classification, String) {
    let structs = StubStructs;
    let disasm = StubDisasm;
    let decoder = TraceDecoder::new(labels, &structs, &disasm);
    let record = decoder.decode_access(&TraceEvent::new(mode, width, addr, value));
    (record.classification, record.annotation)
}

/// Tests the trap pattern in a vector slot.
#[test]
fn test_jumptab_trap() {
    let labels = lib_labels();
    let (class, addon) = decode(
        &labels,
        AccessMode::Read,
        AccessWidth::Word,
        LIB_BASE - 6,
        0xa000,
    );
    assert_eq!(class, Classification::Trap);
    assert!(addon.starts_with("-6 [1]"));
    assert!(addon.contains("Open(name/a0, ver/d0)"));
}

/// Tests that any value with the trap nibble classifies as a trap.
#[test]
fn test_jumptab_trap_with_id_bits() {
    let labels = lib_labels();
    let (class, _) = decode(
        &labels,
        AccessMode::Read,
        AccessWidth::Word,
        LIB_BASE - 12,
        0xa012,
    );
    assert_eq!(class, Classification::Trap);
}

/// Tests that a byte read is also eligible for opcode interpretation.
#[test]
fn test_jumptab_trap_byte_read() {
    let labels = lib_labels();
    let (class, addon) = decode(
        &labels,
        AccessMode::Read,
        AccessWidth::Byte,
        LIB_BASE - 6,
        0xa000,
    );
    assert_eq!(class, Classification::Trap);
    assert!(addon.starts_with("-6 [1]"));
}

/// Tests the absolute-long jump opcode in a vector slot.
#[test]
fn test_jumptab_jump() {
    let labels = lib_labels();
    let (class, addon) = decode(
        &labels,
        AccessMode::Read,
        AccessWidth::Word,
        LIB_BASE - 6,
        0x4ef9,
    );
    assert_eq!(class, Classification::Jump);
    assert!(addon.starts_with("-6"));
    assert!(addon.contains("Open(name/a0, ver/d0)"));
}

/// Tests the uninitialized reset pattern.
#[test]
fn test_jumptab_reset() {
    let labels = lib_labels();
    let (class, addon) = decode(
        &labels,
        AccessMode::Read,
        AccessWidth::Word,
        LIB_BASE - 6,
        0x04e70,
    );
    assert_eq!(class, Classification::Reset);
    assert!(addon.is_empty());
}

/// Tests that an unrecognized vector value is inconclusive.
#[test]
fn test_jumptab_unknown_value() {
    let labels = lib_labels();
    let (class, addon) = decode(
        &labels,
        AccessMode::Read,
        AccessWidth::Word,
        LIB_BASE - 6,
        0x1234,
    );
    assert_eq!(class, Classification::JumpUnknown);
    assert!(addon.is_empty());
}

/// Tests that a write below the base is never opcode-interpreted.
#[test]
fn test_jumptab_write_is_inconclusive() {
    let labels = lib_labels();
    let (class, _) = decode(
        &labels,
        AccessMode::Write,
        AccessWidth::Word,
        LIB_BASE - 6,
        0xa000,
    );
    assert_eq!(class, Classification::JumpUnknown);
}

/// Tests that a long read below the base is never opcode-interpreted.
#[test]
fn test_jumptab_long_read_is_inconclusive() {
    let labels = lib_labels();
    let (class, _) = decode(
        &labels,
        AccessMode::Read,
        AccessWidth::Long,
        LIB_BASE - 6,
        0x4ef94ef9,
    );
    assert_eq!(class, Classification::JumpUnknown);
}

/// Tests that an access at or above the base gets no decoration.
#[test]
fn test_access_above_lib_base_undecorated() {
    let labels = lib_labels();
    let (class, addon) = decode(
        &labels,
        AccessMode::Read,
        AccessWidth::Word,
        LIB_BASE + 4,
        0xa000,
    );
    assert_eq!(class, Classification::None);
    assert!(addon.is_empty());
}

/// Tests a vector slot annotation without a descriptor table.
#[test]
fn test_jumptab_trap_without_fd_table() {
    let labels = StubLabels {
        labels: vec![Label::with_ext(
            LIB_BASE - 0x100,
            0x200,
            "exec.library",
            LabelExt::Lib {
                lib_base: LIB_BASE,
                fd: None,
            },
        )],
    };
    let (class, addon) = decode(
        &labels,
        AccessMode::Read,
        AccessWidth::Word,
        LIB_BASE - 6,
        0xa000,
    );
    assert_eq!(class, Classification::Trap);
    assert_eq!(addon.trim_end(), "-6 [1]");
}

/// Tests struct field decoding inside the typed region.
#[test]
fn test_struct_decode_in_range() {
    let labels = StubLabels {
        labels: vec![Label::with_ext(
            0x3000,
            0x80,
            "ThisTask",
            LabelExt::Struct {
                begin: 0x3000,
                size: 0x5c,
                type_name: "Task".to_string(),
            },
        )],
    };
    let (class, addon) = decode(&labels, AccessMode::Read, AccessWidth::Byte, 0x3008, 0x04);
    assert_eq!(class, Classification::Struct);
    assert_eq!(addon, "Task+8 = tc_Node.ln_Type(UBYTE)+0");
}

/// Tests that an access outside the struct bounds gets no annotation.
#[test]
fn test_struct_decode_out_of_range() {
    let labels = StubLabels {
        labels: vec![Label::with_ext(
            0x3000,
            0x80,
            "ThisTask",
            LabelExt::Struct {
                begin: 0x3000,
                size: 0x5c,
                type_name: "Task".to_string(),
            },
        )],
    };
    let (class, addon) = decode(&labels, AccessMode::Read, AccessWidth::Byte, 0x3070, 0x04);
    assert_eq!(class, Classification::None);
    assert!(addon.is_empty());
}

/// Tests location formatting for resolved and unresolved addresses.
#[test]
fn test_location_text() {
    let labels = lib_labels();
    let structs = StubStructs;
    let disasm = StubDisasm;
    let decoder = TraceDecoder::new(&labels, &structs, &disasm);

    let record = decoder.decode_access(&TraceEvent::new(
        AccessMode::Read,
        AccessWidth::Word,
        LIB_BASE + 4,
        0,
    ));
    assert_eq!(record.location, "@001f00 +000104 exec.library");

    let record = decoder.decode_access(&TraceEvent::new(
        AccessMode::Read,
        AccessWidth::Word,
        0x9999,
        0,
    ));
    assert_eq!(record.location, "??");
}

/// Tests the formatted line for a word read of a trap vector.
#[test]
fn test_access_line_format() {
    let labels = lib_labels();
    let structs = StubStructs;
    let disasm = StubDisasm;
    let decoder = TraceDecoder::new(&labels, &structs, &disasm);

    let record = decoder.decode_access(&TraceEvent::new(
        AccessMode::Read,
        AccessWidth::Word,
        LIB_BASE - 6,
        0xa000,
    ));
    assert_eq!(
        record.line,
        "R(2): 001ffa: a000        TRAP  [@001f00 +0000fa exec.library] -6 [1]  Open(name/a0, ver/d0)"
    );
}

/// Tests the fixed-width value column for each access width.
#[test]
fn test_value_width_formatting() {
    assert_eq!(AccessWidth::Byte.format_value(0x12), "12      ");
    assert_eq!(AccessWidth::Word.format_value(0x1234), "1234    ");
    assert_eq!(AccessWidth::Long.format_value(0x12345678), "12345678");
}

/// Tests that explicit instrumentation text suppresses decoding.
#[test]
fn test_explicit_text_passthrough() {
    let labels = lib_labels();
    let structs = StubStructs;
    let disasm = StubDisasm;
    let decoder = TraceDecoder::new(&labels, &structs, &disasm);

    let record = decoder.decode_access(&TraceEvent::with_text(
        AccessMode::Read,
        AccessWidth::Word,
        LIB_BASE - 6,
        0xa000,
        "CALL",
        "LVOOpen",
    ));
    assert_eq!(record.classification, Classification::None);
    assert_eq!(record.annotation, "LVOOpen");
    assert!(record.line.contains("CALL"));
    assert!(record.line.contains("LVOOpen"));
}

/// Tests instruction decoding with segment debug info.
#[test]
fn test_decode_instruction_with_segment() {
    let labels = StubLabels {
        labels: vec![Label::with_ext(
            0x10000,
            0x1000,
            "seg0",
            LabelExt::Segment {
                segment: Rc::new(StubSegment),
            },
        )],
    };
    let structs = StubStructs;
    let disasm = StubDisasm;
    let decoder = TraceDecoder::new(&labels, &structs, &disasm);

    let code = decoder.decode_instruction(0x10010);
    assert_eq!(code.location, "@010000 +000010 seg0");
    assert_eq!(code.symbol.as_deref(), Some("_main"));
    assert_eq!(code.source.as_deref(), Some("[main.c:42]"));
    assert_eq!(
        code.format_line(),
        format!("{:<40}  {:06x}    {:<20}", "@010000 +000010 seg0", 0x10010, "moveq #0,d0")
    );
    assert!(code.format_symbol_header().unwrap().ends_with("_main:"));
}

/// Tests instruction decoding without any label.
#[test]
fn test_decode_instruction_unresolved() {
    let labels = StubLabels::default();
    let structs = StubStructs;
    let disasm = StubDisasm;
    let decoder = TraceDecoder::new(&labels, &structs, &disasm);

    let code = decoder.decode_instruction(0x123456);
    assert_eq!(code.location, "N/A");
    assert!(code.symbol.is_none());
    assert!(code.source.is_none());
    assert_eq!(code.text, "moveq #0,d0");
}

/// Tests that the access hook reports the neutral continue indicator.
#[test]
fn test_trace_mem_returns_neutral() {
    let labels = lib_labels();
    let structs = StubStructs;
    let disasm = StubDisasm;
    let decoder = TraceDecoder::new(&labels, &structs, &disasm);

    let ret = decoder.trace_mem(&TraceEvent::new(
        AccessMode::Write,
        AccessWidth::Long,
        LIB_BASE + 8,
        0xdeadbeef,
    ));
    assert_eq!(ret, 0);
}
