//! Amiga 68k Personality Layer — Library Dispatch and Trace Core.
//!
//! This crate implements the host-side core that lets legacy 68k binaries run
//! against a modern machine without real hardware. Two coupled mechanisms form
//! the heart of it: hybrid library dispatch (deciding per open request whether
//! a library is served by a host-reimplemented "vamos" backend, by loaded and
//! relocated native machine code, or by a configured fake) and jump-table
//! trace decoding (resolving raw memory accesses to symbolic meaning,
//! including the three vector encodings that let an instruction fetch cross
//! from emulated code into host-implemented library functions).
//!
//! # Architecture
//!
//! * **Dispatch**: one mode table (`off`/`auto`/`vamos`/`amiga`/`fake`) routes
//!   every open request; each backend is authoritative for its own addresses.
//! * **Tracing**: every memory access and instruction fetch can be resolved
//!   against allocator-supplied labels and rendered as a diagnostic line.
//!
//! # Modules
//!
//! * `common`: Shared types, constants, and error handling.
//! * `config`: Per-library configuration loading and parsing.
//! * `label`: Memory labels and the symbolic-lookup collaborator interfaces.
//! * `libmgr`: Hybrid library dispatcher and backend contracts.
//! * `trace`: Access and instruction trace decoding.

/// Shared types and error handling.
///
/// Provides the access mode/width data model used by the trace decoder and
/// the configuration error taxonomy.
pub mod common;

/// Configuration system for per-library dispatch modes and versions.
///
/// Loads and parses TOML configuration files that pin a library to one
/// dispatch mode and a minimum version, with an `auto` fallback default.
pub mod config;

/// Memory labels and symbolic lookup interfaces.
///
/// Defines the label data model (library, struct, and segment regions) plus
/// the traits implemented by the loader/allocator subsystem: label
/// resolution, struct field decoding, disassembly, and segment debug info.
pub mod label;

/// Hybrid library dispatcher.
///
/// Routes open/close/expunge requests between the virtual (host-implemented)
/// and native (relocated machine code) library backends and aggregates
/// lifecycle operations across both.
pub mod libmgr;

/// Access and instruction trace decoding.
///
/// Turns raw memory access events and instruction-pointer samples into
/// symbolic diagnostic records, including the jump-table vector classifier.
pub mod trace;
