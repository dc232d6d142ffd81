//! Common types used throughout the library dispatch and trace core.
//!
//! This module provides the fundamental data model for memory accesses
//! and the error types shared across components.

/// Memory access mode and width definitions.
pub mod data;

/// Error types for host-side misconfiguration.
pub mod error;

pub use data::{AccessMode, AccessWidth};
pub use error::ConfigError;
