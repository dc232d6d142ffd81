//! Error types for host misconfiguration.
//!
//! Only host-side configuration problems surface as Rust errors. Guest-side
//! misbehavior (closing an unknown library base, requesting a version no
//! backend can satisfy) is reported through return values and logging so
//! emulation can continue.

use thiserror::Error;

/// Fatal configuration errors raised while loading or resolving the
/// per-library dispatch configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or contains invalid values.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A mode string does not name a known dispatch mode.
    #[error("invalid lib mode: '{0}'")]
    InvalidMode(String),
}
