use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::str::FromStr;

use crate::common::ConfigError;

const DEFAULT_VERSION: u32 = 0;

/// Dispatch mode for a library or device.
///
/// Decides which backend an open request may be satisfied by. The string
/// forms (`off`, `auto`, `vamos`, `amiga`, `fake`) are what appear in the
/// configuration file; anything else is a fatal configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LibMode {
    /// Never open this library; every request returns a null base.
    Off,

    /// Try the virtual backend first, fall back to native code.
    Auto,

    /// Only the virtual (host-implemented) backend.
    Vamos,

    /// Only the native (loaded machine code) backend.
    Amiga,

    /// Virtual backend in fake mode: a stub presence without behavior.
    Fake,
}

impl Default for LibMode {
    fn default() -> Self {
        Self::Auto
    }
}

impl fmt::Display for LibMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Off => "off",
            Self::Auto => "auto",
            Self::Vamos => "vamos",
            Self::Amiga => "amiga",
            Self::Fake => "fake",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for LibMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "off" => Ok(Self::Off),
            "auto" => Ok(Self::Auto),
            "vamos" => Ok(Self::Vamos),
            "amiga" => Ok(Self::Amiga),
            "fake" => Ok(Self::Fake),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// Resolved dispatch parameters for a single library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LibConfig {
    /// Dispatch mode for this library.
    #[serde(default)]
    pub mode: LibMode,

    /// Version requested from the backend; `0` accepts any version.
    #[serde(default = "default_version")]
    pub version: u32,
}

impl Default for LibConfig {
    fn default() -> Self {
        Self {
            mode: LibMode::Auto,
            version: DEFAULT_VERSION,
        }
    }
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

/// Persistent per-library dispatch configuration.
///
/// Loaded from a TOML file with a `[default]` section and a `[libs]` table
/// keyed by library name:
///
/// ```toml
/// [default]
/// mode = "auto"
/// version = 0
///
/// [libs."dos.library"]
/// mode = "vamos"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LibsConfig {
    /// Fallback configuration for libraries without an explicit entry.
    #[serde(default)]
    pub default: LibConfig,

    /// Per-library overrides, keyed by full or base name.
    #[serde(default)]
    pub libs: HashMap<String, LibConfig>,
}

impl LibsConfig {
    /// Loads and parses a configuration file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Resolves the configuration for one open request.
    ///
    /// An entry under the full request name wins over one under the base
    /// name; with neither present the `[default]` section applies.
    pub fn get_lib_config(&self, full_name: &str, base_name: &str) -> LibConfig {
        if let Some(cfg) = self.libs.get(full_name) {
            return *cfg;
        }
        if let Some(cfg) = self.libs.get(base_name) {
            return *cfg;
        }
        self.default
    }

    /// Sets or replaces the configuration entry for a library name.
    pub fn set_lib_config(&mut self, name: &str, cfg: LibConfig) {
        self.libs.insert(name.to_string(), cfg);
    }
}
