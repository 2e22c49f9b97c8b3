#![forbid(unsafe_code)]

//! Controller configuration.
//!
//! Defaults match browser conventions: the Escape key value is `"Escape"`
//! and pushing an already-open modal leaves the stack untouched.
//!
//! With the `policy-config` feature the same settings can be loaded from a
//! TOML or JSON file:
//!
//! ```toml
//! escape_key = "Escape"
//! duplicate_push = "move-to-top"
//! ```

#[cfg(feature = "policy-config")]
use std::path::Path;

use crate::ESCAPE_KEY;

/// What `push` does with a modal whose uid is already stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "policy-config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "policy-config", serde(rename_all = "kebab-case"))]
pub enum DuplicatePush {
    /// Leave the stack unchanged.
    #[default]
    Ignore,
    /// Move the existing entry to the top.
    MoveToTop,
}

/// Settings for a [`ModalStack`](crate::ModalStack).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct StackConfig {
    /// Key value that triggers escape dispatch.
    pub escape_key: String,
    /// Handling of a push for an already-stacked uid.
    pub duplicate_push: DuplicatePush,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            escape_key: ESCAPE_KEY.to_owned(),
            duplicate_push: DuplicatePush::default(),
        }
    }
}

impl StackConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key value that triggers escape dispatch.
    #[must_use]
    pub fn escape_key(mut self, key: impl Into<String>) -> Self {
        self.escape_key = key.into();
        self
    }

    /// Set the duplicate push policy.
    #[must_use]
    pub fn duplicate_push(mut self, policy: DuplicatePush) -> Self {
        self.duplicate_push = policy;
        self
    }
}

/// Errors from loading a configuration file.
#[cfg(feature = "policy-config")]
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The contents did not parse.
    Parse(String),
    /// The file extension is neither `toml` nor `json`.
    UnsupportedFormat(String),
}

#[cfg(feature = "policy-config")]
impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(msg) => write!(f, "invalid config: {msg}"),
            Self::UnsupportedFormat(ext) => write!(f, "unsupported config format: '{ext}'"),
        }
    }
}

#[cfg(feature = "policy-config")]
impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(feature = "policy-config")]
impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(feature = "policy-config")]
impl StackConfig {
    /// Parse a TOML document. Missing fields keep their defaults.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        toml::from_str(src).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(src).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Load from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let src = std::fs::read_to_string(path)?;
        let config = match ext.as_str() {
            "toml" => Self::from_toml_str(&src)?,
            "json" => Self::from_json_str(&src)?,
            _ => return Err(ConfigError::UnsupportedFormat(ext)),
        };
        tracing::debug!(path = %path.display(), ?config, "loaded modal stack config");
        Ok(config)
    }
}
