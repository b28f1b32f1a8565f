// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compile settings.
//!
//! Settings are stored as RON, e.g.
//!
//! ```ron
//! (
//!     formula: "4 5 + 2 *",
//!     temp_attr_name: "mf_temp",
//!     add_frame: true,
//! )
//! ```
//!
//! Missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default formula shown to a new user
pub const DEFAULT_FORMULA: &str = "4 5 *";

/// Default prefix of intermediate result attributes
pub const DEFAULT_TEMP_ATTR_NAME: &str = "mf_temp";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading the settings file failed
    #[error("failed to read settings from {path:?}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The RON text is malformed
    #[error("failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Writing RON failed
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    /// The intermediate attribute prefix is unusable
    #[error("invalid temporary attribute name {0:?}: must be non-empty and contain no spaces")]
    InvalidTempAttrName(String),
}

/// Everything a compile needs besides the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaSettings {
    /// Formula in Reverse Polish Notation
    pub formula: String,
    /// Prefix of the attributes holding intermediate results
    pub temp_attr_name: String,
    /// Put all emitted nodes in a frame labelled with the formula
    pub add_frame: bool,
}

impl FormulaSettings {
    /// Settings for a formula, other fields at their defaults
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            ..Self::default()
        }
    }

    /// Use a different intermediate attribute prefix
    pub fn with_temp_attr_name(mut self, name: impl Into<String>) -> Self {
        self.temp_attr_name = name.into();
        self
    }

    /// Enable or disable the frame
    pub fn with_frame(mut self, add_frame: bool) -> Self {
        self.add_frame = add_frame;
        self
    }

    /// Parse settings from RON text
    pub fn from_ron(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = ron::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Check the settings can drive a compile.
    ///
    /// Tokens are split on spaces, so a prefix containing one could never be
    /// referenced from a formula.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.temp_attr_name.is_empty() || self.temp_attr_name.contains(char::is_whitespace) {
            return Err(SettingsError::InvalidTempAttrName(self.temp_attr_name.clone()));
        }
        Ok(())
    }
}

impl Default for FormulaSettings {
    fn default() -> Self {
        Self {
            formula: DEFAULT_FORMULA.to_string(),
            temp_attr_name: DEFAULT_TEMP_ATTR_NAME.to_string(),
            add_frame: true,
        }
    }
}
