// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors that abort a compile.
//!
//! Problems in the formula itself are diagnostics, see
//! [`crate::diagnostics`]. These errors cover what the formula cannot fix:
//! unusable settings and a sink that refuses a mutation.

use crate::settings::SettingsError;
use crate::sink::SinkError;
use thiserror::Error;

/// Compile errors
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Settings failed validation
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The graph sink rejected a mutation
    #[error("graph sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Result type for compile operations
pub type Result<T> = std::result::Result<T, FormulaError>;
