// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compile diagnostics.
//!
//! Parse problems never abort a compile on their own. They are collected
//! here and the build continues with placeholder values, except for
//! [`DiagnosticKind::UnassignableResult`] which cancels it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The build continued with a substitute value
    Warning,
    /// The build was cancelled
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A vector component or literal is not a float; `0` was used instead
    MalformedOperand,
    /// An operator ran out of operands; `no_arg` was used instead
    ArgumentUnderflow,
    /// `->` was reached before any node was emitted
    UnassignableResult,
}

impl DiagnosticKind {
    /// Severity attached to this kind
    pub fn severity(self) -> Severity {
        match self {
            Self::MalformedOperand | Self::ArgumentUnderflow => Severity::Warning,
            Self::UnassignableResult => Severity::Error,
        }
    }

    /// Whether this kind cancels the build
    pub fn is_fatal(self) -> bool {
        self.severity() == Severity::Error
    }
}

/// A `(severity, message)` pair reported during a compile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Category
    pub kind: DiagnosticKind,
    /// User-facing message
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic with the kind's default severity
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            message: message.into(),
        }
    }

    /// Forward this diagnostic to the active tracing subscriber
    pub fn emit(&self) {
        match self.severity {
            Severity::Warning => tracing::warn!(kind = ?self.kind, "{}", self.message),
            Severity::Error => tracing::error!(kind = ?self.kind, "{}", self.message),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_kind() {
        let warning = Diagnostic::new(DiagnosticKind::ArgumentUnderflow, "missing");
        assert_eq!(warning.severity, Severity::Warning);
        assert!(!warning.kind.is_fatal());

        let error = Diagnostic::new(DiagnosticKind::UnassignableResult, "nothing");
        assert_eq!(error.severity, Severity::Error);
        assert!(error.kind.is_fatal());
        assert_eq!(error.to_string(), "error: nothing");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
    }
}
