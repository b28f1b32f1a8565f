// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-compile state.

use crate::builder::EmittedNode;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use std::borrow::Cow;

/// Mutable state of one compile call.
///
/// Operands are borrowed from the formula; only synthetic result names are
/// owned.
#[derive(Debug)]
pub(crate) struct BuildState<'f, H> {
    prefix: &'f str,
    stack: Vec<Cow<'f, str>>,
    pub(crate) nodes: Vec<EmittedNode<H>>,
    temp_count: usize,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'f, H> BuildState<'f, H> {
    pub(crate) fn new(prefix: &'f str) -> Self {
        Self {
            prefix,
            stack: Vec::new(),
            nodes: Vec::new(),
            temp_count: 0,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn push_operand(&mut self, operand: impl Into<Cow<'f, str>>) {
        self.stack.push(operand.into());
    }

    pub(crate) fn pop_operand(&mut self) -> Option<Cow<'f, str>> {
        self.stack.pop()
    }

    pub(crate) fn peek_operand(&self) -> Option<&str> {
        self.stack.last().map(AsRef::as_ref)
    }

    /// Whether the operand names an intermediate result of this build
    pub(crate) fn is_temp_attr(&self, operand: &str) -> bool {
        operand.starts_with(self.prefix)
    }

    /// A consumed intermediate result frees its name for the next node
    pub(crate) fn release_temp_attr(&mut self) {
        self.temp_count = self.temp_count.saturating_sub(1);
    }

    /// Allocate the result name of the node being emitted
    pub(crate) fn next_result_name(&mut self) -> String {
        let name = match self.temp_count {
            0 => self.prefix.to_string(),
            n => format!("{}{}", self.prefix, n),
        };
        self.temp_count += 1;
        name
    }

    pub(crate) fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(kind, message);
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
    }

    #[cfg(test)]
    pub(crate) fn operands(&self) -> Vec<&str> {
        self.stack.iter().map(AsRef::as_ref).collect()
    }
}
