// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stack evaluation of RPN formulas.
//!
//! Tokens are consumed left to right in a single pass. Operands are pushed
//! unresolved; an operator pops and resolves as many operands as it takes,
//! emits its node and pushes the node's result name. `->` ends the formula
//! and renames the last node's result to the final token.

use crate::builder::{self, EmittedNode};
use crate::catalog::{DomainHint, OperatorCatalog};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Severity};
use crate::error::Result;
use crate::settings::FormulaSettings;
use crate::sink::{GraphSink, InputSocket, SocketValue};
use crate::state::BuildState;
use crate::tokenizer::{tokenize, RESULT_ARROW};
use crate::value;
use serde::{Deserialize, Serialize};

/// How a compile ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompileStatus {
    /// The whole formula was processed
    Finished,
    /// A fatal diagnostic stopped the compile
    Cancelled,
}

/// Everything a compile produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileOutput<N, F> {
    /// How the compile ended
    pub status: CompileStatus,
    /// Emitted nodes in formula order
    pub nodes: Vec<EmittedNode<N>>,
    /// Diagnostics in the order they were raised
    pub diagnostics: Vec<Diagnostic>,
    /// Frame holding all nodes, if one was created
    pub frame: Option<F>,
}

impl<N, F> CompileOutput<N, F> {
    /// Whether the compile was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.status == CompileStatus::Cancelled
    }

    /// Name of the attribute holding the final result
    pub fn result_name(&self) -> Option<&str> {
        self.nodes.last().map(|node| node.result_name.as_str())
    }

    /// Diagnostics of a given severity
    pub fn diagnostics_with(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.severity == severity)
    }

    /// Whether any diagnostic was raised
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Compiles formulas into a graph sink
#[derive(Debug, Clone)]
pub struct FormulaCompiler<'c> {
    catalog: &'c OperatorCatalog,
    settings: FormulaSettings,
}

impl FormulaCompiler<'static> {
    /// Compiler over the built-in operators
    pub fn new(settings: FormulaSettings) -> Result<Self> {
        Self::with_catalog(OperatorCatalog::builtin(), settings)
    }
}

impl<'c> FormulaCompiler<'c> {
    /// Compiler over a custom operator catalog
    pub fn with_catalog(catalog: &'c OperatorCatalog, settings: FormulaSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { catalog, settings })
    }

    /// Settings in use
    pub fn settings(&self) -> &FormulaSettings {
        &self.settings
    }

    /// Compile the configured formula into `sink`.
    ///
    /// Formula problems end up in [`CompileOutput::diagnostics`]; an `Err` is
    /// only returned when the sink fails. Nodes emitted before a
    /// cancellation stay in the sink.
    pub fn compile<S: GraphSink>(&self, sink: &mut S) -> Result<CompileOutput<S::Node, S::Frame>> {
        sink.ensure_ready()?;

        let formula = self.settings.formula.as_str();
        let tokens = tokenize(formula);
        let mut state = BuildState::new(&self.settings.temp_attr_name);

        for &token in &tokens {
            if token == RESULT_ARROW {
                if assign_result(sink, &mut state, &tokens)? == CompileStatus::Cancelled {
                    return Ok(finish(state, CompileStatus::Cancelled, None));
                }
                break;
            }

            match self.catalog.lookup(token, DomainHint::Either) {
                Some(spec) => {
                    let args = value::collect_args(&mut state, spec.op, spec.arity);
                    builder::emit(sink, &mut state, spec.op, args)?;
                }
                None => state.push_operand(token),
            }
        }

        let frame = if self.settings.add_frame && !state.nodes.is_empty() {
            let frame = sink.create_frame(formula)?;
            for node in &state.nodes {
                sink.assign_to_frame(node.handle, frame)?;
            }
            Some(frame)
        } else {
            None
        };
        sink.refresh();

        let output = finish(state, CompileStatus::Finished, frame);
        tracing::info!(
            formula,
            nodes = output.nodes.len(),
            diagnostics = output.diagnostics.len(),
            result = output.result_name().unwrap_or_default(),
            "compiled formula"
        );
        Ok(output)
    }
}

/// Compile `settings.formula` into `sink` with the built-in operators
pub fn compile<S: GraphSink>(
    settings: &FormulaSettings,
    sink: &mut S,
) -> Result<CompileOutput<S::Node, S::Frame>> {
    FormulaCompiler::new(settings.clone())?.compile(sink)
}

/// Rename the last node's result to the final token of the formula
fn assign_result<S: GraphSink>(
    sink: &mut S,
    state: &mut BuildState<'_, S::Node>,
    tokens: &[&str],
) -> Result<CompileStatus> {
    if state.nodes.is_empty() {
        let kind = DiagnosticKind::UnassignableResult;
        state.report(kind, "No operations added but result set");
        return Ok(if kind.is_fatal() {
            CompileStatus::Cancelled
        } else {
            CompileStatus::Finished
        });
    }

    let name = tokens.last().copied().unwrap_or_default();
    if let Some(node) = state.nodes.last_mut() {
        let value = SocketValue::Text(name.to_string());
        sink.set_input_value(node.handle, InputSocket::Result, value)?;
        node.result_name = name.to_string();
    }
    Ok(CompileStatus::Finished)
}

fn finish<N, F>(
    state: BuildState<'_, N>,
    status: CompileStatus,
    frame: Option<F>,
) -> CompileOutput<N, F> {
    CompileOutput {
        status,
        nodes: state.nodes,
        diagnostics: state.diagnostics,
        frame,
    }
}
