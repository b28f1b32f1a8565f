// SPDX-License-Identifier: MIT OR Apache-2.0
//! Math formula compiler.
//!
//! Turns a formula written in Reverse Polish Notation into a chain of
//! attribute math nodes:
//!
//! ```text
//! 4 5 + position *  -> result
//! ```
//!
//! becomes an `ADD` node writing `mf_temp`, followed by a `MULTIPLY` node
//! reading `mf_temp` and `position` and writing `result`.
//!
//! ## Architecture
//!
//! - [`catalog`]: operator aliases, arities and domains
//! - [`tokenizer`]: formula text to tokens
//! - [`value`]: operand resolution, including `(x y z)` vector literals
//! - [`compiler`]: the stack evaluator driving a build
//! - [`builder`]: node creation, layout and argument binding
//! - [`sink`]: the graph mutation interface nodes are written through
//!
//! Formula problems are reported as [`Diagnostic`]s and never abort a build
//! unless they make it meaningless.

pub mod builder;
pub mod catalog;
pub mod compiler;
pub mod diagnostics;
pub mod error;
pub mod settings;
pub mod sink;
pub mod tokenizer;
pub mod value;

mod state;

pub use builder::{EmittedNode, InputBinding};
pub use catalog::{
    Domain, DomainHint, MathOperation, Operation, OperatorCatalog, OperatorSpec, VectorOperation,
};
pub use compiler::{compile, CompileOutput, CompileStatus, FormulaCompiler};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use error::{FormulaError, Result};
pub use settings::{FormulaSettings, SettingsError};
pub use sink::{
    ArgSlot, GraphSink, InputKind, InputSocket, NodeKind, NodeLayout, OutputSocket, RecordingSink,
    SinkError, SocketValue,
};
pub use tokenizer::tokenize;
pub use value::ResolvedValue;
