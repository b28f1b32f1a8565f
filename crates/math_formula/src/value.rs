// SPDX-License-Identifier: MIT OR Apache-2.0
//! Operand resolution.
//!
//! Operands sit on the stack as raw tokens until an operator pops them.
//! Popping turns them into a [`ResolvedValue`]: a float literal, a vector
//! literal, or the name of an attribute.
//!
//! A vector literal is written `(x y z)`. The parentheses may stand alone or
//! be fused with the neighbouring component, so `( 1 2 3 )`, `(1 2 3)` and
//! `(1 2 3 )` are all the same vector. Because the stack is unwound from the
//! top, the closing token is seen first and the components are read `z`,
//! `y`, `x`.

use crate::catalog::Operation;
use crate::diagnostics::DiagnosticKind;
use crate::state::BuildState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder reference used when an operator runs out of operands
pub const MISSING_ARGUMENT: &str = "no_arg";

/// A fully resolved operand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolvedValue {
    /// Float literal
    Scalar(f32),
    /// Vector literal
    Vector([f32; 3]),
    /// Attribute name, external or produced by an earlier node
    Reference(String),
}

impl ResolvedValue {
    /// The value as a vector, broadcasting scalars
    pub fn broadcast(&self) -> Option<[f32; 3]> {
        match self {
            Self::Scalar(value) => Some([*value; 3]),
            Self::Vector(vector) => Some(*vector),
            Self::Reference(_) => None,
        }
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => write!(f, "{value}"),
            Self::Vector([x, y, z]) => write!(f, "({x}, {y}, {z})"),
            Self::Reference(name) => f.write_str(name),
        }
    }
}

/// Textual form of a vector when it has to go into an attribute name socket
pub fn vector_text(vector: &[f32; 3]) -> String {
    format!("[{:?}, {:?}, {:?}]", vector[0], vector[1], vector[2])
}

/// Parse a float literal
pub fn parse_float(token: &str) -> Option<f32> {
    token.parse().ok()
}

/// Pop `arity` operands for `op` and return them in parameter order.
///
/// Missing operands are reported and replaced by [`MISSING_ARGUMENT`].
pub(crate) fn collect_args<H>(
    state: &mut BuildState<'_, H>,
    op: Operation,
    arity: usize,
) -> Vec<ResolvedValue> {
    let mut args = Vec::with_capacity(arity);
    for _ in 0..arity {
        match state.pop_operand() {
            Some(token) => {
                let value = resolve_operand(state, &token);
                args.push(value);
            }
            None => {
                state.report(
                    DiagnosticKind::ArgumentUnderflow,
                    format!(
                        "Invalid number of arguments for {}. Expected {} arguments, got args: {}.",
                        op.id().to_lowercase(),
                        arity,
                        format_partial(&args),
                    ),
                );
                args.push(ResolvedValue::Reference(MISSING_ARGUMENT.to_string()));
            }
        }
    }
    // Stack order is the reverse of parameter order
    args.reverse();
    args
}

/// Operands collected so far, written as a list literal: `[4.0, 'pos']`
fn format_partial(args: &[ResolvedValue]) -> String {
    let items: Vec<String> = args
        .iter()
        .map(|arg| match arg {
            ResolvedValue::Scalar(value) => format!("{value:?}"),
            ResolvedValue::Vector(vector) => vector_text(vector),
            ResolvedValue::Reference(name) => format!("'{name}'"),
        })
        .collect();
    format!("[{}]", items.join(", "))
}

/// Resolve a token that was just popped off the stack
pub(crate) fn resolve_operand<H>(state: &mut BuildState<'_, H>, token: &str) -> ResolvedValue {
    if token.ends_with(')') {
        return ResolvedValue::Vector(resolve_vector(state, token));
    }
    if let Some(value) = parse_float(token) {
        return ResolvedValue::Scalar(value);
    }
    if state.is_temp_attr(token) {
        state.release_temp_attr();
    }
    ResolvedValue::Reference(token.to_string())
}

/// Unwind a vector literal whose closing token has already been popped
fn resolve_vector<H>(state: &mut BuildState<'_, H>, closing: &str) -> [f32; 3] {
    let mut vector = [0.0; 3];

    let fused_z = &closing[..closing.len() - 1];
    let popped_z = if fused_z.is_empty() { state.pop_operand() } else { None };
    let z = if fused_z.is_empty() { popped_z.as_deref() } else { Some(fused_z) };
    vector[2] = component(state, z);

    let y = state.pop_operand();
    vector[1] = component(state, y.as_deref());

    let x = state.pop_operand();
    let x_text = match x.as_deref() {
        Some(token) => match token.strip_prefix('(') {
            Some(fused) => Some(fused),
            None => {
                consume_open_paren(state);
                Some(token)
            }
        },
        None => None,
    };
    vector[0] = component(state, x_text);

    vector
}

fn consume_open_paren<H>(state: &mut BuildState<'_, H>) {
    if state.peek_operand() == Some("(") {
        state.pop_operand();
    } else {
        state.report(
            DiagnosticKind::MalformedOperand,
            "Vector literal is missing its opening parenthesis",
        );
    }
}

fn component<H>(state: &mut BuildState<'_, H>, token: Option<&str>) -> f32 {
    match token.and_then(parse_float) {
        Some(value) => value,
        None => {
            state.report(
                DiagnosticKind::MalformedOperand,
                format!(
                    "Vectors are made up of floats separated by spaces. Got: {}",
                    token.unwrap_or_default()
                ),
            );
            0.0
        }
    }
}
