// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node emission: creation, layout, argument binding and result naming.

use crate::catalog::{Domain, Operation, VectorOperation};
use crate::sink::{
    ArgSlot, GraphSink, InputKind, InputSocket, NodeKind, OutputSocket, SinkError, SocketValue,
};
use crate::state::BuildState;
use crate::value::{vector_text, ResolvedValue};
use serde::{Deserialize, Serialize};

/// Horizontal space left between two consecutive nodes
pub const NODE_GAP: f32 = 50.0;

/// Position of the first node
pub const ORIGIN: [f32; 2] = [0.0, 0.0];

/// How one operand was wired into its node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputBinding {
    /// Operand position
    pub slot: ArgSlot,
    /// Input type selected on the node
    pub kind: InputKind,
    /// Socket the value was written to
    pub socket: InputSocket,
    /// Value written
    pub value: SocketValue,
}

impl InputBinding {
    fn attribute(slot: ArgSlot, name: String) -> Self {
        Self {
            slot,
            kind: InputKind::Attribute,
            socket: InputSocket::Attribute(slot),
            value: SocketValue::Text(name),
        }
    }

    fn float(slot: ArgSlot, value: f32) -> Self {
        Self {
            slot,
            kind: InputKind::Float,
            socket: InputSocket::Float(slot),
            value: SocketValue::Float(value),
        }
    }

    fn vector(slot: ArgSlot, vector: [f32; 3]) -> Self {
        Self {
            slot,
            kind: InputKind::Vector,
            socket: InputSocket::Vector(slot),
            value: SocketValue::Vector(vector),
        }
    }
}

/// A node produced by one operator occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmittedNode<H> {
    /// Sink handle of the node
    pub handle: H,
    /// Operation the node performs
    pub operation: Operation,
    /// Resolved operands in parameter order
    pub args: Vec<ResolvedValue>,
    /// Socket assignment of each operand
    pub bindings: Vec<InputBinding>,
    /// Attribute the result is stored in
    pub result_name: String,
    /// Position in formula order, starting at zero
    pub sequence_index: usize,
    /// Where the node was placed
    pub position: [f32; 2],
}

impl<H> EmittedNode<H> {
    /// Domain of the node's operation
    pub fn domain(&self) -> Domain {
        self.operation.domain()
    }

    /// Kind of node created in the sink
    pub fn kind(&self) -> NodeKind {
        NodeKind::for_domain(self.domain())
    }
}

/// Bind operands of a float math node.
///
/// Literals go to the float socket, everything else is an attribute name.
pub fn bind_math(args: &[ResolvedValue]) -> Vec<InputBinding> {
    args.iter()
        .zip(ArgSlot::ALL)
        .map(|(arg, slot)| match arg {
            ResolvedValue::Scalar(value) => InputBinding::float(slot, *value),
            ResolvedValue::Vector(vector) => InputBinding::attribute(slot, vector_text(vector)),
            ResolvedValue::Reference(name) => InputBinding::attribute(slot, name.clone()),
        })
        .collect()
}

/// Bind operands of a vector math node.
///
/// Scalars are broadcast to vectors, except the factor of `SCALE` which
/// stays a float.
pub fn bind_vector(op: VectorOperation, args: &[ResolvedValue]) -> Vec<InputBinding> {
    args.iter()
        .zip(ArgSlot::ALL)
        .map(|(arg, slot)| match (op, slot, arg) {
            (VectorOperation::Scale, ArgSlot::B, ResolvedValue::Scalar(factor)) => {
                InputBinding::float(slot, *factor)
            }
            (VectorOperation::Scale, ArgSlot::B, ResolvedValue::Vector(vector)) => {
                InputBinding::attribute(slot, vector_text(vector))
            }
            (_, _, value) => match value.broadcast() {
                Some(vector) => InputBinding::vector(slot, vector),
                None => InputBinding::attribute(slot, value.to_string()),
            },
        })
        .collect()
}

/// Bind operands according to the operation's domain
pub fn bind(operation: Operation, args: &[ResolvedValue]) -> Vec<InputBinding> {
    match operation {
        Operation::Math(_) => bind_math(args),
        Operation::Vector(op) => bind_vector(op, args),
    }
}

/// Create, place, wire and name the node for one operator occurrence.
///
/// The new node's result name is left on the operand stack.
pub(crate) fn emit<S: GraphSink>(
    sink: &mut S,
    state: &mut BuildState<'_, S::Node>,
    operation: Operation,
    args: Vec<ResolvedValue>,
) -> Result<(), SinkError> {
    let kind = NodeKind::for_domain(operation.domain());
    let handle = sink.create_node(kind)?;
    let position = place(sink, state, handle)?;
    sink.set_operation(handle, operation)?;

    let bindings = bind(operation, &args);
    for binding in &bindings {
        sink.set_input_kind(handle, binding.slot, binding.kind)?;
        sink.set_input_value(handle, binding.socket, binding.value.clone())?;
    }

    let result_name = state.next_result_name();
    sink.set_input_value(handle, InputSocket::Result, SocketValue::Text(result_name.clone()))?;

    let sequence_index = state.nodes.len();
    tracing::debug!(
        index = sequence_index,
        %operation,
        result = %result_name,
        "emitted node"
    );

    state.push_operand(result_name.clone());
    state.nodes.push(EmittedNode {
        handle,
        operation,
        args,
        bindings,
        result_name,
        sequence_index,
        position,
    });
    Ok(())
}

/// Place a node right of the previous one and continue the geometry chain
fn place<S: GraphSink>(
    sink: &mut S,
    state: &BuildState<'_, S::Node>,
    node: S::Node,
) -> Result<[f32; 2], SinkError> {
    let position = match state.nodes.last() {
        None => ORIGIN,
        Some(previous) => {
            let layout = sink.node_layout(previous.handle)?;
            sink.connect(previous.handle, OutputSocket::Geometry, node, InputSocket::Geometry)?;
            [layout.position[0] + layout.width + NODE_GAP, layout.position[1]]
        }
    };
    sink.set_position(node, position)?;
    Ok(position)
}
