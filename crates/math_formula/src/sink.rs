// SPDX-License-Identifier: MIT OR Apache-2.0
//! The graph mutation surface the compiler writes through.
//!
//! The compiler never touches a node editor directly. It creates nodes,
//! positions them, sets socket values and links them through [`GraphSink`],
//! so any node graph that exposes attribute math nodes can be the target.
//! [`RecordingSink`] is an in-memory implementation that just records the
//! calls it receives.

use crate::catalog::{Domain, Operation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default width of a freshly created node
pub const DEFAULT_NODE_WIDTH: f32 = 140.0;

/// Node types the compiler creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Float math on attributes
    AttributeMath,
    /// Vector math on attributes
    AttributeVectorMath,
}

impl NodeKind {
    /// Node kind that hosts operations of a domain
    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::Scalar => Self::AttributeMath,
            Domain::Vector => Self::AttributeVectorMath,
        }
    }

    /// Registry identifier of the node type
    pub fn type_id(self) -> &'static str {
        match self {
            Self::AttributeMath => "attribute_math",
            Self::AttributeVectorMath => "attribute_vector_math",
        }
    }
}

/// Positional operand of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArgSlot {
    /// First operand
    A,
    /// Second operand
    B,
    /// Third operand
    C,
}

impl ArgSlot {
    /// Slots in positional order
    pub const ALL: [ArgSlot; 3] = [Self::A, Self::B, Self::C];

    /// Zero-based position
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
        }
    }

    /// Label used in socket names
    pub fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

/// Where a node input takes its operand from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    /// Named attribute on the geometry
    Attribute,
    /// Literal float
    Float,
    /// Literal vector
    Vector,
}

/// Input sockets of the attribute math nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputSocket {
    /// Pass-through geometry
    Geometry,
    /// Attribute name of an operand
    Attribute(ArgSlot),
    /// Literal float of an operand
    Float(ArgSlot),
    /// Literal vector of an operand
    Vector(ArgSlot),
    /// Name of the attribute the result is written to
    Result,
}

impl InputSocket {
    /// Socket name as it appears on the node
    pub fn name(self) -> String {
        match self {
            Self::Geometry => GEOMETRY_SOCKET.to_string(),
            Self::Attribute(slot) => format!("{} Attribute", slot.label()),
            Self::Float(slot) => format!("{} Float", slot.label()),
            Self::Vector(slot) => format!("{} Vector", slot.label()),
            Self::Result => "Result".to_string(),
        }
    }
}

impl fmt::Display for InputSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Name of the geometry socket on both sides of a node
pub const GEOMETRY_SOCKET: &str = "Geometry";

/// Output sockets of the attribute math nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputSocket {
    /// Pass-through geometry
    Geometry,
}

impl OutputSocket {
    /// Socket name as it appears on the node
    pub fn name(self) -> &'static str {
        match self {
            Self::Geometry => GEOMETRY_SOCKET,
        }
    }
}

/// Default value written into an input socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SocketValue {
    /// Float literal
    Float(f32),
    /// Vector literal
    Vector([f32; 3]),
    /// Attribute name
    Text(String),
}

/// Where a node sits and how wide it is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    /// Top-left corner
    pub position: [f32; 2],
    /// Drawn width
    pub width: f32,
}

/// Error raised by a graph sink
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The sink does not know the node handle
    #[error("unknown node {0}")]
    UnknownNode(String),

    /// The sink does not know the frame handle
    #[error("unknown frame {0}")]
    UnknownFrame(String),

    /// The node has no such socket
    #[error("{kind:?} node has no socket `{socket}`")]
    MissingSocket {
        /// Kind of the node
        kind: NodeKind,
        /// Requested socket name
        socket: String,
    },

    /// The target graph cannot host formula nodes
    #[error("graph does not accept formula nodes: {0}")]
    Unsupported(String),

    /// Any other failure of the backing graph
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl SinkError {
    /// Wrap an error of the backing graph
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Graph mutation surface used by the compiler
pub trait GraphSink {
    /// Handle of a created node
    type Node: Copy + fmt::Debug;
    /// Handle of a created frame
    type Frame: Copy + fmt::Debug;

    /// Check the graph can receive formula nodes at all
    fn ensure_ready(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Create a node of the given kind
    fn create_node(&mut self, kind: NodeKind) -> Result<Self::Node, SinkError>;

    /// Current position and width of a node
    fn node_layout(&self, node: Self::Node) -> Result<NodeLayout, SinkError>;

    /// Move a node
    fn set_position(&mut self, node: Self::Node, position: [f32; 2]) -> Result<(), SinkError>;

    /// Select the node's operation
    fn set_operation(&mut self, node: Self::Node, operation: Operation) -> Result<(), SinkError>;

    /// Select where an operand is read from
    fn set_input_kind(
        &mut self,
        node: Self::Node,
        slot: ArgSlot,
        kind: InputKind,
    ) -> Result<(), SinkError>;

    /// Write the default value of an input socket
    fn set_input_value(
        &mut self,
        node: Self::Node,
        socket: InputSocket,
        value: SocketValue,
    ) -> Result<(), SinkError>;

    /// Link an output of one node to an input of another
    fn connect(
        &mut self,
        from: Self::Node,
        output: OutputSocket,
        to: Self::Node,
        input: InputSocket,
    ) -> Result<(), SinkError>;

    /// Create a frame with a label
    fn create_frame(&mut self, label: &str) -> Result<Self::Frame, SinkError>;

    /// Put a node inside a frame
    fn assign_to_frame(&mut self, node: Self::Node, frame: Self::Frame) -> Result<(), SinkError>;

    /// Called once after a build finished
    fn refresh(&mut self) {}
}

/// A node as seen by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedNode {
    /// Kind passed to `create_node`
    pub kind: NodeKind,
    /// Last position set
    pub position: [f32; 2],
    /// Drawn width
    pub width: f32,
    /// Operation, once set
    pub operation: Option<Operation>,
    /// Input kind per slot
    pub input_kinds: [Option<InputKind>; 3],
    /// Socket values in the order they were written
    pub values: Vec<(InputSocket, SocketValue)>,
    /// Index of the enclosing frame
    pub frame: Option<usize>,
}

impl RecordedNode {
    /// Latest value written to a socket
    pub fn value(&self, socket: InputSocket) -> Option<&SocketValue> {
        self.values
            .iter()
            .rev()
            .find(|(s, _)| *s == socket)
            .map(|(_, value)| value)
    }
}

/// A link as seen by [`RecordingSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedLink {
    /// Source node index
    pub from: usize,
    /// Source socket
    pub output: OutputSocket,
    /// Target node index
    pub to: usize,
    /// Target socket
    pub input: InputSocket,
}

/// In-memory sink recording every call; node and frame handles are indices
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Created nodes
    pub nodes: Vec<RecordedNode>,
    /// Created links
    pub links: Vec<RecordedLink>,
    /// Labels of created frames
    pub frames: Vec<String>,
    /// Number of `refresh` calls
    pub refreshes: usize,
}

impl RecordingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    fn node_mut(&mut self, node: usize) -> Result<&mut RecordedNode, SinkError> {
        self.nodes
            .get_mut(node)
            .ok_or_else(|| SinkError::UnknownNode(node.to_string()))
    }
}

impl GraphSink for RecordingSink {
    type Node = usize;
    type Frame = usize;

    fn create_node(&mut self, kind: NodeKind) -> Result<usize, SinkError> {
        self.nodes.push(RecordedNode {
            kind,
            position: [0.0, 0.0],
            width: DEFAULT_NODE_WIDTH,
            operation: None,
            input_kinds: [None; 3],
            values: Vec::new(),
            frame: None,
        });
        Ok(self.nodes.len() - 1)
    }

    fn node_layout(&self, node: usize) -> Result<NodeLayout, SinkError> {
        self.nodes
            .get(node)
            .map(|n| NodeLayout { position: n.position, width: n.width })
            .ok_or_else(|| SinkError::UnknownNode(node.to_string()))
    }

    fn set_position(&mut self, node: usize, position: [f32; 2]) -> Result<(), SinkError> {
        self.node_mut(node)?.position = position;
        Ok(())
    }

    fn set_operation(&mut self, node: usize, operation: Operation) -> Result<(), SinkError> {
        self.node_mut(node)?.operation = Some(operation);
        Ok(())
    }

    fn set_input_kind(
        &mut self,
        node: usize,
        slot: ArgSlot,
        kind: InputKind,
    ) -> Result<(), SinkError> {
        self.node_mut(node)?.input_kinds[slot.index()] = Some(kind);
        Ok(())
    }

    fn set_input_value(
        &mut self,
        node: usize,
        socket: InputSocket,
        value: SocketValue,
    ) -> Result<(), SinkError> {
        self.node_mut(node)?.values.push((socket, value));
        Ok(())
    }

    fn connect(
        &mut self,
        from: usize,
        output: OutputSocket,
        to: usize,
        input: InputSocket,
    ) -> Result<(), SinkError> {
        for node in [from, to] {
            self.node_layout(node)?;
        }
        self.links.push(RecordedLink { from, output, to, input });
        Ok(())
    }

    fn create_frame(&mut self, label: &str) -> Result<usize, SinkError> {
        self.frames.push(label.to_string());
        Ok(self.frames.len() - 1)
    }

    fn assign_to_frame(&mut self, node: usize, frame: usize) -> Result<(), SinkError> {
        if frame >= self.frames.len() {
            return Err(SinkError::UnknownFrame(frame.to_string()));
        }
        self.node_mut(node)?.frame = Some(frame);
        Ok(())
    }

    fn refresh(&mut self) {
        self.refreshes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MathOperation;

    #[test]
    fn test_socket_names() {
        assert_eq!(InputSocket::Geometry.name(), "Geometry");
        assert_eq!(InputSocket::Attribute(ArgSlot::A).name(), "A Attribute");
        assert_eq!(InputSocket::Float(ArgSlot::B).name(), "B Float");
        assert_eq!(InputSocket::Vector(ArgSlot::C).name(), "C Vector");
        assert_eq!(InputSocket::Result.to_string(), "Result");
        assert_eq!(OutputSocket::Geometry.name(), "Geometry");
    }

    #[test]
    fn test_node_kind_per_domain() {
        assert_eq!(NodeKind::for_domain(Domain::Scalar), NodeKind::AttributeMath);
        assert_eq!(NodeKind::for_domain(Domain::Vector), NodeKind::AttributeVectorMath);
    }

    #[test]
    fn test_recording_sink_records_calls() {
        let mut sink = RecordingSink::new();
        let a = sink.create_node(NodeKind::AttributeMath).unwrap();
        let b = sink.create_node(NodeKind::AttributeMath).unwrap();

        sink.set_operation(a, Operation::Math(MathOperation::Add)).unwrap();
        sink.set_input_value(a, InputSocket::Result, SocketValue::Text("x".into())).unwrap();
        sink.set_input_value(a, InputSocket::Result, SocketValue::Text("y".into())).unwrap();
        sink.connect(a, OutputSocket::Geometry, b, InputSocket::Geometry).unwrap();

        assert_eq!(
            sink.nodes[a].value(InputSocket::Result),
            Some(&SocketValue::Text("y".into()))
        );
        assert_eq!(sink.links.len(), 1);
        assert!(sink.connect(a, OutputSocket::Geometry, 7, InputSocket::Geometry).is_err());
    }

    #[test]
    fn test_recording_sink_rejects_unknown_frame() {
        let mut sink = RecordingSink::new();
        let node = sink.create_node(NodeKind::AttributeVectorMath).unwrap();
        assert!(matches!(sink.assign_to_frame(node, 0), Err(SinkError::UnknownFrame(_))));

        let frame = sink.create_frame("4 5 *").unwrap();
        sink.assign_to_frame(node, frame).unwrap();
        assert_eq!(sink.nodes[node].frame, Some(frame));
    }
}
