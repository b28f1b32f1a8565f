// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::frame::FrameId;
use crate::port::{Port, PortId};
use indexmap::IndexMap;
use math_formula::{ArgSlot, InputKind, Operation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Width nodes of this type are drawn with
    pub width: f32,
    /// Default input ports
    pub inputs: Vec<Port>,
    /// Default output ports
    pub outputs: Vec<Port>,
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node type ID
    pub node_type: String,
    /// Display name
    pub name: String,
    /// Position in the graph
    pub position: [f32; 2],
    /// Drawn width
    pub width: f32,
    /// Selected operation
    pub operation: Option<Operation>,
    /// Input type per operand slot
    pub input_types: [Option<InputKind>; 3],
    /// Enclosing frame
    pub parent: Option<FrameId>,
    /// Input ports
    pub inputs: Vec<Port>,
    /// Output ports
    pub outputs: Vec<Port>,
}

impl Node {
    /// Create a new node from a type definition
    pub fn new(node_type: &NodeType) -> Self {
        Self {
            id: NodeId::new(),
            node_type: node_type.id.clone(),
            name: node_type.name.clone(),
            position: [0.0, 0.0],
            width: node_type.width,
            operation: None,
            input_types: [None; 3],
            parent: None,
            inputs: node_type.inputs.iter().map(Port::instantiate).collect(),
            outputs: node_type.outputs.iter().map(Port::instantiate).collect(),
        }
    }

    /// Input type selected for an operand slot
    pub fn input_type(&self, slot: ArgSlot) -> Option<InputKind> {
        self.input_types[slot.index()]
    }

    /// Get an input port by name
    pub fn input(&self, name: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Get a mutable input port by name
    pub fn input_mut(&mut self, name: &str) -> Option<&mut Port> {
        self.inputs.iter_mut().find(|p| p.name == name)
    }

    /// Get an output port by name
    pub fn output(&self, name: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.name == name)
    }

    /// Get a port by ID
    pub fn port(&self, port_id: &PortId) -> Option<&Port> {
        self.ports().find(|p| p.id == *port_id)
    }

    /// Get all ports
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }
}

/// Registry of available node types
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    /// Registered node types by ID
    types: IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Create a node from a type ID
    pub fn create_node(&self, type_id: &str) -> Option<Node> {
        self.get(type_id).map(Node::new)
    }
}
