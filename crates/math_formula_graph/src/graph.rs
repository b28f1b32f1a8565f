// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes, connections and frames.

use crate::connection::{Connection, ConnectionId};
use crate::frame::{Frame, FrameId};
use crate::node::{Node, NodeId};
use crate::port::{PortDirection, PortId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What a graph computes; decides which nodes may be added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphKind {
    /// Geometry nodes operating on attributes
    Geometry,
    /// Shader nodes
    Shader,
}

/// A node graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Graph kind
    pub kind: GraphKind,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
    /// Frames grouping nodes
    frames: IndexMap<FrameId, Frame>,
    /// Bumped whenever the graph is tagged for an update
    revision: u64,
}

impl Graph {
    /// Create a new empty geometry graph
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, GraphKind::Geometry)
    }

    /// Create a new empty graph of a given kind
    pub fn with_kind(name: impl Into<String>, kind: GraphKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            frames: IndexMap::new(),
            revision: 0,
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Link an output port to an input port
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
    ) -> Result<ConnectionId, ConnectionError> {
        let source_node = self
            .nodes
            .get(&from_node)
            .ok_or(ConnectionError::NodeNotFound(from_node))?;
        let target_node = self
            .nodes
            .get(&to_node)
            .ok_or(ConnectionError::NodeNotFound(to_node))?;

        let source_port = source_node
            .port(&from_port)
            .ok_or(ConnectionError::PortNotFound(from_port))?;
        let target_port = target_node
            .port(&to_port)
            .ok_or(ConnectionError::PortNotFound(to_port))?;

        if source_port.direction != PortDirection::Output || !source_port.can_connect(target_port) {
            return Err(ConnectionError::IncompatiblePorts);
        }

        if !target_port.multi_connect && self.connections.values().any(|c| c.to_port == to_port) {
            return Err(ConnectionError::PortAlreadyConnected(to_port));
        }

        if from_node == to_node {
            return Err(ConnectionError::SelfLoop);
        }

        let connection = Connection::new(from_node, from_port, to_node, to_port);
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections into a node
    pub fn connections_to_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.to_node == node_id)
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Add an empty frame
    pub fn add_frame(&mut self, label: impl Into<String>) -> FrameId {
        let frame = Frame::new(label);
        let id = frame.id;
        self.frames.insert(id, frame);
        id
    }

    /// Get a frame by ID
    pub fn frame(&self, frame_id: FrameId) -> Option<&Frame> {
        self.frames.get(&frame_id)
    }

    /// Get all frames
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.values()
    }

    /// Put a node inside a frame
    pub fn set_parent(&mut self, node_id: NodeId, frame_id: FrameId) -> Result<(), GraphError> {
        if !self.frames.contains_key(&frame_id) {
            return Err(GraphError::FrameNotFound(frame_id));
        }
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.parent = Some(frame_id);
        Ok(())
    }

    /// Nodes inside a frame
    pub fn nodes_in_frame(&self, frame_id: FrameId) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.parent == Some(frame_id))
    }

    /// Tag the graph as changed
    pub fn tag_update(&mut self) {
        self.revision += 1;
    }

    /// Number of update tags so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Get nodes in dependency order
    pub fn topological_order(&self) -> Result<Vec<NodeId>, CycleError> {
        let mut visited = HashSet::new();
        let mut in_progress = HashSet::new();
        let mut order = Vec::with_capacity(self.nodes.len());

        for node_id in self.nodes.keys() {
            self.visit(*node_id, &mut visited, &mut in_progress, &mut order)?;
        }

        Ok(order)
    }

    fn visit(
        &self,
        node_id: NodeId,
        visited: &mut HashSet<NodeId>,
        in_progress: &mut HashSet<NodeId>,
        order: &mut Vec<NodeId>,
    ) -> Result<(), CycleError> {
        if visited.contains(&node_id) {
            return Ok(());
        }
        if !in_progress.insert(node_id) {
            return Err(CycleError);
        }

        // Upstream nodes come first
        for connection in self.connections_to_node(node_id) {
            self.visit(connection.from_node, visited, in_progress, order)?;
        }

        in_progress.remove(&node_id);
        visited.insert(node_id);
        order.push(node_id);
        Ok(())
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Geometry Nodes")
    }
}

/// Error when creating a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Port not found
    #[error("Port not found: {0:?}")]
    PortNotFound(PortId),

    /// Incompatible port types or directions
    #[error("Incompatible ports")]
    IncompatiblePorts,

    /// Port is already connected
    #[error("Port already connected: {0:?}")]
    PortAlreadyConnected(PortId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,
}

/// Error when graph contains a cycle
#[derive(Debug, thiserror::Error)]
#[error("Graph contains a cycle")]
pub struct CycleError;

/// Error when editing a graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Frame not found
    #[error("Frame not found: {0:?}")]
    FrameNotFound(FrameId),

    /// Node type missing from the registry
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// Node has no port with this name
    #[error("Node {node:?} has no port `{port}`")]
    PortNotFound {
        /// Node searched
        node: NodeId,
        /// Requested port name
        port: String,
    },

    /// Default value does not fit the port
    #[error(transparent)]
    PortValue(#[from] crate::port::PortValueError),

    /// Linking failed
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The graph kind does not support the operation
    #[error("{0:?} graphs do not support attribute math nodes")]
    UnsupportedKind(GraphKind),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::geometry::create_geometry_registry;
    use math_formula::NodeKind;

    fn math_node(graph: &mut Graph) -> NodeId {
        let registry = create_geometry_registry();
        let node = registry.create_node(NodeKind::AttributeMath.type_id()).unwrap();
        graph.add_node(node)
    }

    fn geometry_ports(graph: &Graph, from: NodeId, to: NodeId) -> (PortId, PortId) {
        (
            graph.node(from).unwrap().output("Geometry").unwrap().id,
            graph.node(to).unwrap().input("Geometry").unwrap().id,
        )
    }

    #[test]
    fn test_connect_validates_ports() {
        let mut graph = Graph::new("test");
        let a = math_node(&mut graph);
        let b = math_node(&mut graph);
        let (out, input) = geometry_ports(&graph, a, b);

        graph.connect(a, out, b, input).unwrap();
        assert_eq!(graph.connection_count(), 1);

        assert!(matches!(
            graph.connect(a, out, b, input),
            Err(ConnectionError::PortAlreadyConnected(_))
        ));
        assert!(matches!(
            graph.connect(b, input, a, out),
            Err(ConnectionError::IncompatiblePorts)
        ));

        let (b_out, a_in) = geometry_ports(&graph, b, a);
        let (a_out, _) = geometry_ports(&graph, a, b);
        assert!(matches!(
            graph.connect(a, a_out, a, a_in),
            Err(ConnectionError::SelfLoop)
        ));
        assert!(graph.connect(b, b_out, a, a_in).is_ok());
        assert!(graph.topological_order().is_err());
    }

    #[test]
    fn test_topological_order_follows_links() {
        let mut graph = Graph::new("test");
        let a = math_node(&mut graph);
        let b = math_node(&mut graph);
        let c = math_node(&mut graph);

        let (out, input) = geometry_ports(&graph, c, b);
        graph.connect(c, out, b, input).unwrap();
        let (out, input) = geometry_ports(&graph, b, a);
        graph.connect(b, out, a, input).unwrap();

        assert_eq!(graph.topological_order().unwrap(), vec![c, b, a]);
    }

    #[test]
    fn test_frames() {
        let mut graph = Graph::new("test");
        let a = math_node(&mut graph);
        let frame = graph.add_frame("4 5 *");

        graph.set_parent(a, frame).unwrap();
        assert_eq!(graph.nodes_in_frame(frame).count(), 1);
        assert_eq!(graph.frame(frame).unwrap().label, "4 5 *");

        assert!(matches!(
            graph.set_parent(a, FrameId::new()),
            Err(GraphError::FrameNotFound(_))
        ));
        assert!(matches!(
            graph.set_parent(NodeId::new(), frame),
            Err(GraphError::NodeNotFound(_))
        ));
    }
}
