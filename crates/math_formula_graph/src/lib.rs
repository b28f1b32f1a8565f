// SPDX-License-Identifier: MIT OR Apache-2.0
//! Geometry node graph for math formulas.
//!
//! This crate provides the node graph that compiled formulas land in:
//! - Typed input/output ports with default values
//! - Connection validation and dependency ordering
//! - Frames grouping the nodes of one formula
//! - Serialization support
//!
//! [`Graph`] implements [`math_formula::GraphSink`], so a formula compiles
//! straight into it:
//!
//! ```no_run
//! use math_formula::{compile, FormulaSettings};
//! use math_formula_graph::Graph;
//!
//! let mut graph = Graph::new("Geometry Nodes");
//! let output = compile(&FormulaSettings::new("4 5 + position *"), &mut graph)?;
//! assert_eq!(graph.node_count(), output.nodes.len());
//! # Ok::<(), math_formula::FormulaError>(())
//! ```

pub mod connection;
pub mod frame;
pub mod graph;
pub mod graphs;
pub mod node;
pub mod port;
pub mod sink;

pub use connection::{Connection, ConnectionId};
pub use frame::{Frame, FrameId};
pub use graph::{ConnectionError, CycleError, Graph, GraphError, GraphKind};
pub use graphs::geometry::{create_geometry_registry, geometry_registry};
pub use node::{Node, NodeId, NodeRegistry, NodeType};
pub use port::{Port, PortDirection, PortId, PortType, PortValue, PortValueError};
