// SPDX-License-Identifier: MIT OR Apache-2.0
//! Geometry node registry.
//!
//! Attribute math nodes read their operands either from a named attribute
//! or from a literal socket, selected per operand through the node's input
//! type. Every operand slot therefore has two sockets. Both nodes pass the
//! geometry through and write their result to the attribute named by the
//! `Result` socket.

use crate::node::{NodeRegistry, NodeType};
use crate::port::{Port, PortType, PortValue};
use math_formula::sink::{InputSocket, DEFAULT_NODE_WIDTH, GEOMETRY_SOCKET};
use math_formula::{ArgSlot, NodeKind};
use std::sync::OnceLock;

/// Create the geometry node registry
pub fn create_geometry_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // Socket order: Geometry, then A/B/C as (Attribute, Float), then Result
    let mut inputs = vec![Port::input(GEOMETRY_SOCKET, PortType::Geometry)];
    for slot in ArgSlot::ALL {
        inputs.push(attribute_port(slot));
        inputs.push(
            Port::input(InputSocket::Float(slot).name(), PortType::Float)
                .with_default(PortValue::Float(0.0)),
        );
    }
    inputs.push(result_port());

    registry.register(NodeType {
        id: NodeKind::AttributeMath.type_id().to_string(),
        name: "Attribute Math".to_string(),
        description: "Float math on attributes or constants".to_string(),
        width: DEFAULT_NODE_WIDTH,
        inputs,
        outputs: vec![Port::output(GEOMETRY_SOCKET, PortType::Geometry)],
    });

    // Socket order: Geometry, then A/B/C as (Attribute, Vector) with the
    // float factor of SCALE after B's vector, then Result
    let mut inputs = vec![Port::input(GEOMETRY_SOCKET, PortType::Geometry)];
    for slot in ArgSlot::ALL {
        inputs.push(attribute_port(slot));
        inputs.push(
            Port::input(InputSocket::Vector(slot).name(), PortType::Vector3)
                .with_default(PortValue::Vector3([0.0; 3])),
        );
        if slot == ArgSlot::B {
            inputs.push(
                Port::input(InputSocket::Float(slot).name(), PortType::Float)
                    .with_default(PortValue::Float(0.0)),
            );
        }
    }
    inputs.push(result_port());

    registry.register(NodeType {
        id: NodeKind::AttributeVectorMath.type_id().to_string(),
        name: "Attribute Vector Math".to_string(),
        description: "Vector math on attributes or constants".to_string(),
        width: DEFAULT_NODE_WIDTH,
        inputs,
        outputs: vec![Port::output(GEOMETRY_SOCKET, PortType::Geometry)],
    });

    registry
}

/// Shared geometry registry
pub fn geometry_registry() -> &'static NodeRegistry {
    static REGISTRY: OnceLock<NodeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(create_geometry_registry)
}

fn attribute_port(slot: ArgSlot) -> Port {
    Port::input(InputSocket::Attribute(slot).name(), PortType::String)
        .with_default(PortValue::String(String::new()))
}

fn result_port() -> Port {
    Port::input(InputSocket::Result.name(), PortType::String)
        .with_default(PortValue::String("Result".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_names(kind: NodeKind) -> Vec<String> {
        let registry = create_geometry_registry();
        registry
            .get(kind.type_id())
            .unwrap()
            .inputs
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    #[test]
    fn test_attribute_math_sockets() {
        assert_eq!(
            input_names(NodeKind::AttributeMath),
            vec![
                "Geometry",
                "A Attribute",
                "A Float",
                "B Attribute",
                "B Float",
                "C Attribute",
                "C Float",
                "Result",
            ]
        );
    }

    #[test]
    fn test_attribute_vector_math_sockets() {
        assert_eq!(
            input_names(NodeKind::AttributeVectorMath),
            vec![
                "Geometry",
                "A Attribute",
                "A Vector",
                "B Attribute",
                "B Vector",
                "B Float",
                "C Attribute",
                "C Vector",
                "Result",
            ]
        );
    }

    #[test]
    fn test_registry_creates_nodes() {
        let node = geometry_registry()
            .create_node(NodeKind::AttributeMath.type_id())
            .unwrap();
        assert_eq!(node.position, [0.0, 0.0]);
        assert_eq!(node.width, DEFAULT_NODE_WIDTH);
        assert!(node.output("Geometry").is_some());
        assert_eq!(geometry_registry().types().count(), 2);
        assert!(geometry_registry().create_node("frame").is_none());
    }
}
