// SPDX-License-Identifier: MIT OR Apache-2.0
//! Formula compilation target: [`GraphSink`] for [`Graph`].

use crate::frame::FrameId;
use crate::graph::{Graph, GraphError, GraphKind};
use crate::graphs::geometry::geometry_registry;
use crate::node::{Node, NodeId};
use math_formula::{
    ArgSlot, GraphSink, InputKind, InputSocket, NodeKind, NodeLayout, Operation, OutputSocket,
    SinkError, SocketValue,
};

impl Graph {
    fn formula_node_mut(&mut self, node_id: NodeId) -> Result<&mut Node, SinkError> {
        self.node_mut(node_id)
            .ok_or_else(|| SinkError::UnknownNode(format!("{:?}", node_id.0)))
    }
}

impl GraphSink for Graph {
    type Node = NodeId;
    type Frame = FrameId;

    fn ensure_ready(&self) -> Result<(), SinkError> {
        match self.kind {
            GraphKind::Geometry => Ok(()),
            kind => Err(SinkError::Unsupported(GraphError::UnsupportedKind(kind).to_string())),
        }
    }

    fn create_node(&mut self, kind: NodeKind) -> Result<NodeId, SinkError> {
        let node = geometry_registry().create_node(kind.type_id()).ok_or_else(|| {
            SinkError::backend(GraphError::UnknownNodeType(kind.type_id().to_string()))
        })?;
        Ok(self.add_node(node))
    }

    fn node_layout(&self, node_id: NodeId) -> Result<NodeLayout, SinkError> {
        let node = self
            .node(node_id)
            .ok_or_else(|| SinkError::UnknownNode(format!("{:?}", node_id.0)))?;
        Ok(NodeLayout {
            position: node.position,
            width: node.width,
        })
    }

    fn set_position(&mut self, node_id: NodeId, position: [f32; 2]) -> Result<(), SinkError> {
        self.formula_node_mut(node_id)?.position = position;
        Ok(())
    }

    fn set_operation(&mut self, node_id: NodeId, operation: Operation) -> Result<(), SinkError> {
        self.formula_node_mut(node_id)?.operation = Some(operation);
        Ok(())
    }

    fn set_input_kind(
        &mut self,
        node_id: NodeId,
        slot: ArgSlot,
        kind: InputKind,
    ) -> Result<(), SinkError> {
        self.formula_node_mut(node_id)?.input_types[slot.index()] = Some(kind);
        Ok(())
    }

    fn set_input_value(
        &mut self,
        node_id: NodeId,
        socket: InputSocket,
        value: SocketValue,
    ) -> Result<(), SinkError> {
        let node = self.formula_node_mut(node_id)?;
        let name = socket.name();
        let port = node.input_mut(&name).ok_or_else(|| {
            SinkError::backend(GraphError::PortNotFound { node: node_id, port: name.clone() })
        })?;
        port.set_default(value.into()).map_err(|err| SinkError::backend(GraphError::from(err)))
    }

    fn connect(
        &mut self,
        from: NodeId,
        output: OutputSocket,
        to: NodeId,
        input: InputSocket,
    ) -> Result<(), SinkError> {
        let from_port = self
            .node(from)
            .and_then(|node| node.output(output.name()))
            .map(|port| port.id)
            .ok_or_else(|| {
                SinkError::backend(GraphError::PortNotFound {
                    node: from,
                    port: output.name().to_string(),
                })
            })?;
        let to_port = self
            .node(to)
            .and_then(|node| node.input(&input.name()))
            .map(|port| port.id)
            .ok_or_else(|| {
                SinkError::backend(GraphError::PortNotFound { node: to, port: input.name() })
            })?;

        Graph::connect(self, from, from_port, to, to_port)
            .map(|_| ())
            .map_err(|err| SinkError::backend(GraphError::from(err)))
    }

    fn create_frame(&mut self, label: &str) -> Result<FrameId, SinkError> {
        Ok(self.add_frame(label))
    }

    fn assign_to_frame(&mut self, node_id: NodeId, frame_id: FrameId) -> Result<(), SinkError> {
        self.set_parent(node_id, frame_id).map_err(SinkError::backend)
    }

    fn refresh(&mut self) {
        self.tag_update();
        tracing::trace!(graph = %self.name, revision = self.revision(), "graph tagged for update");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortValue;
    use math_formula::{compile, CompileStatus, FormulaSettings, MathOperation, VectorOperation};

    fn compile_into(formula: &str) -> (Graph, math_formula::CompileOutput<NodeId, FrameId>) {
        let mut graph = Graph::new("formula");
        let output = compile(&FormulaSettings::new(formula), &mut graph).unwrap();
        (graph, output)
    }

    fn input_value<'g>(
        graph: &'g Graph,
        node: NodeId,
        socket: InputSocket,
    ) -> Option<&'g PortValue> {
        graph.node(node)?.input(&socket.name())?.default_value.as_ref()
    }

    #[test]
    fn test_single_math_node() {
        let (graph, output) = compile_into("4 5 *");
        assert_eq!(graph.node_count(), 1);

        let id = output.nodes[0].handle;
        let node = graph.node(id).unwrap();
        assert_eq!(node.operation, Some(Operation::Math(MathOperation::Multiply)));
        assert_eq!(node.input_type(ArgSlot::A), Some(InputKind::Float));
        assert_eq!(node.input_type(ArgSlot::B), Some(InputKind::Float));
        assert_eq!(node.input_type(ArgSlot::C), None);
        assert_eq!(
            input_value(&graph, id, InputSocket::Float(ArgSlot::A)),
            Some(&PortValue::Float(4.0))
        );
        assert_eq!(
            input_value(&graph, id, InputSocket::Float(ArgSlot::B)),
            Some(&PortValue::Float(5.0))
        );
        assert_eq!(
            input_value(&graph, id, InputSocket::Result),
            Some(&PortValue::String("mf_temp".into()))
        );
    }

    #[test]
    fn test_chain_is_linked_through_geometry() {
        let (graph, output) = compile_into("4 5 + position * 2 v* -> result");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.connection_count(), 2);

        let handles: Vec<NodeId> = output.nodes.iter().map(|n| n.handle).collect();
        assert_eq!(graph.topological_order().unwrap(), handles);

        let second = graph.node(handles[1]).unwrap();
        assert_eq!(second.position, [190.0, 0.0]);
        assert_eq!(second.input_type(ArgSlot::A), Some(InputKind::Attribute));
        assert_eq!(
            input_value(&graph, handles[1], InputSocket::Attribute(ArgSlot::A)),
            Some(&PortValue::String("mf_temp".into()))
        );
        assert_eq!(
            input_value(&graph, handles[1], InputSocket::Attribute(ArgSlot::B)),
            Some(&PortValue::String("position".into()))
        );

        let last = graph.node(handles[2]).unwrap();
        assert_eq!(last.operation, Some(Operation::Vector(VectorOperation::Multiply)));
        assert_eq!(
            input_value(&graph, handles[2], InputSocket::Vector(ArgSlot::B)),
            Some(&PortValue::Vector3([2.0; 3]))
        );
        assert_eq!(
            input_value(&graph, handles[2], InputSocket::Result),
            Some(&PortValue::String("result".into()))
        );
    }

    #[test]
    fn test_scale_factor_uses_float_socket() {
        let (graph, output) = compile_into("(0 0 1) 0.5 scale");
        let id = output.nodes[0].handle;
        let node = graph.node(id).unwrap();

        assert_eq!(node.input_type(ArgSlot::A), Some(InputKind::Vector));
        assert_eq!(node.input_type(ArgSlot::B), Some(InputKind::Float));
        assert_eq!(
            input_value(&graph, id, InputSocket::Vector(ArgSlot::A)),
            Some(&PortValue::Vector3([0.0, 0.0, 1.0]))
        );
        assert_eq!(
            input_value(&graph, id, InputSocket::Float(ArgSlot::B)),
            Some(&PortValue::Float(0.5))
        );
    }

    #[test]
    fn test_frame_contains_all_nodes() {
        let (graph, output) = compile_into("1 sin 2 cos +");
        let frame = output.frame.unwrap();

        assert_eq!(graph.frame(frame).unwrap().label, "1 sin 2 cos +");
        assert_eq!(graph.nodes_in_frame(frame).count(), 3);
        assert_eq!(graph.revision(), 1);
    }

    #[test]
    fn test_cancelled_build_leaves_graph_untouched() {
        let (graph, output) = compile_into("->");
        assert_eq!(output.status, CompileStatus::Cancelled);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.frames().count(), 0);
        assert_eq!(graph.revision(), 0);
    }

    #[test]
    fn test_shader_graph_is_rejected() {
        let mut graph = Graph::with_kind("material", GraphKind::Shader);
        let err = compile(&FormulaSettings::new("4 5 *"), &mut graph).unwrap_err();
        assert!(matches!(err, math_formula::FormulaError::Sink(SinkError::Unsupported(_))));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_recompiling_differs_only_in_ids() {
        let formula = "( 1 2 3 ) normal v+ normalize 2 scale";
        let (_, first) = compile_into(formula);
        let (_, second) = compile_into(formula);

        assert_ne!(first.nodes[0].handle, second.nodes[0].handle);
        for (a, b) in first.nodes.iter().zip(&second.nodes) {
            assert_eq!(a.operation, b.operation);
            assert_eq!(a.args, b.args);
            assert_eq!(a.bindings, b.bindings);
            assert_eq!(a.result_name, b.result_name);
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn test_graph_serializes_after_compile() {
        let (graph, _) = compile_into("4 5 + 2 *");
        let text = ron::to_string(&graph).unwrap();
        let restored: Graph = ron::from_str(&text).unwrap();
        assert_eq!(restored.node_count(), 2);
        assert_eq!(restored.connection_count(), 1);
    }

    #[test]
    fn test_unknown_socket_is_an_error() {
        let mut graph = Graph::new("formula");
        let id = graph.create_node(NodeKind::AttributeVectorMath).unwrap();
        let err = graph
            .set_input_value(id, InputSocket::Float(ArgSlot::A), SocketValue::Float(1.0))
            .unwrap_err();
        assert!(matches!(err, SinkError::Backend(_)));

        let err = graph
            .set_input_value(id, InputSocket::Vector(ArgSlot::A), SocketValue::Text("x".into()))
            .unwrap_err();
        assert!(err.to_string().contains("A Vector"));
    }
}
