// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compile report printed after a build.

use clap::ValueEnum;
use math_formula::{CompileOutput, CompileStatus, Diagnostic, EmittedNode};
use math_formula_graph::{FrameId, Graph, NodeId};
use serde::Serialize;
use std::fmt;

/// How the report is written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human readable summary
    #[default]
    Text,
    /// RON document
    Ron,
    /// JSON document
    Json,
}

/// One emitted node as shown in the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeReport {
    /// Position in formula order
    pub index: usize,
    /// Operation identifier
    pub operation: String,
    /// Operands in parameter order
    pub args: Vec<String>,
    /// Attribute the node writes
    pub result: String,
    /// Where the node was placed
    pub position: [f32; 2],
}

impl From<&EmittedNode<NodeId>> for NodeReport {
    fn from(node: &EmittedNode<NodeId>) -> Self {
        Self {
            index: node.sequence_index,
            operation: node.operation.to_string(),
            args: node.args.iter().map(ToString::to_string).collect(),
            result: node.result_name.clone(),
            position: node.position,
        }
    }
}

/// Sizes of the graph after the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    /// Nodes in the graph
    pub nodes: usize,
    /// Links in the graph
    pub links: usize,
    /// Frames in the graph
    pub frames: usize,
}

impl From<&Graph> for GraphSummary {
    fn from(graph: &Graph) -> Self {
        Self {
            nodes: graph.node_count(),
            links: graph.connection_count(),
            frames: graph.frames().count(),
        }
    }
}

/// Everything printed for one formula
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Compiled formula
    pub formula: String,
    /// How the build ended
    pub status: CompileStatus,
    /// Attribute holding the final result
    pub result: Option<String>,
    /// Emitted nodes
    pub nodes: Vec<NodeReport>,
    /// Diagnostics raised during the build
    pub diagnostics: Vec<Diagnostic>,
    /// Graph sizes
    pub graph: GraphSummary,
}

impl Report {
    /// Build a report from a compile into `graph`
    pub fn new(formula: &str, output: &CompileOutput<NodeId, FrameId>, graph: &Graph) -> Self {
        Self {
            formula: formula.to_string(),
            status: output.status,
            result: output.result_name().map(str::to_string),
            nodes: output.nodes.iter().map(NodeReport::from).collect(),
            diagnostics: output.diagnostics.clone(),
            graph: GraphSummary::from(graph),
        }
    }

    /// Render the report in the requested format
    pub fn render(&self, format: OutputFormat) -> Result<String, RenderError> {
        Ok(match format {
            OutputFormat::Text => self.to_string(),
            OutputFormat::Ron => {
                ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?
            }
            OutputFormat::Json => serde_json::to_string_pretty(self)?,
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "formula: {}", self.formula)?;
        writeln!(f, "status:  {:?}", self.status)?;
        if let Some(result) = &self.result {
            writeln!(f, "result:  {result}")?;
        }

        for node in &self.nodes {
            writeln!(
                f,
                "  #{} {}({}) -> {} at ({}, {})",
                node.index,
                node.operation,
                node.args.join(", "),
                node.result,
                node.position[0],
                node.position[1],
            )?;
        }

        for diagnostic in &self.diagnostics {
            writeln!(f, "{diagnostic}")?;
        }

        write!(
            f,
            "graph:   {} nodes, {} links, {} frames",
            self.graph.nodes, self.graph.links, self.graph.frames
        )
    }
}

/// Error when serializing a report
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// RON serialization failed
    #[error("failed to write RON report: {0}")]
    Ron(#[from] ron::Error),

    /// JSON serialization failed
    #[error("failed to write JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use math_formula::{compile, FormulaSettings};

    fn report(formula: &str) -> Report {
        let mut graph = Graph::default();
        let output = compile(&FormulaSettings::new(formula), &mut graph).unwrap();
        Report::new(formula, &output, &graph)
    }

    #[test]
    fn test_text_report() {
        let text = report("4 5 + position * -> out").render(OutputFormat::Text).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "formula: 4 5 + position * -> out");
        assert_eq!(lines[1], "status:  Finished");
        assert_eq!(lines[2], "result:  out");
        assert_eq!(lines[3], "  #0 ADD(4, 5) -> mf_temp at (0, 0)");
        assert_eq!(lines[4], "  #1 MULTIPLY(mf_temp, position) -> out at (190, 0)");
        assert_eq!(lines[5], "graph:   2 nodes, 1 links, 1 frames");
    }

    #[test]
    fn test_cancelled_report_lists_diagnostic() {
        let report = report("x ->");
        assert_eq!(report.status, CompileStatus::Cancelled);
        assert!(report.result.is_none());

        let text = report.render(OutputFormat::Text).unwrap();
        assert!(text.contains("error: No operations added but result set"));
        assert!(text.ends_with("graph:   0 nodes, 0 links, 0 frames"));
    }

    #[test]
    fn test_json_report() {
        let json = report("(1 2 3) length").render(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "Finished");
        assert_eq!(value["nodes"][0]["operation"], "VECTOR_LENGTH");
        assert_eq!(value["nodes"][0]["args"][0], "(1, 2, 3)");
        assert_eq!(value["graph"]["nodes"], 1);
    }

    #[test]
    fn test_ron_report() {
        let text = report("1 sin").render(OutputFormat::Ron).unwrap();
        assert!(text.contains("status: Finished"));
        assert!(text.contains("operation: \"SINE\""));
    }
}
