//! In-memory pipeline graph.
//!
//! Holds the fixed Input/Output terminals, the processing nodes the user has
//! dropped, and the edges between them. Editing never rejects anything:
//! cycles, self-loops, duplicate and dangling edges can all be stored.
//! Structural checks happen once, in [`PipelineGraph::validate_for_submission`].

use crate::pipeline::error::{GraphError, GraphResult, ValidationError};
use crate::pipeline::form::{apply_edit, RawInput};
use crate::pipeline::id::{NodeId, INPUT_NODE_ID, OUTPUT_NODE_ID};
use crate::pipeline::node_kind::NodeKind;
use crate::pipeline::params::{NodeParams, ParameterRecord};
use crate::pipeline::validated::{ProcessingStep, ValidatedPipeline};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Canvas position. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

const INPUT_POSITION: Position = Position::new(250.0, 50.0);
const OUTPUT_POSITION: Position = Position::new(250.0, 350.0);

/// What a node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRole {
    Input,
    Output,
    Processing(NodeParams),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub role: NodeRole,
    pub position: Position,
}

impl GraphNode {
    pub fn label(&self) -> &'static str {
        match &self.role {
            NodeRole::Input => "Input",
            NodeRole::Output => "Output",
            NodeRole::Processing(params) => params.kind().label(),
        }
    }

    /// Kind tag: `"input"`, `"output"` or the processing kind name.
    pub fn kind_str(&self) -> &'static str {
        match &self.role {
            NodeRole::Input => "input",
            NodeRole::Output => "output",
            NodeRole::Processing(params) => params.kind().as_str(),
        }
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.params().map(NodeParams::kind)
    }

    pub fn params(&self) -> Option<&NodeParams> {
        match &self.role {
            NodeRole::Processing(params) => Some(params),
            _ => None,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.role, NodeRole::Processing(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    /// Rendering hint only.
    #[serde(default)]
    pub animated: bool,
}

/// The editable pipeline graph.
#[derive(Debug, Clone)]
pub struct PipelineGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    /// Last processing-node sequence number handed out. Never reset.
    node_seq: u64,
}

impl Default for PipelineGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineGraph {
    /// A graph holding only the Input and Output terminals.
    pub fn new() -> Self {
        Self {
            nodes: Self::terminals(),
            edges: Vec::new(),
            node_seq: 0,
        }
    }

    fn terminals() -> Vec<GraphNode> {
        vec![
            GraphNode {
                id: NodeId::input(),
                role: NodeRole::Input,
                position: INPUT_POSITION,
            },
            GraphNode {
                id: NodeId::output(),
                role: NodeRole::Output,
                position: OUTPUT_POSITION,
            },
        ]
    }

    // ── Graph building ──

    /// Add a processing node seeded with the kind's defaults. Returns its id.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
        self.node_seq += 1;
        let id = NodeId::processing(kind, self.node_seq);
        tracing::debug!("Adding node {} at ({}, {})", id, position.x, position.y);
        self.nodes.push(GraphNode {
            id: id.clone(),
            role: NodeRole::Processing(kind.default_params()),
            position,
        });
        id
    }

    /// Handle a canvas drop. Empty or unknown payloads are ignored.
    pub fn drop_payload(&mut self, payload: &str, position: Position) -> Option<NodeId> {
        match NodeKind::from_drag_payload(payload) {
            Some(kind) => Some(self.add_node(kind, position)),
            None => {
                tracing::debug!("Ignoring drop with payload {:?}", payload);
                None
            }
        }
    }

    /// Connect `source` to `target`. Always appends.
    pub fn add_edge(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) -> &GraphEdge {
        let edge = GraphEdge {
            source: source.into(),
            target: target.into(),
            animated: true,
        };
        tracing::debug!("Adding edge {} -> {}", edge.source, edge.target);
        self.edges.push(edge);
        &self.edges[self.edges.len() - 1]
    }

    /// Remove the edge at `index` (edge order as returned by [`edges`](Self::edges)).
    pub fn remove_edge(&mut self, index: usize) -> GraphResult<GraphEdge> {
        if index >= self.edges.len() {
            return Err(GraphError::EdgeNotFound(index));
        }
        Ok(self.edges.remove(index))
    }

    /// Merge a parameter edit into a processing node.
    pub fn update_node_parameter(
        &mut self,
        node_id: &str,
        name: &str,
        raw: impl Into<RawInput>,
    ) -> GraphResult<ParameterRecord> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.into()))?;

        let NodeRole::Processing(params) = &mut node.role else {
            return Err(GraphError::NotAProcessingNode(node.id.clone()));
        };

        apply_edit(params, name, raw).map_err(|source| GraphError::Parameter {
            node_id: node.id.clone(),
            source,
        })
    }

    /// Move a node on the canvas.
    pub fn move_node(&mut self, node_id: &str, position: Position) -> GraphResult<()> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.into()))?;
        node.position = position;
        Ok(())
    }

    /// Clear the canvas: drop every processing node and edge, keep the
    /// terminals. The id counter keeps counting.
    pub fn reset(&mut self) {
        tracing::debug!(
            "Resetting graph ({} nodes, {} edges)",
            self.nodes.len(),
            self.edges.len()
        );
        self.nodes = Self::terminals();
        self.edges.clear();
    }

    // ── Queries ──

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn processing_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|n| n.is_processing())
    }

    pub fn processing_node_count(&self) -> usize {
        self.processing_nodes().count()
    }

    // ── Validation ──

    /// Check the graph is fit to submit and project it into a
    /// [`ValidatedPipeline`].
    ///
    /// Connectivity is checked weakly: some edge must leave `input` and some
    /// edge must enter `output`, but no path between them is required.
    pub fn validate_for_submission(&self) -> Result<ValidatedPipeline, ValidationError> {
        if self.processing_node_count() == 0 {
            return Err(ValidationError::NoProcessingNodes);
        }

        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        if let Some(edge) = self
            .edges
            .iter()
            .find(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
        {
            return Err(ValidationError::DanglingEdge {
                from: edge.source.clone(),
                to: edge.target.clone(),
            });
        }

        let leaves_input = self.edges.iter().any(|e| e.source.is_input());
        let enters_output = self.edges.iter().any(|e| e.target.is_output());
        if !(leaves_input && enters_output) {
            return Err(ValidationError::DisconnectedPipeline);
        }

        if !self.has_complete_path() {
            tracing::warn!("Pipeline passes validation but has no path from input to output");
        }

        let steps = self
            .processing_nodes()
            .filter_map(|node| {
                node.params().map(|params| ProcessingStep {
                    id: node.id.clone(),
                    label: node.label().to_string(),
                    kind: params.kind(),
                    params: params.clone(),
                })
            })
            .collect();
        let connections = self
            .edges
            .iter()
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect();

        Ok(ValidatedPipeline::new(steps, connections))
    }

    /// Whether `output` is reachable from `input` along stored edges.
    pub fn has_complete_path(&self) -> bool {
        let mut visited: HashSet<&str> = HashSet::from([INPUT_NODE_ID]);
        let mut queue: VecDeque<&str> = VecDeque::from([INPUT_NODE_ID]);

        while let Some(current) = queue.pop_front() {
            if current == OUTPUT_NODE_ID {
                return true;
            }
            for edge in self.edges.iter().filter(|e| e.source == current) {
                if visited.insert(edge.target.as_str()) {
                    queue.push_back(edge.target.as_str());
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::params::ParamValue;

    fn origin() -> Position {
        Position::default()
    }

    #[test]
    fn test_new_graph_has_terminals() {
        let graph = PipelineGraph::new();
        assert_eq!(graph.nodes().len(), 2);
        assert!(graph.node("input").is_some());
        assert!(graph.node("output").is_some());
        assert_eq!(graph.processing_node_count(), 0);
    }

    #[test]
    fn test_ids_are_sequential_across_kinds() {
        let mut graph = PipelineGraph::new();
        let a = graph.add_node(NodeKind::BlurEffect, origin());
        let b = graph.add_node(NodeKind::SobelFilter, origin());
        let c = graph.add_node(NodeKind::BlurEffect, origin());
        assert_eq!(a, "blur_effect_1");
        assert_eq!(b, "sobel_filter_2");
        assert_eq!(c, "blur_effect_3");
    }

    #[test]
    fn test_counter_survives_reset() {
        let mut graph = PipelineGraph::new();
        graph.add_node(NodeKind::BlurEffect, origin());
        graph.add_edge("input", "blur_effect_1");
        graph.reset();
        assert_eq!(graph.nodes().len(), 2);
        assert!(graph.edges().is_empty());
        let id = graph.add_node(NodeKind::BlurEffect, origin());
        assert_eq!(id, "blur_effect_2");
    }

    #[test]
    fn test_independent_graphs_do_not_share_counter() {
        let mut g1 = PipelineGraph::new();
        let mut g2 = PipelineGraph::new();
        g1.add_node(NodeKind::EdgeDetection, origin());
        let id = g2.add_node(NodeKind::EdgeDetection, origin());
        assert_eq!(id, "edge_detection_1");
    }

    #[test]
    fn test_add_edge_accepts_anything() {
        let mut graph = PipelineGraph::new();
        graph.add_edge("input", "input");
        graph.add_edge("input", "ghost");
        graph.add_edge("input", "output");
        graph.add_edge("input", "output");
        assert_eq!(graph.edges().len(), 4);
        assert!(graph.edges()[0].animated);
    }

    #[test]
    fn test_drop_payload() {
        let mut graph = PipelineGraph::new();
        assert_eq!(graph.drop_payload("", origin()), None);
        assert_eq!(graph.drop_payload("warp_drive", origin()), None);
        let id = graph.drop_payload("face_detection", Position::new(10.0, 20.0));
        assert_eq!(id.as_ref().map(NodeId::as_str), Some("face_detection_1"));
        assert_eq!(graph.node("face_detection_1").unwrap().position.y, 20.0);
    }

    #[test]
    fn test_update_parameter_merges() {
        let mut graph = PipelineGraph::new();
        let id = graph.add_node(NodeKind::BlurEffect, origin());
        let record = graph
            .update_node_parameter(id.as_str(), "blur_amount", "9")
            .unwrap();
        assert_eq!(record["blur_amount"], ParamValue::Int(9));
        assert_eq!(
            graph.node(id.as_str()).unwrap().params().unwrap().get("blur_amount"),
            Some(ParamValue::Int(9))
        );
    }

    #[test]
    fn test_update_parameter_errors() {
        let mut graph = PipelineGraph::new();
        assert!(matches!(
            graph.update_node_parameter("blur_effect_7", "blur_amount", "9"),
            Err(GraphError::NodeNotFound(_))
        ));
        assert!(matches!(
            graph.update_node_parameter("input", "blur_amount", "9"),
            Err(GraphError::NotAProcessingNode(_))
        ));
        let id = graph.add_node(NodeKind::BlurEffect, origin());
        assert!(matches!(
            graph.update_node_parameter(id.as_str(), "threshold", "9"),
            Err(GraphError::Parameter { .. })
        ));
    }

    #[test]
    fn test_validate_no_processing_nodes() {
        let mut graph = PipelineGraph::new();
        graph.add_edge("input", "output");
        assert_eq!(
            graph.validate_for_submission().unwrap_err(),
            ValidationError::NoProcessingNodes
        );
    }

    #[test]
    fn test_validate_dangling_edge() {
        let mut graph = PipelineGraph::new();
        let id = graph.add_node(NodeKind::BlurEffect, origin());
        graph.add_edge("input", id.clone());
        graph.add_edge(id, "output");
        graph.add_edge("sobel_filter_9", "output");
        assert!(matches!(
            graph.validate_for_submission(),
            Err(ValidationError::DanglingEdge { .. })
        ));
    }

    #[test]
    fn test_validate_requires_both_terminals() {
        let mut graph = PipelineGraph::new();
        let id = graph.add_node(NodeKind::BlurEffect, origin());
        graph.add_edge("input", id.clone());
        assert_eq!(
            graph.validate_for_submission().unwrap_err(),
            ValidationError::DisconnectedPipeline
        );

        let mut graph = PipelineGraph::new();
        let id = graph.add_node(NodeKind::BlurEffect, origin());
        graph.add_edge(id, "output");
        assert_eq!(
            graph.validate_for_submission().unwrap_err(),
            ValidationError::DisconnectedPipeline
        );
    }

    #[test]
    fn test_validate_is_weak() {
        let mut graph = PipelineGraph::new();
        let a = graph.add_node(NodeKind::BlurEffect, origin());
        let b = graph.add_node(NodeKind::SobelFilter, origin());
        graph.add_edge("input", a);
        graph.add_edge(b, "output");

        assert!(!graph.has_complete_path());
        let validated = graph.validate_for_submission().unwrap();
        assert_eq!(validated.node_count(), 2);
    }

    #[test]
    fn test_validated_order_follows_node_set() {
        let mut graph = PipelineGraph::new();
        let a = graph.add_node(NodeKind::EdgeDetection, origin());
        let b = graph.add_node(NodeKind::FaceDetection, origin());
        graph.add_edge("input", b.clone());
        graph.add_edge(b.clone(), a.clone());
        graph.add_edge(a.clone(), "output");

        assert!(graph.has_complete_path());
        let validated = graph.validate_for_submission().unwrap();
        let ids: Vec<_> = validated.steps().iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec![a.clone(), b.clone()]);
        assert_eq!(validated.connections()[1], (b, a));
    }

    #[test]
    fn test_remove_edge() {
        let mut graph = PipelineGraph::new();
        graph.add_edge("input", "output");
        assert!(graph.remove_edge(3).is_err());
        let edge = graph.remove_edge(0).unwrap();
        assert_eq!(edge.source, "input");
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_path_check_handles_cycles() {
        let mut graph = PipelineGraph::new();
        let a = graph.add_node(NodeKind::BlurEffect, origin());
        graph.add_edge("input", a.clone());
        graph.add_edge(a.clone(), a.clone());
        graph.add_edge(a.clone(), "input");
        assert!(!graph.has_complete_path());
    }
}
