//! Test data builders for creating test objects

use visionflow::pipeline::{NodeId, NodeKind, PipelineGraph, Position, RawInput};

/// Builder for graphs wired as a straight chain
///
/// `GraphBuilder::new().node(BlurEffect).node(SobelFilter).chain()` yields
/// `input → blur_effect_1 → sobel_filter_2 → output`.
pub struct GraphBuilder {
    graph: PipelineGraph,
    ids: Vec<NodeId>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: PipelineGraph::new(),
            ids: Vec::new(),
        }
    }

    pub fn node(mut self, kind: NodeKind) -> Self {
        let y = 120.0 + 80.0 * self.ids.len() as f64;
        let id = self.graph.add_node(kind, Position::new(250.0, y));
        self.ids.push(id);
        self
    }

    /// Set a parameter on the most recently added node
    pub fn param(mut self, name: &str, value: impl Into<RawInput>) -> Self {
        let id = self.ids.last().expect("param() before node()").clone();
        self.graph
            .update_node_parameter(id.as_str(), name, value)
            .unwrap();
        self
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    /// Wire input → nodes in insertion order → output
    pub fn chain(mut self) -> PipelineGraph {
        let mut previous = NodeId::input();
        for id in &self.ids {
            self.graph.add_edge(previous, id.clone());
            previous = id.clone();
        }
        self.graph.add_edge(previous, NodeId::output());
        self.graph
    }

    /// Leave the nodes unconnected
    pub fn unwired(self) -> PipelineGraph {
        self.graph
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_builder_chain() {
        let graph = GraphBuilder::new()
            .node(NodeKind::BlurEffect)
            .param("blur_amount", 9i64)
            .node(NodeKind::SobelFilter)
            .chain();

        assert_eq!(graph.processing_node_count(), 2);
        assert_eq!(graph.edges().len(), 3);
        assert!(graph.has_complete_path());
    }
}
