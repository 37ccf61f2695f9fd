//! Pipeline description files.
//!
//! A document lists processing nodes in creation order plus the edges
//! between them. Loading replays the document through the normal graph
//! operations on a fresh [`PipelineGraph`], so generated ids are
//! deterministic (`<kind>_1`, `<kind>_2`, ...) and edges can refer to them.
//!
//! ```toml
//! [[nodes]]
//! kind = "blur_effect"
//! params = { blur_amount = 9 }
//!
//! [[edges]]
//! source = "input"
//! target = "blur_effect_1"
//!
//! [[edges]]
//! source = "blur_effect_1"
//! target = "output"
//! ```
//!
//! JSON documents with the same shape are accepted when the file name ends
//! in `.json`.

use crate::error::{Result, ResultExt, VisionFlowError};
use crate::pipeline::graph::{PipelineGraph, Position};
use crate::pipeline::id::NodeId;
use crate::pipeline::node_kind::NodeKind;
use crate::pipeline::params::ParameterRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Expected generated id. Checked on load when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Overrides applied on top of the kind's defaults.
    #[serde(default, skip_serializing_if = "ParameterRecord::is_empty")]
    pub params: ParameterRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineDocument {
    #[serde(default)]
    pub nodes: Vec<DocumentNode>,
    #[serde(default)]
    pub edges: Vec<DocumentEdge>,
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

impl PipelineDocument {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| VisionFlowError::Document(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| VisionFlowError::Document(e.to_string()))
    }

    /// Load a document, picking the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline file {:?}", path))?;

        if is_json(path) {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
        .with_context(|| format!("Failed to parse pipeline file {:?}", path))
    }

    /// Save a document, picking the format from the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self).map_err(|e| VisionFlowError::Serialization(e.to_string()))?
        };
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write pipeline file {:?}", path))
    }

    /// Replay the document onto a fresh graph.
    pub fn build_graph(&self) -> Result<PipelineGraph> {
        let mut graph = PipelineGraph::new();

        for (index, node) in self.nodes.iter().enumerate() {
            let position = node
                .position
                .unwrap_or_else(|| Position::new(250.0, 150.0 + 100.0 * index as f64));
            let id = graph.add_node(node.kind, position);

            if let Some(expected) = &node.id {
                if id != expected.as_str() {
                    return Err(VisionFlowError::Document(format!(
                        "node #{} declares id '{}' but would be created as '{}'",
                        index + 1,
                        expected,
                        id
                    )));
                }
            }

            for (name, value) in &node.params {
                graph.update_node_parameter(id.as_str(), name, value.clone())?;
            }
        }

        for edge in &self.edges {
            graph.add_edge(edge.source.as_str(), edge.target.as_str());
        }

        tracing::debug!(
            "Built graph from document: {} processing nodes, {} edges",
            graph.processing_node_count(),
            graph.edges().len()
        );
        Ok(graph)
    }

    /// Snapshot a graph. Only parameters that differ from the defaults are written.
    ///
    /// Nodes are renumbered by position (`<kind>_1`, `<kind>_2`, ...) so the
    /// document loads back even when the live ids came from a graph whose
    /// counter kept running after [`PipelineGraph::reset`]. Edge endpoints
    /// follow the renumbering; ids that match no node are written unchanged.
    pub fn from_graph(graph: &PipelineGraph) -> Self {
        let mut renamed: HashMap<&str, NodeId> = HashMap::new();
        let mut nodes = Vec::new();

        for node in graph.processing_nodes() {
            let Some(params) = node.params() else {
                continue;
            };
            let id = NodeId::processing(params.kind(), nodes.len() as u64 + 1);
            let defaults = params.kind().default_params().to_record();
            let overrides = params
                .to_record()
                .into_iter()
                .filter(|(name, value)| defaults.get(name) != Some(value))
                .collect();

            nodes.push(DocumentNode {
                id: Some(id.to_string()),
                kind: params.kind(),
                position: Some(node.position),
                params: overrides,
            });
            renamed.insert(node.id.as_str(), id);
        }

        let rename = |id: &NodeId| {
            renamed
                .get(id.as_str())
                .map_or_else(|| id.to_string(), NodeId::to_string)
        };
        let edges = graph
            .edges()
            .iter()
            .map(|e| DocumentEdge {
                source: rename(&e.source),
                target: rename(&e.target),
            })
            .collect();

        Self { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::params::ParamValue;

    const BLUR_DOC: &str = r#"
        [[nodes]]
        kind = "blur_effect"
        params = { blur_amount = 9 }

        [[nodes]]
        kind = "sobel_filter"

        [[edges]]
        source = "input"
        target = "blur_effect_1"

        [[edges]]
        source = "blur_effect_1"
        target = "sobel_filter_2"

        [[edges]]
        source = "sobel_filter_2"
        target = "output"
    "#;

    #[test]
    fn test_build_from_toml() {
        let doc = PipelineDocument::from_toml_str(BLUR_DOC).unwrap();
        let graph = doc.build_graph().unwrap();
        assert_eq!(graph.processing_node_count(), 2);
        assert_eq!(
            graph.node("blur_effect_1").unwrap().params().unwrap().get("blur_amount"),
            Some(ParamValue::Int(9))
        );
        assert!(graph.has_complete_path());
        assert!(graph.validate_for_submission().is_ok());
    }

    #[test]
    fn test_build_from_json() {
        let doc = PipelineDocument::from_json_str(
            r#"{"nodes":[{"kind":"face_detection","params":{"draw_boxes":false}}],
                "edges":[{"source":"input","target":"face_detection_1"},
                         {"source":"face_detection_1","target":"output"}]}"#,
        )
        .unwrap();
        let graph = doc.build_graph().unwrap();
        assert_eq!(
            graph.node("face_detection_1").unwrap().params().unwrap().get("draw_boxes"),
            Some(ParamValue::Bool(false))
        );
    }

    #[test]
    fn test_declared_id_must_match() {
        let doc = PipelineDocument::from_toml_str(
            r#"
            [[nodes]]
            id = "blur_effect_2"
            kind = "blur_effect"
            "#,
        )
        .unwrap();
        let err = doc.build_graph().unwrap_err();
        assert!(err.to_string().contains("blur_effect_2"));
    }

    #[test]
    fn test_unknown_parameter_is_rejected() {
        let doc = PipelineDocument::from_toml_str(
            r#"
            [[nodes]]
            kind = "blur_effect"
            params = { threshold = 10 }
            "#,
        )
        .unwrap();
        assert!(matches!(
            doc.build_graph(),
            Err(VisionFlowError::Graph(_))
        ));
    }

    #[test]
    fn test_unknown_kind_fails_to_parse() {
        let res = PipelineDocument::from_toml_str(
            r#"
            [[nodes]]
            kind = "hologram"
            "#,
        );
        assert!(matches!(res, Err(VisionFlowError::Document(_))));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let doc = PipelineDocument::from_toml_str(BLUR_DOC).unwrap();
        let graph = doc.build_graph().unwrap();
        let snapshot = PipelineDocument::from_graph(&graph);

        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[0].params.len(), 1);
        assert!(snapshot.nodes[1].params.is_empty());
        assert_eq!(snapshot.edges, doc.edges);

        let rebuilt = snapshot.build_graph().unwrap();
        assert_eq!(rebuilt.nodes(), graph.nodes());
    }

    #[test]
    fn test_snapshot_after_reset_renumbers() {
        let mut graph = PipelineGraph::new();
        graph.add_node(NodeKind::BlurEffect, Position::default());
        graph.reset();
        let sobel = graph.add_node(NodeKind::SobelFilter, Position::default());
        assert_eq!(sobel.as_str(), "sobel_filter_2");
        graph.add_edge("input", sobel.clone());
        graph.add_edge(sobel.clone(), "output");
        graph
            .update_node_parameter(sobel.as_str(), "ksize", "7")
            .unwrap();

        let snapshot = PipelineDocument::from_graph(&graph);
        assert_eq!(snapshot.nodes[0].id.as_deref(), Some("sobel_filter_1"));
        assert_eq!(snapshot.edges[0].target, "sobel_filter_1");
        assert_eq!(snapshot.edges[1].source, "sobel_filter_1");

        let rebuilt = snapshot.build_graph().unwrap();
        assert!(rebuilt.validate_for_submission().is_ok());
        assert!(rebuilt.has_complete_path());
        assert_eq!(
            rebuilt.node("sobel_filter_1").unwrap().params().unwrap().get("ksize"),
            Some(ParamValue::Int(7))
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let doc = PipelineDocument::from_toml_str(BLUR_DOC).unwrap();

        let toml_path = dir.path().join("pipeline.toml");
        doc.save(&toml_path).unwrap();
        assert_eq!(PipelineDocument::load(&toml_path).unwrap(), doc);

        let json_path = dir.path().join("pipeline.json");
        doc.save(&json_path).unwrap();
        assert_eq!(PipelineDocument::load(&json_path).unwrap(), doc);
    }
}
