//! Submission-ready projection of a validated graph.

use crate::pipeline::id::NodeId;
use crate::pipeline::node_kind::NodeKind;
use crate::pipeline::params::NodeParams;
use serde::Serialize;

/// One processing node as it will be sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingStep {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    pub params: NodeParams,
}

/// Wire shape of a step: `{label, type, params}`. Ids are not sent.
#[derive(Serialize)]
struct StepPayload<'a> {
    label: &'a str,
    #[serde(rename = "type")]
    kind: NodeKind,
    params: &'a NodeParams,
}

/// A graph that passed [`validate_for_submission`](crate::pipeline::PipelineGraph::validate_for_submission).
///
/// Steps keep node-set order and connections keep edge order; neither is
/// recomputed or sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPipeline {
    steps: Vec<ProcessingStep>,
    connections: Vec<(NodeId, NodeId)>,
}

impl ValidatedPipeline {
    pub(crate) fn new(steps: Vec<ProcessingStep>, connections: Vec<(NodeId, NodeId)>) -> Self {
        Self { steps, connections }
    }

    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }

    pub fn connections(&self) -> &[(NodeId, NodeId)] {
        &self.connections
    }

    pub fn node_count(&self) -> usize {
        self.steps.len()
    }

    /// JSON array sent as the `pipeline` form field. Edges are not included.
    pub fn to_payload_json(&self) -> serde_json::Result<String> {
        let payload: Vec<StepPayload<'_>> = self
            .steps
            .iter()
            .map(|step| StepPayload {
                label: &step.label,
                kind: step.kind,
                params: &step.params,
            })
            .collect();
        serde_json::to_string(&payload)
    }
}
