//! Pipeline graph model.
//!
//! A pipeline is a directed graph between two fixed terminals. Users drop
//! typed processing nodes between them and wire the result up; the graph is
//! validated and projected into a [`ValidatedPipeline`] before submission.
//!
//! # Architecture
//!
//! ```text
//! [input] ──► [blur_effect_1] ──► [sobel_filter_2] ──► [output]
//! ```
//!
//! # Design
//!
//! - **Closed catalog** — `NodeKind` enumerates every processing node.
//! - **Typed parameters** — `NodeParams` is a tagged union, one struct per kind.
//! - **Lenient editing** — the form resolver coerces types but never clamps.
//! - **Late validation** — edits are never rejected; `validate_for_submission`
//!   is the only structural gate.

pub mod document;
pub mod error;
pub mod form;
pub mod graph;
pub mod id;
pub mod node_kind;
pub mod params;
pub mod validated;

pub use document::{DocumentEdge, DocumentNode, PipelineDocument};
pub use error::{GraphError, GraphResult, ParameterError, UnknownNodeKind, ValidationError};
pub use form::{apply_edit, fields_for, Control, FieldSpec, RawInput};
pub use graph::{GraphEdge, GraphNode, NodeRole, PipelineGraph, Position};
pub use id::{NodeId, INPUT_NODE_ID, OUTPUT_NODE_ID};
pub use node_kind::{lookup_defaults, lookup_label, NodeKind, DRAG_DATA_KEY};
pub use params::{NodeParams, ParamValue, ParameterRecord, DEPTH_MODELS};
pub use validated::{ProcessingStep, ValidatedPipeline};
