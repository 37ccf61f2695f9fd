//! Node catalog.
//!
//! The closed set of processing node kinds a user can drop onto the canvas,
//! with their display labels, presentation categories and default
//! parameters. Lookups by raw string degrade gracefully for unknown kinds.

use crate::pipeline::error::UnknownNodeKind;
use crate::pipeline::params::{NodeParams, ParameterRecord};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Key under which the sidebar places the dragged node kind.
pub const DRAG_DATA_KEY: &str = "application/x-visionflow-node";

/// Types of processing nodes available in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    FaceDetection,
    DepthEstimation,
    SobelFilter,
    BlurEffect,
    EdgeDetection,
}

impl NodeKind {
    /// Wire/tag name, e.g. `"blur_effect"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::FaceDetection => "face_detection",
            NodeKind::DepthEstimation => "depth_estimation",
            NodeKind::SobelFilter => "sobel_filter",
            NodeKind::BlurEffect => "blur_effect",
            NodeKind::EdgeDetection => "edge_detection",
        }
    }

    /// Get the display label for this node kind.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::FaceDetection => "Face Detection",
            NodeKind::DepthEstimation => "Depth Estimation",
            NodeKind::SobelFilter => "Sobel Filter",
            NodeKind::BlurEffect => "Gaussian Blur",
            NodeKind::EdgeDetection => "Edge Detection",
        }
    }

    /// Presentation category, used only for styling.
    pub fn category(&self) -> &'static str {
        match self {
            NodeKind::FaceDetection => "face-detection",
            NodeKind::DepthEstimation => "depth-estimation",
            NodeKind::SobelFilter => "sobel-filter",
            NodeKind::BlurEffect => "blur-effect",
            NodeKind::EdgeDetection => "edge-detection",
        }
    }

    /// Palette description shown under the label.
    pub fn description(&self) -> &'static str {
        match self {
            NodeKind::FaceDetection => "Detect faces in images and videos",
            NodeKind::DepthEstimation => "Generate depth maps from images",
            NodeKind::SobelFilter => "Edge detection filter",
            NodeKind::BlurEffect => "Apply blur effect to images",
            NodeKind::EdgeDetection => "Advanced edge detection algorithm",
        }
    }

    /// Default parameters for a freshly created node of this kind.
    pub fn default_params(&self) -> NodeParams {
        NodeParams::defaults_for(*self)
    }

    /// Get all available node kinds, in sidebar order.
    pub fn all() -> &'static [NodeKind] {
        &[
            NodeKind::FaceDetection,
            NodeKind::DepthEstimation,
            NodeKind::SobelFilter,
            NodeKind::BlurEffect,
            NodeKind::EdgeDetection,
        ]
    }

    /// Interpret a drag-and-drop payload. Empty or unknown payloads yield `None`.
    pub fn from_drag_payload(payload: &str) -> Option<NodeKind> {
        let payload = payload.trim();
        if payload.is_empty() {
            return None;
        }
        payload.parse().ok()
    }
}

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownNodeKind(s.to_string()))
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Default parameter record for a raw kind string. Unknown kinds get an empty record.
pub fn lookup_defaults(kind: &str) -> ParameterRecord {
    kind.parse::<NodeKind>()
        .map(|k| k.default_params().to_record())
        .unwrap_or_default()
}

/// Display label for a raw kind string. Unknown kinds are returned verbatim.
pub fn lookup_label(kind: &str) -> String {
    kind.parse::<NodeKind>()
        .map(|k| k.label().to_string())
        .unwrap_or_else(|_| kind.to_string())
}
