//! Typed per-kind node parameters.
//!
//! Each processing node kind owns its own parameter struct, so a node can
//! never hold a key that belongs to another kind. The flat
//! [`ParameterRecord`] view (name → value) is derived on demand for the wire
//! format and the form resolver.

use crate::pipeline::node_kind::NodeKind;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Model choices offered for depth estimation.
pub const DEPTH_MODELS: &[&str] = &["MiDaS Small", "MiDaS Large"];

/// A single parameter value as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl ParamValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::String(v) => f.write_str(v),
        }
    }
}

/// Flat name → value view of a node's parameters.
pub type ParameterRecord = BTreeMap<String, ParamValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceDetectionParams {
    pub draw_boxes: bool,
}

impl Default for FaceDetectionParams {
    fn default() -> Self {
        Self { draw_boxes: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthEstimationParams {
    /// Normally one of [`DEPTH_MODELS`]; other strings are passed through.
    pub model: String,
}

impl Default for DepthEstimationParams {
    fn default() -> Self {
        Self {
            model: DEPTH_MODELS[0].to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SobelFilterParams {
    pub ksize: i64,
}

impl Default for SobelFilterParams {
    fn default() -> Self {
        Self { ksize: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlurEffectParams {
    pub blur_amount: i64,
}

impl Default for BlurEffectParams {
    fn default() -> Self {
        Self { blur_amount: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeDetectionParams {
    pub threshold: i64,
}

impl Default for EdgeDetectionParams {
    fn default() -> Self {
        Self { threshold: 100 }
    }
}

/// Parameters of a processing node, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeParams {
    FaceDetection(FaceDetectionParams),
    DepthEstimation(DepthEstimationParams),
    SobelFilter(SobelFilterParams),
    BlurEffect(BlurEffectParams),
    EdgeDetection(EdgeDetectionParams),
}

impl NodeParams {
    /// Create default parameters for a node kind
    pub fn defaults_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::FaceDetection => NodeParams::FaceDetection(Default::default()),
            NodeKind::DepthEstimation => NodeParams::DepthEstimation(Default::default()),
            NodeKind::SobelFilter => NodeParams::SobelFilter(Default::default()),
            NodeKind::BlurEffect => NodeParams::BlurEffect(Default::default()),
            NodeKind::EdgeDetection => NodeParams::EdgeDetection(Default::default()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeParams::FaceDetection(_) => NodeKind::FaceDetection,
            NodeParams::DepthEstimation(_) => NodeKind::DepthEstimation,
            NodeParams::SobelFilter(_) => NodeKind::SobelFilter,
            NodeParams::BlurEffect(_) => NodeKind::BlurEffect,
            NodeParams::EdgeDetection(_) => NodeKind::EdgeDetection,
        }
    }

    /// Parameter names declared for this kind.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            NodeParams::FaceDetection(_) => &["draw_boxes"],
            NodeParams::DepthEstimation(_) => &["model"],
            NodeParams::SobelFilter(_) => &["ksize"],
            NodeParams::BlurEffect(_) => &["blur_amount"],
            NodeParams::EdgeDetection(_) => &["threshold"],
        }
    }

    /// Current value of a named parameter, if the kind declares it.
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        match (self, name) {
            (NodeParams::FaceDetection(p), "draw_boxes") => Some(ParamValue::Bool(p.draw_boxes)),
            (NodeParams::DepthEstimation(p), "model") => Some(ParamValue::String(p.model.clone())),
            (NodeParams::SobelFilter(p), "ksize") => Some(ParamValue::Int(p.ksize)),
            (NodeParams::BlurEffect(p), "blur_amount") => Some(ParamValue::Int(p.blur_amount)),
            (NodeParams::EdgeDetection(p), "threshold") => Some(ParamValue::Int(p.threshold)),
            _ => None,
        }
    }

    /// Store an already-coerced value. Returns `false` when the name is not
    /// declared for this kind or the value has the wrong type; the
    /// parameters are left unchanged in that case.
    pub fn set(&mut self, name: &str, value: ParamValue) -> bool {
        match (self, name, value) {
            (NodeParams::FaceDetection(p), "draw_boxes", ParamValue::Bool(v)) => p.draw_boxes = v,
            (NodeParams::DepthEstimation(p), "model", ParamValue::String(v)) => p.model = v,
            (NodeParams::SobelFilter(p), "ksize", ParamValue::Int(v)) => p.ksize = v,
            (NodeParams::BlurEffect(p), "blur_amount", ParamValue::Int(v)) => p.blur_amount = v,
            (NodeParams::EdgeDetection(p), "threshold", ParamValue::Int(v)) => p.threshold = v,
            _ => return false,
        }
        true
    }

    /// Flat record containing exactly this kind's keys.
    pub fn to_record(&self) -> ParameterRecord {
        self.keys()
            .iter()
            .filter_map(|name| self.get(name).map(|v| (name.to_string(), v)))
            .collect()
    }
}

impl Serialize for NodeParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}
