//! Parameter form resolver.
//!
//! Describes which input control each node kind exposes and turns raw
//! control input back into typed parameter updates. Bounds and choices are
//! UI affordances only: coercion checks the value's type, never its range,
//! so an even Sobel kernel size or an unlisted depth model is stored as-is.

use crate::pipeline::error::ParameterError;
use crate::pipeline::node_kind::NodeKind;
use crate::pipeline::params::{NodeParams, ParamValue, ParameterRecord, DEPTH_MODELS};

/// The control a field is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Checkbox,
    Select { choices: &'static [&'static str] },
    IntegerStepper { min: i64, max: i64, step: i64 },
    RangeSlider { min: i64, max: i64 },
}

impl Control {
    fn expected(&self) -> &'static str {
        match self {
            Control::Checkbox => "a boolean",
            Control::Select { .. } => "text",
            Control::IntegerStepper { .. } | Control::RangeSlider { .. } => "an integer",
        }
    }
}

/// Static description of one editable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub kind: NodeKind,
    pub name: &'static str,
    pub label: &'static str,
    pub control: Control,
}

impl FieldSpec {
    /// Value currently shown by this field.
    pub fn current(&self, params: &NodeParams) -> Option<ParamValue> {
        params.get(self.name)
    }

    /// Value a fresh node starts with.
    pub fn default_value(&self) -> Option<ParamValue> {
        self.kind.default_params().get(self.name)
    }
}

static FACE_DETECTION_FIELDS: &[FieldSpec] = &[FieldSpec {
    kind: NodeKind::FaceDetection,
    name: "draw_boxes",
    label: "Draw Boxes",
    control: Control::Checkbox,
}];

static DEPTH_ESTIMATION_FIELDS: &[FieldSpec] = &[FieldSpec {
    kind: NodeKind::DepthEstimation,
    name: "model",
    label: "Model",
    control: Control::Select {
        choices: DEPTH_MODELS,
    },
}];

static SOBEL_FILTER_FIELDS: &[FieldSpec] = &[FieldSpec {
    kind: NodeKind::SobelFilter,
    name: "ksize",
    label: "Size",
    control: Control::IntegerStepper {
        min: 1,
        max: 7,
        step: 2,
    },
}];

static BLUR_EFFECT_FIELDS: &[FieldSpec] = &[FieldSpec {
    kind: NodeKind::BlurEffect,
    name: "blur_amount",
    label: "Blur",
    control: Control::RangeSlider { min: 1, max: 25 },
}];

static EDGE_DETECTION_FIELDS: &[FieldSpec] = &[FieldSpec {
    kind: NodeKind::EdgeDetection,
    name: "threshold",
    label: "Sensitivity",
    control: Control::RangeSlider { min: 50, max: 200 },
}];

/// Ordered fields rendered for a node kind.
pub fn fields_for(kind: NodeKind) -> &'static [FieldSpec] {
    match kind {
        NodeKind::FaceDetection => FACE_DETECTION_FIELDS,
        NodeKind::DepthEstimation => DEPTH_ESTIMATION_FIELDS,
        NodeKind::SobelFilter => SOBEL_FILTER_FIELDS,
        NodeKind::BlurEffect => BLUR_EFFECT_FIELDS,
        NodeKind::EdgeDetection => EDGE_DETECTION_FIELDS,
    }
}

/// Raw value coming out of a form control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    Checked(bool),
    Text(String),
    Number(i64),
}

impl From<bool> for RawInput {
    fn from(v: bool) -> Self {
        RawInput::Checked(v)
    }
}

impl From<&str> for RawInput {
    fn from(v: &str) -> Self {
        RawInput::Text(v.to_string())
    }
}

impl From<String> for RawInput {
    fn from(v: String) -> Self {
        RawInput::Text(v)
    }
}

impl From<i64> for RawInput {
    fn from(v: i64) -> Self {
        RawInput::Number(v)
    }
}

impl From<ParamValue> for RawInput {
    fn from(v: ParamValue) -> Self {
        match v {
            ParamValue::Bool(b) => RawInput::Checked(b),
            ParamValue::Int(n) => RawInput::Number(n),
            ParamValue::String(s) => RawInput::Text(s),
        }
    }
}

impl std::fmt::Display for RawInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawInput::Checked(v) => write!(f, "{}", v),
            RawInput::Text(v) => f.write_str(v),
            RawInput::Number(v) => write!(f, "{}", v),
        }
    }
}

/// Lenient integer parse: leading whitespace, an optional sign, then as many
/// digits as are present. `"12px"` is 12 and `"4.7"` is 4. Values beyond the
/// `i64` range saturate to `i64::MAX` / `i64::MIN`.
fn parse_int_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value = rest.bytes().take(digits).fold(0i64, |acc, b| {
        let digit = i64::from(b - b'0');
        if negative {
            acc.saturating_mul(10).saturating_sub(digit)
        } else {
            acc.saturating_mul(10).saturating_add(digit)
        }
    });
    Some(value)
}

fn coerce(field: &FieldSpec, raw: &RawInput) -> Option<ParamValue> {
    match (field.control, raw) {
        (Control::Checkbox, RawInput::Checked(b)) => Some(ParamValue::Bool(*b)),
        (Control::Checkbox, RawInput::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" => Some(ParamValue::Bool(true)),
            "false" | "off" => Some(ParamValue::Bool(false)),
            _ => None,
        },
        (Control::Select { .. }, RawInput::Text(s)) => Some(ParamValue::String(s.clone())),
        (Control::IntegerStepper { .. } | Control::RangeSlider { .. }, RawInput::Number(n)) => {
            Some(ParamValue::Int(*n))
        }
        (Control::IntegerStepper { .. } | Control::RangeSlider { .. }, RawInput::Text(s)) => {
            parse_int_prefix(s).map(ParamValue::Int)
        }
        _ => None,
    }
}

/// Coerce `raw` to the declared type of `name` and merge it into `params`.
///
/// All other parameters are left untouched. On error nothing changes.
pub fn apply_edit(
    params: &mut NodeParams,
    name: &str,
    raw: impl Into<RawInput>,
) -> Result<ParameterRecord, ParameterError> {
    let raw = raw.into();
    let kind = params.kind();
    let field = fields_for(kind)
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| ParameterError::UnknownParameter {
            kind,
            name: name.to_string(),
        })?;

    let value = coerce(field, &raw).ok_or_else(|| ParameterError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
        expected: field.control.expected(),
    })?;

    // Field table and typed params agree on names and types.
    let stored = params.set(name, value);
    debug_assert!(stored, "field table out of sync with {:?}", kind);

    Ok(params.to_record())
}
