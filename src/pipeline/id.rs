//! Identity type for graph nodes.
//!
//! Terminal nodes carry the fixed ids `"input"` and `"output"`. Processing
//! nodes are named `<kind>_<n>` where `n` comes from the owning graph's
//! counter, so ids stay unique for the lifetime of that graph.

use crate::pipeline::node_kind::NodeKind;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Id of the Input terminal.
pub const INPUT_NODE_ID: &str = "input";

/// Id of the Output terminal.
pub const OUTPUT_NODE_ID: &str = "output";

/// String id of a node in a [`PipelineGraph`](crate::pipeline::PipelineGraph).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn input() -> Self {
        Self(INPUT_NODE_ID.to_string())
    }

    pub fn output() -> Self {
        Self(OUTPUT_NODE_ID.to_string())
    }

    /// Id for the `seq`-th processing node of a graph.
    pub fn processing(kind: NodeKind, seq: u64) -> Self {
        Self(format!("{}_{}", kind.as_str(), seq))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_input(&self) -> bool {
        self.0 == INPUT_NODE_ID
    }

    #[inline]
    pub fn is_output(&self) -> bool {
        self.0 == OUTPUT_NODE_ID
    }

    /// Trailing counter of a processing id, if it has one.
    pub fn sequence(&self) -> Option<u64> {
        self.0.rsplit_once('_').and_then(|(_, n)| n.parse().ok())
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
