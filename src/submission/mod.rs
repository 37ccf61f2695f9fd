//! Pipeline submission
//!
//! Sends an [`Asset`] together with a [`ValidatedPipeline`] to a processing
//! service and hands back where the result lives.
//!
//! # Main Types
//!
//! - [`ProcessingBackend`] - Anything that can run a pipeline over an asset
//! - [`HttpProcessingClient`] - The multipart HTTP implementation
//! - [`ProcessedOutput`] - A remote URL or inline bytes, plus the media kind
//!
//! Every submission is exactly one request. Nothing here retries.

pub mod error;
pub mod http;

pub use error::SubmissionError;
pub use http::HttpProcessingClient;

use crate::pipeline::ValidatedPipeline;
use crate::types::{Asset, MediaKind};
use std::future::Future;

/// Where a processed result can be found
#[derive(Clone, PartialEq, Eq)]
pub enum OutputLocation {
    /// Hosted by the service; never released by the session
    Remote(String),
    /// Returned in the response body
    Inline(Vec<u8>),
}

impl std::fmt::Debug for OutputLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputLocation::Remote(url) => f.debug_tuple("Remote").field(url).finish(),
            OutputLocation::Inline(bytes) => write!(f, "Inline({} bytes)", bytes.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedOutput {
    pub location: OutputLocation,
    pub media: MediaKind,
}

impl ProcessedOutput {
    pub fn remote(url: impl Into<String>, media: MediaKind) -> Self {
        Self {
            location: OutputLocation::Remote(url.into()),
            media,
        }
    }

    pub fn inline(bytes: Vec<u8>, media: MediaKind) -> Self {
        Self {
            location: OutputLocation::Inline(bytes),
            media,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.location, OutputLocation::Remote(_))
    }

    pub fn remote_url(&self) -> Option<&str> {
        match &self.location {
            OutputLocation::Remote(url) => Some(url),
            OutputLocation::Inline(_) => None,
        }
    }

    pub fn inline_bytes(&self) -> Option<&[u8]> {
        match &self.location {
            OutputLocation::Inline(bytes) => Some(bytes),
            OutputLocation::Remote(_) => None,
        }
    }
}

/// Something that runs a validated pipeline over an asset.
pub trait ProcessingBackend: Send + Sync {
    fn process(
        &self,
        asset: &Asset,
        pipeline: &ValidatedPipeline,
    ) -> impl Future<Output = Result<ProcessedOutput, SubmissionError>> + Send;
}
