//! Preview handles for uploaded and processed media
//!
//! A preview handle is a short-lived URL standing in for bytes held locally.
//! Each handle is created once and must be revoked exactly once.

use std::collections::HashSet;
use std::fmt;

/// An opaque handle to locally held media
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewUrl(String);

impl PreviewUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Allocates and releases preview handles.
#[cfg_attr(test, mockall::automock)]
pub trait PreviewRegistry: Send {
    fn create(&mut self, name: &str, bytes: &[u8]) -> PreviewUrl;

    fn revoke(&mut self, url: &PreviewUrl);
}

/// In-process registry handing out `blob:` style handles
#[derive(Debug, Default)]
pub struct ObjectUrlRegistry {
    next: u64,
    live: HashSet<PreviewUrl>,
    revoked: usize,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles created and not yet revoked
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn revoked_count(&self) -> usize {
        self.revoked
    }

    pub fn is_live(&self, url: &PreviewUrl) -> bool {
        self.live.contains(url)
    }
}

impl PreviewRegistry for ObjectUrlRegistry {
    fn create(&mut self, name: &str, bytes: &[u8]) -> PreviewUrl {
        self.next += 1;
        let url = PreviewUrl(format!("blob:visionflow/{}/{}", self.next, name));
        tracing::trace!("Created preview {} ({} bytes)", url, bytes.len());
        self.live.insert(url.clone());
        url
    }

    fn revoke(&mut self, url: &PreviewUrl) {
        if self.live.remove(url) {
            self.revoked += 1;
            tracing::trace!("Revoked preview {}", url);
        } else {
            tracing::warn!("Revoking unknown preview {}", url);
        }
    }
}
