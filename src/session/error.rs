use thiserror::Error;

/// Session state errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A submission is already in flight
    #[error("Processing already in progress")]
    Busy,

    /// Nothing has been processed yet
    #[error("No processed output available")]
    NoOutput,

    /// The output is hosted remotely and cannot be written out locally
    #[error("Output is hosted at {0} and has no local bytes")]
    RemoteOutput(String),

    #[error("Failed to persist theme: {0}")]
    ThemeStore(String),
}

/// Camera access failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The user (or platform) refused camera access
    #[error("Camera access was denied")]
    PermissionDenied,

    /// No camera, camera busy, or capture failed
    #[error("Camera unavailable: {0}")]
    Unavailable(String),
}

impl DeviceError {
    /// Permission problems get a retry prompt; everything else an inline message
    pub fn requires_permission_prompt(&self) -> bool {
        matches!(self, DeviceError::PermissionDenied)
    }
}
