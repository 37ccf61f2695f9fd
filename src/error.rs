//! Error handling for VisionFlow
//!
//! Each subsystem defines its own error enum next to the code that raises it.
//! This module aggregates them into [`VisionFlowError`] and provides the crate
//! wide `Result` alias.

use thiserror::Error;

use crate::pipeline::{GraphError, ParameterError, ValidationError};
use crate::session::{DeviceError, SessionError};
use crate::submission::SubmissionError;

/// Problems caused by what the user did (or forgot to do) before submitting.
///
/// These are reported as a non-blocking notification and never mutate state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserInputError {
    /// No uploaded asset and no usable webcam frame
    #[error("Please upload an image or video first or enable webcam streaming")]
    NoSource,

    /// The graph holds only the Input/Output terminals
    #[error("No processing nodes added to the pipeline")]
    NoProcessingNodes,

    /// The graph failed structural validation
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Uploaded file is not a PNG/JPEG image or an MP4 video
    #[error("Unsupported media type for {name}: {mime}")]
    UnsupportedMedia { name: String, mime: String },
}

/// Main error type for VisionFlow operations
#[derive(Error, Debug)]
pub enum VisionFlowError {
    #[error("Invalid input: {0}")]
    UserInput(#[from] UserInputError),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to pipeline description files
    #[error("Pipeline document error: {0}")]
    Document(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<VisionFlowError>,
    },
}

impl VisionFlowError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        VisionFlowError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error should be shown as a transient notification rather
    /// than a persistent message.
    pub fn is_user_facing(&self) -> bool {
        match self {
            VisionFlowError::UserInput(_) | VisionFlowError::Submission(_) => true,
            VisionFlowError::Session(SessionError::Busy) => true,
            VisionFlowError::WithContext { source, .. } => source.is_user_facing(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for VisionFlowError {
    fn from(err: serde_json::Error) -> Self {
        VisionFlowError::Serialization(err.to_string())
    }
}

/// Result type alias for VisionFlow operations
pub type Result<T> = std::result::Result<T, VisionFlowError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<VisionFlowError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
