use thiserror::Error;

/// Failures while talking to the processing service.
///
/// None of these are fatal; the session stays interactive and the user may
/// simply resubmit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Connection refused, DNS failure, timeout
    #[error("Failed to reach processing service: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status
    #[error("Processing service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A 2xx response whose body could not be understood
    #[error("Invalid response from processing service: {0}")]
    InvalidResponse(String),

    /// The request itself could not be built
    #[error("Failed to encode request: {0}")]
    Encoding(String),
}

impl SubmissionError {
    /// Whether the user could plausibly succeed by resubmitting unchanged
    pub fn is_transient(&self) -> bool {
        match self {
            SubmissionError::Transport(_) => true,
            SubmissionError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for SubmissionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SubmissionError::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            SubmissionError::Encoding(err.to_string())
        } else {
            SubmissionError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SubmissionError {
    fn from(err: serde_json::Error) -> Self {
        SubmissionError::InvalidResponse(err.to_string())
    }
}
