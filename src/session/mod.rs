//! Application session
//!
//! Everything the canvas tracks besides the graph: uploads, webcam capture,
//! processed output, settings, theme, and recent history.
//!
//! # Features
//!
//! - Upload an image or video, with preview handles released exactly once
//! - Submit a graph through any [`ProcessingBackend`](crate::submission::ProcessingBackend)
//! - Keep the last five submissions, newest first
//! - Persist the dark/light theme
//! - Stream webcam frames with at most one frame in flight

pub mod error;
pub mod history;
pub mod preview;
pub mod state;
pub mod theme;
pub mod webcam;

pub use error::{DeviceError, SessionError};
pub use history::{HistoryEntry, ProcessingHistory, MAX_HISTORY_ENTRIES};
pub use preview::{ObjectUrlRegistry, PreviewRegistry, PreviewUrl};
pub use state::{download_name, BusyFlag, PendingSubmission, Session};
pub use theme::{FileThemeStore, Theme, ThemeController, ThemeStore, THEME_KEY};
pub use webcam::{FrameProcessor, FrameSource, StreamSummary, WebcamConfig, WebcamStream};
