//! # VisionFlow: computer-vision pipeline canvas
//!
//! Users build image/video processing pipelines as a graph: typed processing
//! nodes dropped between a fixed Input and Output terminal and wired together.
//! The graph is validated, projected into a submission payload, and sent with
//! the media to a processing service.
//!
//! ## Architecture
//!
//! - **Pipeline**: Node catalog, typed parameters, graph editing and validation
//! - **Submission**: The [`ProcessingBackend`] seam and its multipart HTTP client
//! - **Session**: Uploads, webcam capture, output, history, settings and theme
//! - **Config**: Endpoint and default settings, persisted as TOML
//!
//! ## Configuration
//!
//! Configuration and the theme preference live in the platform data directory
//! under `dev.visionflow.canvas`:
//!
//! - **Linux**: `~/.local/share/dev.visionflow.canvas/`
//! - **macOS**: `~/Library/Application Support/dev.visionflow.canvas/`
//! - **Windows**: `%APPDATA%\dev.visionflow.canvas\`
//!
//! ## Example
//!
//! ```ignore
//! use visionflow::{
//!     config::AppConfig,
//!     pipeline::{NodeKind, PipelineGraph, Position},
//!     session::Session,
//!     submission::HttpProcessingClient,
//!     types::Asset,
//! };
//!
//! let config = AppConfig::load_or_default().with_env_overrides();
//! let client = HttpProcessingClient::new(&config.endpoint)?;
//! let mut session = Session::new(client, config.settings.clone());
//!
//! let mut graph = PipelineGraph::new();
//! let blur = graph.add_node(NodeKind::BlurEffect, Position::new(250.0, 200.0));
//! graph.add_edge("input", blur.clone());
//! graph.add_edge(blur, "output");
//!
//! session.upload(Asset::from_path("photo.png")?);
//! session.submit(&graph).await?;
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod submission;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, EndpointConfig, Settings};
pub use error::{Result, UserInputError, VisionFlowError};
pub use pipeline::{NodeKind, PipelineGraph, ValidatedPipeline};
pub use session::Session;
pub use submission::{HttpProcessingClient, ProcessedOutput, ProcessingBackend};
pub use types::{Asset, Frame, MediaKind};
