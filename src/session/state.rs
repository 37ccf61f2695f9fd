//! Interactive session state
//!
//! A [`Session`] holds everything outside the graph itself: the uploaded
//! asset and its preview, the latest webcam frame, the processed output,
//! settings, and the recent-history list.
//!
//! Submission runs in two phases so a front end can keep handling input
//! while the request is in flight:
//!
//! ```ignore
//! let pending = session.begin_submission(&graph)?;   // guards + busy flag
//! let result = backend.process(pending.asset(), pending.pipeline()).await;
//! session.complete_submission(pending, result)?;      // output + history
//! ```
//!
//! [`Session::submit`] does all three against the session's own backend.

use super::error::SessionError;
use super::history::ProcessingHistory;
use super::preview::{ObjectUrlRegistry, PreviewRegistry, PreviewUrl};
use crate::config::Settings;
use crate::error::{Result, ResultExt, UserInputError, VisionFlowError};
use crate::pipeline::{PipelineGraph, ValidatedPipeline};
use crate::submission::{ProcessedOutput, ProcessingBackend, SubmissionError};
use crate::types::{extension_for_mime, Asset, Frame, MediaKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Prefix of exported file names
pub const DOWNLOAD_PREFIX: &str = "processed_";

// ==================== Busy Flag ====================

/// Shared view of whether a submission is in flight
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> std::result::Result<BusyGuard, SessionError> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| SessionError::Busy)?;
        Ok(BusyGuard(self.0.clone()))
    }
}

/// Clears the busy flag when the submission resolves or is abandoned
#[derive(Debug)]
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ==================== Pending Submission ====================

/// A submission that passed every guard and is waiting on the backend.
///
/// Dropping it without completing releases the busy flag and changes nothing
/// else.
#[derive(Debug)]
pub struct PendingSubmission {
    asset: Asset,
    pipeline: ValidatedPipeline,
    _busy: BusyGuard,
}

impl PendingSubmission {
    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn pipeline(&self) -> &ValidatedPipeline {
        &self.pipeline
    }

    pub fn source_name(&self) -> &str {
        self.asset.name()
    }
}

// ==================== Session ====================

#[derive(Debug)]
struct Upload {
    asset: Asset,
    preview: PreviewUrl,
}

#[derive(Debug)]
struct Output {
    result: ProcessedOutput,
    /// Only inline outputs get a local preview
    preview: Option<PreviewUrl>,
    /// MIME type of the asset that produced this output
    source_mime: String,
}

pub struct Session<B: ProcessingBackend, R: PreviewRegistry = ObjectUrlRegistry> {
    backend: B,
    previews: R,
    settings: Settings,
    upload: Option<Upload>,
    output: Option<Output>,
    latest_frame: Option<Frame>,
    history: ProcessingHistory,
    busy: BusyFlag,
    output_dir: PathBuf,
}

impl<B: ProcessingBackend> Session<B> {
    pub fn new(backend: B, settings: Settings) -> Self {
        Self::with_registry(backend, ObjectUrlRegistry::new(), settings)
    }
}

impl<B: ProcessingBackend, R: PreviewRegistry> Session<B, R> {
    pub fn with_registry(backend: B, previews: R, settings: Settings) -> Self {
        Self {
            backend,
            previews,
            settings,
            upload: None,
            output: None,
            latest_frame: None,
            history: ProcessingHistory::new(),
            busy: BusyFlag::default(),
            output_dir: PathBuf::from("."),
        }
    }

    /// Directory used when `auto_save_results` is on
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    // ── Accessors ──

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn previews(&self) -> &R {
        &self.previews
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        if !settings.webcam_enabled && self.settings.webcam_enabled {
            self.latest_frame = None;
        }
        self.settings = settings.normalized();
        tracing::debug!("Settings updated: {:?}", self.settings);
    }

    pub fn history(&self) -> &ProcessingHistory {
        &self.history
    }

    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn uploaded(&self) -> Option<&Asset> {
        self.upload.as_ref().map(|u| &u.asset)
    }

    pub fn upload_preview(&self) -> Option<&PreviewUrl> {
        self.upload.as_ref().map(|u| &u.preview)
    }

    pub fn output(&self) -> Option<&ProcessedOutput> {
        self.output.as_ref().map(|o| &o.result)
    }

    pub fn output_preview(&self) -> Option<&PreviewUrl> {
        self.output.as_ref().and_then(|o| o.preview.as_ref())
    }

    // ── Sources ──

    /// Replace the uploaded asset. The previous preview and any output are released.
    pub fn upload(&mut self, asset: Asset) -> &PreviewUrl {
        self.release_upload();
        self.release_output();

        let preview = self.previews.create(asset.name(), asset.bytes());
        tracing::info!("Uploaded {} ({}, {} bytes)", asset.name(), asset.mime(), asset.len());
        &self.upload.insert(Upload { asset, preview }).preview
    }

    /// Record the most recent webcam frame. Ignored while the webcam is disabled.
    pub fn set_latest_frame(&mut self, frame: Frame) {
        if self.settings.webcam_enabled {
            self.latest_frame = Some(frame);
        }
    }

    pub fn latest_frame(&self) -> Option<&Frame> {
        self.latest_frame.as_ref()
    }

    /// Drop the upload and output, releasing their previews. Safe to repeat.
    pub fn clear(&mut self) {
        self.release_upload();
        self.release_output();
    }

    fn release_upload(&mut self) {
        if let Some(upload) = self.upload.take() {
            self.previews.revoke(&upload.preview);
        }
    }

    fn release_output(&mut self) {
        if let Some(preview) = self.output.take().and_then(|o| o.preview) {
            self.previews.revoke(&preview);
        }
    }

    // ── Submission ──

    /// Run every pre-submission guard and mark the session busy.
    pub fn begin_submission(&mut self, graph: &PipelineGraph) -> Result<PendingSubmission> {
        if self.busy.is_busy() {
            return Err(SessionError::Busy.into());
        }

        let source = match (&self.upload, self.settings.webcam_enabled) {
            (Some(upload), _) => Source::Upload(&upload.asset),
            (None, false) => return Err(UserInputError::NoSource.into()),
            (None, true) => match &self.latest_frame {
                Some(frame) => Source::Frame(frame),
                None => return Err(UserInputError::NoSource.into()),
            },
        };

        if graph.processing_node_count() == 0 {
            return Err(UserInputError::NoProcessingNodes.into());
        }

        let pipeline = graph
            .validate_for_submission()
            .map_err(UserInputError::from)?;

        let asset = match source {
            Source::Upload(asset) => asset.clone(),
            Source::Frame(frame) => {
                Asset::from_frame(frame).context("Failed to encode webcam frame")?
            }
        };

        let busy = self.busy.acquire()?;
        tracing::debug!(
            "Submission started for {} with {} nodes",
            asset.name(),
            pipeline.node_count()
        );
        Ok(PendingSubmission {
            asset,
            pipeline,
            _busy: busy,
        })
    }

    /// Apply a backend result. On failure only the busy flag changes.
    pub fn complete_submission(
        &mut self,
        pending: PendingSubmission,
        result: std::result::Result<ProcessedOutput, SubmissionError>,
    ) -> Result<&ProcessedOutput> {
        let output = match result {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Processing {} failed: {}", pending.source_name(), e);
                return Err(e.into());
            }
        };

        self.release_output();
        let preview = output
            .inline_bytes()
            .map(|bytes| self.previews.create(pending.source_name(), bytes));

        let entry = self
            .history
            .record(pending.source_name(), pending.pipeline.node_count());
        tracing::info!("{}", entry);

        self.output = Some(Output {
            result: output,
            preview,
            source_mime: pending.asset.mime().to_string(),
        });

        if self.settings.auto_save_results && self.output().is_some_and(|o| !o.is_remote()) {
            let dir = self.output_dir.clone();
            match self.export_output(&dir) {
                Ok(path) => tracing::info!("Auto-saved result to {:?}", path),
                Err(e) => tracing::warn!("Auto-save failed: {}", e),
            }
        }

        drop(pending);
        self.output().ok_or_else(|| SessionError::NoOutput.into())
    }

    /// Validate, send the pipeline to the backend, and store the result.
    pub async fn submit(&mut self, graph: &PipelineGraph) -> Result<&ProcessedOutput> {
        let pending = self.begin_submission(graph)?;
        let result = self
            .backend
            .process(pending.asset(), pending.pipeline())
            .await;
        self.complete_submission(pending, result)
    }

    // ── Export ──

    /// `processed_<upload name>`, or `processed_output.<ext>` without an upload.
    ///
    /// Without an upload the extension follows the submitted encoding, so a
    /// webcam result (sent as PNG) exports as `processed_output.png`.
    pub fn download_name(&self) -> Option<String> {
        let output = self.output.as_ref()?;
        Some(match self.uploaded() {
            Some(asset) => download_name(Some(asset.name()), output.result.media),
            None => match extension_for_mime(&output.source_mime) {
                Some(ext) => format!("{}output.{}", DOWNLOAD_PREFIX, ext),
                None => download_name(None, output.result.media),
            },
        })
    }

    /// Write an inline output into `dir` under [`download_name`](Self::download_name)
    pub fn export_output(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let output = self.output().ok_or(SessionError::NoOutput)?;
        let bytes = match output.inline_bytes() {
            Some(bytes) => bytes,
            None => {
                let url = output.remote_url().unwrap_or_default().to_string();
                return Err(SessionError::RemoteOutput(url).into());
            }
        };

        let name = self.download_name().ok_or(SessionError::NoOutput)?;
        let path = dir.as_ref().join(name);
        std::fs::write(&path, bytes)
            .map_err(VisionFlowError::from)
            .with_context(|| format!("Failed to export output to {:?}", path))?;
        Ok(path)
    }
}

impl<B: ProcessingBackend, R: PreviewRegistry> Drop for Session<B, R> {
    fn drop(&mut self) {
        self.clear();
    }
}

enum Source<'a> {
    Upload(&'a Asset),
    Frame(&'a Frame),
}

/// Export name for an output
pub fn download_name(original: Option<&str>, media: MediaKind) -> String {
    match original {
        Some(name) => format!("{}{}", DOWNLOAD_PREFIX, name),
        None => format!("{}output.{}", DOWNLOAD_PREFIX, media.default_extension()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{NodeKind, Position};
    use crate::session::preview::MockPreviewRegistry;
    use std::sync::atomic::AtomicUsize;

    /// Answers every request with a fixed result and counts calls
    #[derive(Default)]
    struct FakeBackend {
        calls: AtomicUsize,
        fail: bool,
        remote: bool,
    }

    impl ProcessingBackend for FakeBackend {
        async fn process(
            &self,
            asset: &Asset,
            _: &ValidatedPipeline,
        ) -> std::result::Result<ProcessedOutput, SubmissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SubmissionError::Status {
                    status: 500,
                    body: "boom".into(),
                })
            } else if self.remote {
                Ok(ProcessedOutput::remote("http://cdn/out.jpg", asset.media()))
            } else {
                Ok(ProcessedOutput::inline(asset.bytes().to_vec(), asset.media()))
            }
        }
    }

    fn photo() -> Asset {
        Asset::new("photo.png", "image/png", vec![1, 2, 3]).unwrap()
    }

    fn blur_graph() -> PipelineGraph {
        let mut graph = PipelineGraph::new();
        let blur = graph.add_node(NodeKind::BlurEffect, Position::default());
        graph.add_edge("input", blur.clone());
        graph.add_edge(blur, "output");
        graph
    }

    fn session(backend: FakeBackend) -> Session<FakeBackend> {
        Session::new(backend, Settings::default())
    }

    #[test]
    fn test_download_name() {
        assert_eq!(download_name(Some("cat.png"), MediaKind::Image), "processed_cat.png");
        assert_eq!(download_name(None, MediaKind::Image), "processed_output.jpg");
        assert_eq!(download_name(None, MediaKind::Video), "processed_output.mp4");
    }

    #[test]
    fn test_clear_twice_revokes_once() {
        let mut registry = MockPreviewRegistry::new();
        registry
            .expect_create()
            .times(1)
            .returning(|_, _| PreviewUrl::new("blob:1"));
        registry
            .expect_revoke()
            .withf(|url| url.as_str() == "blob:1")
            .times(1)
            .return_const(());

        let mut session =
            Session::with_registry(FakeBackend::default(), registry, Settings::default());
        session.upload(photo());
        session.clear();
        session.clear();
        assert!(session.uploaded().is_none());
    }

    #[test]
    fn test_replacing_upload_revokes_previous() {
        let mut session = session(FakeBackend::default());
        let first = session.upload(photo()).clone();
        session.upload(Asset::new("clip.mp4", "video/mp4", vec![9]).unwrap());

        assert!(!session.previews().is_live(&first));
        assert_eq!(session.previews().live_count(), 1);
    }

    #[test]
    fn test_drop_releases_previews() {
        let mut registry = MockPreviewRegistry::new();
        registry
            .expect_create()
            .returning(|_, _| PreviewUrl::new("blob:1"));
        registry.expect_revoke().times(1).return_const(());

        let mut session =
            Session::with_registry(FakeBackend::default(), registry, Settings::default());
        session.upload(photo());
        drop(session);
    }

    #[tokio::test]
    async fn test_no_source() {
        let mut session = session(FakeBackend::default());
        let err = session.submit(&blur_graph()).await.unwrap_err();
        assert!(matches!(err, VisionFlowError::UserInput(UserInputError::NoSource)));
    }

    #[tokio::test]
    async fn test_webcam_without_frame_is_no_source() {
        let settings = Settings {
            webcam_enabled: true,
            ..Settings::default()
        };
        let mut session = Session::new(FakeBackend::default(), settings);
        let err = session.submit(&blur_graph()).await.unwrap_err();
        assert!(matches!(err, VisionFlowError::UserInput(UserInputError::NoSource)));
    }

    #[tokio::test]
    async fn test_no_processing_nodes_checked_before_validation() {
        let mut session = session(FakeBackend::default());
        session.upload(photo());
        let mut graph = PipelineGraph::new();
        graph.add_edge("input", "output");

        let err = session.submit(&graph).await.unwrap_err();
        assert!(matches!(
            err,
            VisionFlowError::UserInput(UserInputError::NoProcessingNodes)
        ));
        assert_eq!(session.backend().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disconnected_pipeline_rejected() {
        let mut session = session(FakeBackend::default());
        session.upload(photo());
        let mut graph = PipelineGraph::new();
        graph.add_node(NodeKind::SobelFilter, Position::default());

        let err = session.submit(&graph).await.unwrap_err();
        assert!(matches!(
            err,
            VisionFlowError::UserInput(UserInputError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_successful_submit_records_history() {
        let mut session = session(FakeBackend::default());
        session.upload(photo());

        let output = session.submit(&blur_graph()).await.unwrap();
        assert_eq!(output.inline_bytes(), Some(&[1u8, 2, 3][..]));
        assert!(session.output_preview().is_some());
        assert!(!session.is_busy());

        let line = session.history().lines().remove(0);
        assert!(line.ends_with("Processed photo.png with 1 nodes"), "{}", line);
        assert_eq!(session.download_name().as_deref(), Some("processed_photo.png"));
    }

    #[tokio::test]
    async fn test_failed_submit_changes_nothing() {
        let mut session = session(FakeBackend {
            fail: true,
            ..Default::default()
        });
        session.upload(photo());

        let err = session.submit(&blur_graph()).await.unwrap_err();
        assert!(matches!(err, VisionFlowError::Submission(_)));
        assert!(session.output().is_none());
        assert!(session.history().is_empty());
        assert!(!session.is_busy());
        assert!(session.uploaded().is_some());
    }

    #[test]
    fn test_pending_submission_blocks_resubmit() {
        let mut session = session(FakeBackend::default());
        session.upload(photo());
        let graph = blur_graph();

        let pending = session.begin_submission(&graph).unwrap();
        assert!(session.is_busy());
        assert!(matches!(
            session.begin_submission(&graph),
            Err(VisionFlowError::Session(SessionError::Busy))
        ));

        drop(pending);
        assert!(!session.is_busy());
        assert!(session.begin_submission(&graph).is_ok());
    }

    #[tokio::test]
    async fn test_webcam_frame_submission() {
        let settings = Settings {
            webcam_enabled: true,
            ..Settings::default()
        };
        let mut session = Session::new(FakeBackend::default(), settings);
        session.set_latest_frame(Frame::solid(2, 2, [0, 255, 0, 255]));

        session.submit(&blur_graph()).await.unwrap();
        let entry = session.history().latest().unwrap();
        assert_eq!(entry.source_name, "webcam-stream");
        assert_eq!(session.download_name().as_deref(), Some("processed_output.png"));

        let dir = tempfile::tempdir().unwrap();
        let path = session.export_output(dir.path()).unwrap();
        let saved = std::fs::read(path).unwrap();
        assert_eq!(
            image::guess_format(&saved).unwrap(),
            image::ImageFormat::Png
        );
    }

    #[tokio::test]
    async fn test_remote_output_is_not_exported() {
        let mut session = session(FakeBackend {
            remote: true,
            ..Default::default()
        });
        session.upload(photo());
        session.submit(&blur_graph()).await.unwrap();
        assert!(session.output_preview().is_none());

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            session.export_output(dir.path()),
            Err(VisionFlowError::Session(SessionError::RemoteOutput(_)))
        ));
    }

    #[tokio::test]
    async fn test_auto_save_writes_inline_output() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            auto_save_results: true,
            ..Settings::default()
        };
        let mut session =
            Session::new(FakeBackend::default(), settings).with_output_dir(dir.path());
        session.upload(photo());
        session.submit(&blur_graph()).await.unwrap();

        let saved = std::fs::read(dir.path().join("processed_photo.png")).unwrap();
        assert_eq!(saved, vec![1, 2, 3]);
    }

    fn numbered_registry() -> MockPreviewRegistry {
        let mut registry = MockPreviewRegistry::new();
        let mut next = 0;
        registry.expect_create().returning(move |_, _| {
            next += 1;
            PreviewUrl::new(format!("blob:{}", next))
        });
        registry
    }

    #[tokio::test]
    async fn test_clear_releases_output_preview_once() {
        let mut registry = numbered_registry();
        registry
            .expect_revoke()
            .withf(|url| url.as_str() == "blob:1")
            .times(1)
            .return_const(());
        registry
            .expect_revoke()
            .withf(|url| url.as_str() == "blob:2")
            .times(1)
            .return_const(());

        let mut session =
            Session::with_registry(FakeBackend::default(), registry, Settings::default());
        session.upload(photo());
        session.submit(&blur_graph()).await.unwrap();
        assert_eq!(
            session.output_preview().map(PreviewUrl::as_str),
            Some("blob:2")
        );

        session.clear();
        session.clear();
        assert!(session.output().is_none());
        assert!(session.output_preview().is_none());
        drop(session);
    }

    #[tokio::test]
    async fn test_drop_releases_output_preview() {
        let mut registry = numbered_registry();
        registry.expect_revoke().times(2).return_const(());

        let mut session =
            Session::with_registry(FakeBackend::default(), registry, Settings::default());
        session.upload(photo());
        session.submit(&blur_graph()).await.unwrap();
        drop(session);
    }

    #[tokio::test]
    async fn test_remote_output_is_never_revoked() {
        let mut registry = numbered_registry();
        registry
            .expect_revoke()
            .withf(|url| url.as_str() == "blob:1")
            .times(1)
            .return_const(());

        let backend = FakeBackend {
            remote: true,
            ..Default::default()
        };
        let mut session = Session::with_registry(backend, registry, Settings::default());
        session.upload(photo());
        session.submit(&blur_graph()).await.unwrap();
        assert!(session.output_preview().is_none());

        session.clear();
        drop(session);
    }

    #[tokio::test]
    async fn test_resubmit_releases_previous_output() {
        let mut session = session(FakeBackend::default());
        session.upload(photo());
        session.submit(&blur_graph()).await.unwrap();
        let first = session.output_preview().unwrap().clone();

        session.submit(&blur_graph()).await.unwrap();
        assert!(!session.previews().is_live(&first));
        assert_eq!(session.previews().live_count(), 2);
        assert_eq!(session.previews().revoked_count(), 1);
    }

    #[test]
    fn test_export_without_output() {
        let session = session(FakeBackend::default());
        assert!(matches!(
            session.export_output("."),
            Err(VisionFlowError::Session(SessionError::NoOutput))
        ));
    }
}
