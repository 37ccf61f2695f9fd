//! Webcam capture loop
//!
//! A [`WebcamStream`] owns a running capture task:
//!
//! ```text
//! capture ──► processor(frame).await ──► (interval) ──► capture ──► ...
//! ```
//!
//! A frame is captured only after the previous one finished processing, so
//! at most one frame is ever in flight. Stopping or dropping the handle ends
//! the loop, and the device is released however the task exits.
//!
//! The handle exposes both the latest raw capture and the latest frame the
//! processor returned, the latter being what an output view draws.

use super::error::DeviceError;
use crate::config::WebcamResolution;
use crate::error::Result;
use crate::types::Frame;
use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default pause between processed frames (~30 fps)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// A camera device.
pub trait FrameSource: Send + 'static {
    /// Acquire the device at the requested resolution
    fn open(&mut self, resolution: WebcamResolution) -> std::result::Result<(), DeviceError>;

    fn capture(&mut self) -> std::result::Result<Frame, DeviceError>;

    /// Stop all tracks. Called exactly once after a successful `open`.
    fn release(&mut self);
}

/// Per-frame processing callback.
pub trait FrameProcessor: Send + 'static {
    fn process(&mut self, frame: Frame) -> impl Future<Output = Result<Frame>> + Send;
}

impl<F, Fut> FrameProcessor for F
where
    F: FnMut(Frame) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Frame>> + Send,
{
    fn process(&mut self, frame: Frame) -> impl Future<Output = Result<Frame>> + Send {
        self(frame)
    }
}

/// Owns an opened device and releases it on drop
struct DeviceGuard<S: FrameSource>(S);

impl<S: FrameSource> Deref for DeviceGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.0
    }
}

impl<S: FrameSource> DerefMut for DeviceGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.0
    }
}

impl<S: FrameSource> Drop for DeviceGuard<S> {
    fn drop(&mut self) {
        self.0.release();
        tracing::debug!("Webcam released");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebcamConfig {
    pub resolution: WebcamResolution,
    pub frame_interval: Duration,
}

impl Default for WebcamConfig {
    fn default() -> Self {
        Self {
            resolution: WebcamResolution::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

impl WebcamConfig {
    pub fn new(resolution: WebcamResolution) -> Self {
        Self {
            resolution,
            ..Default::default()
        }
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }
}

/// How a capture loop ended
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamSummary {
    /// Frames the processor completed successfully
    pub frames_processed: u64,
    /// Frames the processor rejected
    pub frames_failed: u64,
    /// Set when capture itself failed and ended the loop
    pub device_error: Option<DeviceError>,
}

/// Handle to a running capture loop
pub struct WebcamStream {
    stop_tx: watch::Sender<bool>,
    latest_rx: watch::Receiver<Option<Frame>>,
    processed_rx: watch::Receiver<Option<Frame>>,
    task: Option<JoinHandle<StreamSummary>>,
}

impl std::fmt::Debug for WebcamStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebcamStream")
            .field("running", &self.is_running())
            .finish()
    }
}

impl WebcamStream {
    /// Open the device and spawn the capture loop on the current runtime.
    ///
    /// Open failures are returned directly and nothing is spawned.
    pub fn start<S, P>(
        mut source: S,
        processor: P,
        config: WebcamConfig,
    ) -> std::result::Result<Self, DeviceError>
    where
        S: FrameSource,
        P: FrameProcessor,
    {
        source.open(config.resolution)?;
        let device = DeviceGuard(source);
        tracing::info!("Webcam streaming started at {}", config.resolution);

        let (stop_tx, stop_rx) = watch::channel(false);
        let (latest_tx, latest_rx) = watch::channel(None);
        let (processed_tx, processed_rx) = watch::channel(None);
        let task = tokio::spawn(run_loop(
            device,
            processor,
            stop_rx,
            Outputs {
                latest: latest_tx,
                processed: processed_tx,
            },
            config.frame_interval,
        ));

        Ok(Self {
            stop_tx,
            latest_rx,
            processed_rx,
            task: Some(task),
        })
    }

    /// Most recently captured (unprocessed) frame
    pub fn latest_frame(&self) -> Option<Frame> {
        self.latest_rx.borrow().clone()
    }

    /// Most recent frame returned by the processor
    pub fn latest_processed(&self) -> Option<Frame> {
        self.processed_rx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal the loop to stop and wait for it to release the device
    pub async fn stop(mut self) -> StreamSummary {
        let _ = self.stop_tx.send(true);
        let summary = match self.task.take() {
            Some(task) => task.await.unwrap_or_else(|e| {
                tracing::warn!("Webcam task ended abnormally: {}", e);
                StreamSummary::default()
            }),
            None => StreamSummary::default(),
        };
        tracing::info!(
            "Webcam streaming stopped after {} frames",
            summary.frames_processed
        );
        summary
    }
}

impl Drop for WebcamStream {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.stop_tx.send(true);
        }
    }
}

struct Outputs {
    latest: watch::Sender<Option<Frame>>,
    processed: watch::Sender<Option<Frame>>,
}

async fn run_loop<S, P>(
    mut device: DeviceGuard<S>,
    mut processor: P,
    mut stop: watch::Receiver<bool>,
    outputs: Outputs,
    interval: Duration,
) -> StreamSummary
where
    S: FrameSource,
    P: FrameProcessor,
{
    let mut summary = StreamSummary::default();

    loop {
        if *stop.borrow() {
            break;
        }

        let frame = match device.capture() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Webcam capture failed: {}", e);
                summary.device_error = Some(e);
                break;
            }
        };
        outputs.latest.send_replace(Some(frame.clone()));

        tokio::select! {
            biased;
            _ = stop.changed() => break,
            result = processor.process(frame) => match result {
                Ok(processed) => {
                    summary.frames_processed += 1;
                    outputs.processed.send_replace(Some(processed));
                }
                Err(e) => {
                    summary.frames_failed += 1;
                    tracing::warn!("Frame processing failed: {}", e);
                }
            },
        }

        if interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                biased;
                _ = stop.changed() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    drop(device);
    summary
}
