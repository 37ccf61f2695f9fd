//! In-memory processing backend

use std::sync::Mutex;
use visionflow::pipeline::ValidatedPipeline;
use visionflow::submission::{ProcessedOutput, ProcessingBackend, SubmissionError};
use visionflow::types::Asset;

/// What the fake saw for one request
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub asset_name: String,
    pub payload: serde_json::Value,
}

/// Echoes the asset bytes back inline, or fails every call when told to
#[derive(Default)]
pub struct EchoBackend {
    pub fail_with: Option<SubmissionError>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl EchoBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: SubmissionError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ProcessingBackend for EchoBackend {
    async fn process(
        &self,
        asset: &Asset,
        pipeline: &ValidatedPipeline,
    ) -> Result<ProcessedOutput, SubmissionError> {
        let payload = serde_json::from_str(&pipeline.to_payload_json().unwrap()).unwrap();
        self.requests.lock().unwrap().push(RecordedRequest {
            asset_name: asset.name().to_string(),
            payload,
        });

        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(ProcessedOutput::inline(asset.bytes().to_vec(), asset.media())),
        }
    }
}
