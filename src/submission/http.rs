//! Multipart HTTP client for the processing service
//!
//! ```text
//! POST <base>/process
//!   file      = <asset bytes>            (filename + mime of the asset)
//!   pipeline  = [{"label", "type", "params"}, ...]
//! ```
//!
//! The service answers either with JSON `{"outputUrl", "outputType"}` or with
//! the processed bytes directly.

use super::{ProcessedOutput, ProcessingBackend, SubmissionError};
use crate::config::EndpointConfig;
use crate::pipeline::ValidatedPipeline;
use crate::types::{Asset, MediaKind};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessResponse {
    output_url: String,
    output_type: MediaKind,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

/// Client for a remote processing service
#[derive(Debug, Clone)]
pub struct HttpProcessingClient {
    client: reqwest::Client,
    endpoint: EndpointConfig,
}

impl HttpProcessingClient {
    pub fn new(endpoint: &EndpointConfig) -> Result<Self, SubmissionError> {
        let client = reqwest::Client::builder()
            .timeout(endpoint.timeout())
            .build()
            .map_err(|e| SubmissionError::Encoding(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    fn build_form(asset: &Asset, pipeline: &ValidatedPipeline) -> Result<Form, SubmissionError> {
        let file = Part::bytes(asset.bytes().to_vec())
            .file_name(asset.name().to_string())
            .mime_str(asset.mime())
            .map_err(|e| SubmissionError::Encoding(e.to_string()))?;
        let pipeline_json = pipeline
            .to_payload_json()
            .map_err(|e| SubmissionError::Encoding(e.to_string()))?;

        Ok(Form::new().part("file", file).text("pipeline", pipeline_json))
    }

    /// `GET <base>/api/health`; true when the service reports `"ok"`
    pub async fn health(&self) -> Result<bool, SubmissionError> {
        let response = self.client.get(self.endpoint.url("api/health")).send().await?;
        let response = ensure_success(response).await?;
        let health: HealthResponse = response.json().await?;
        Ok(health.status == "ok")
    }

    /// `GET <base>/api/version`
    pub async fn server_version(&self) -> Result<String, SubmissionError> {
        let response = self.client.get(self.endpoint.url("api/version")).send().await?;
        let response = ensure_success(response).await?;
        let version: VersionResponse = response.json().await?;
        Ok(version.version)
    }
}

impl ProcessingBackend for HttpProcessingClient {
    async fn process(
        &self,
        asset: &Asset,
        pipeline: &ValidatedPipeline,
    ) -> Result<ProcessedOutput, SubmissionError> {
        let url = self.endpoint.process_url();
        let form = Self::build_form(asset, pipeline)?;

        tracing::info!(
            "Submitting {} ({} bytes) with {} nodes to {}",
            asset.name(),
            asset.len(),
            pipeline.node_count(),
            url
        );

        let response = self.client.post(&url).multipart(form).send().await?;
        let response = ensure_success(response).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        interpret_body(content_type.as_deref(), body.to_vec(), asset.media())
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SubmissionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!("Processing service returned {}: {}", status, body);
    Err(SubmissionError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Decode a successful response body.
///
/// JSON bodies must carry `outputUrl`/`outputType`. Anything else is taken as
/// the processed media itself, typed by the content type when it names one
/// and by the submitted asset otherwise.
fn interpret_body(
    content_type: Option<&str>,
    body: Vec<u8>,
    submitted: MediaKind,
) -> Result<ProcessedOutput, SubmissionError> {
    let content_type = content_type.unwrap_or("application/octet-stream");

    if content_type.contains("json") {
        let parsed: ProcessResponse = serde_json::from_slice(&body)?;
        tracing::debug!("Processed output hosted at {}", parsed.output_url);
        return Ok(ProcessedOutput::remote(parsed.output_url, parsed.output_type));
    }

    if body.is_empty() {
        return Err(SubmissionError::InvalidResponse(
            "empty response body".to_string(),
        ));
    }

    let media = MediaKind::from_mime(content_type).unwrap_or(submitted);
    tracing::debug!("Processed output returned inline ({} bytes, {})", body.len(), media);
    Ok(ProcessedOutput::inline(body, media))
}
