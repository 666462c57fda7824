//! HTTP client for the external scoring service

use crate::config::ScoringConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::scoring::response::{HealthStatus, RawPredictionResponse, ServiceErrorBody};
use reqwest::multipart::{Form, Part};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Original bytes of the file the user selected
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Anything able to score an uploaded file.
///
/// One call is one attempt: implementations must not retry.
pub trait ScoringService: Send + Sync {
    fn analyze(
        &self,
        file: &UploadFile,
    ) -> impl Future<Output = PipelineResult<RawPredictionResponse>> + Send;
}

/// Scoring service reached over HTTP with a multipart upload
#[derive(Debug, Clone)]
pub struct ScoringClient {
    http_client: reqwest::Client,
    endpoint: String,
    health_endpoint: String,
    field_name: String,
}

impl ScoringClient {
    /// Create a client from configuration
    pub fn new(config: &ScoringConfig) -> PipelineResult<Self> {
        let mut builder = reqwest::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| PipelineError::AnalysisFailed(format!("failed to build HTTP client: {}", e)))?;

        info!(
            endpoint = %config.endpoint,
            timeout_secs = config.timeout_secs,
            "Scoring client initialized"
        );

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            health_endpoint: config.health_endpoint.clone(),
            field_name: config.file_field.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check that the service is up
    pub async fn health_check(&self) -> PipelineResult<HealthStatus> {
        let response = self.http_client.get(&self.health_endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::AnalysisFailed(format!(
                "health check returned {}",
                status.as_u16()
            )));
        }

        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| PipelineError::AnalysisFailed(format!("malformed health response: {}", e)))
    }

    fn build_form(&self, file: &UploadFile) -> PipelineResult<Form> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str("text/csv")?;
        Ok(Form::new().part(self.field_name.clone(), part))
    }
}

impl ScoringService for ScoringClient {
    async fn analyze(&self, file: &UploadFile) -> PipelineResult<RawPredictionResponse> {
        let form = self.build_form(file)?;
        let start = Instant::now();

        debug!(
            endpoint = %self.endpoint,
            file = %file.name,
            bytes = file.size(),
            "Submitting file for scoring"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ServiceErrorBody>(&body)
                .map(|b| b.detail)
                .unwrap_or(body);
            warn!(
                status = status.as_u16(),
                detail = %detail,
                "Scoring service rejected the file"
            );
            return Err(PipelineError::AnalysisFailed(format!(
                "service returned {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let body = response.bytes().await?;
        let parsed: RawPredictionResponse = serde_json::from_slice(&body)
            .map_err(|e| PipelineError::AnalysisFailed(format!("malformed response: {}", e)))?;

        info!(
            file = %file.name,
            predictions = parsed.predictions.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scoring response received"
        );

        Ok(parsed)
    }
}
