//! Classification service client — HTTP boundary to the prediction endpoint.
//!
//! The service classifies captured traffic on its side and returns one
//! integer verdict per sample. The poller talks to it through the
//! [`ClassificationService`] trait so tests can substitute scripted sources.

use async_trait::async_trait;
use serde::Deserialize;

use crate::types::{Batch, ClassificationLabel};

/// Classification fetch errors.
///
/// All variants are equivalent from the engine's point of view: the poll
/// failed, no partial data can be trusted, and the next scheduled tick is
/// the retry.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    ServerError(reqwest::StatusCode),
    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Wire shape of a successful prediction response.
#[derive(Debug, Deserialize)]
struct PredictResponse {
    /// One integer verdict per classified sample (1 = attack)
    predictions: Vec<i64>,
}

/// Trait abstracting where classification verdicts come from.
///
/// The poller calls [`fetch_batch`](ClassificationService::fetch_batch) once
/// per tick; implementations own transport, decoding, and error mapping.
#[async_trait]
pub trait ClassificationService: Send + Sync + 'static {
    /// Request one batch of verdicts from the service.
    ///
    /// An empty batch is a valid success — the service had nothing new to
    /// classify for this tick.
    async fn fetch_batch(&self) -> Result<Batch, PredictError>;

    /// Human-readable endpoint name for logging.
    fn endpoint_name(&self) -> &str;
}

/// HTTP client for the prediction endpoint.
#[derive(Clone)]
pub struct PredictClient {
    http: reqwest::Client,
    base_url: String,
    endpoint: String,
}

impl PredictClient {
    /// Create a client for `POST {base_url}/predict`.
    ///
    /// No request timeout is configured: a hung request stays in-flight and
    /// the poller skips ticks until it resolves.
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");

        let base_url = base_url.trim_end_matches('/').to_string();
        let endpoint = format!("{}/predict", base_url);
        Self {
            http,
            base_url,
            endpoint,
        }
    }

    /// Base URL for logging.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ClassificationService for PredictClient {
    async fn fetch_batch(&self) -> Result<Batch, PredictError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PredictError::ServerError(status));
        }

        // Read raw bytes first so a decode failure is distinguishable from
        // a transport failure in the error message.
        let body = resp.bytes().await?;
        let decoded: PredictResponse = serde_json::from_slice(&body)?;

        Ok(decoded
            .predictions
            .into_iter()
            .map(ClassificationLabel::from_code)
            .collect())
    }

    fn endpoint_name(&self) -> &str {
        &self.endpoint
    }
}
