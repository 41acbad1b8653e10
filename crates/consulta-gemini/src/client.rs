// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` API.
//!
//! Provides [`GeminiClient`] which handles request construction,
//! authentication, and transient error retry.

use std::time::Duration;

use consulta_core::ConsultaError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, GenerateRequest, GenerateResponse};

/// HTTP client for Gemini API communication.
///
/// Manages the API key header, connection pooling, and one retry for
/// transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    max_retries: u32,
    retry_delay: Duration,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new Gemini API client.
    ///
    /// `base_url` is the API root without the model path, e.g.
    /// `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, ConsultaError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&api_key).map_err(|e| {
                ConsultaError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ConsultaError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model,
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Sends a request and returns the full response.
    ///
    /// On transient errors (429, 500, 503), retries once after a short delay.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, ConsultaError> {
        let url = self.endpoint();
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying generateContent after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| ConsultaError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "generateContent response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| ConsultaError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&body).map_err(|e| ConsultaError::Provider {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient error, will retry");
                last_error = Some(ConsultaError::Provider {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Gemini API error ({} {}): {}",
                    api_err.error.code, api_err.error.status, api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(ConsultaError::Provider {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| ConsultaError::Provider {
            message: "generateContent failed after retries".into(),
            source: None,
        }))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
