// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock language-model provider for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured responses,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use consulta_core::ConsultaError;
use consulta_core::traits::{PluginAdapter, ProviderAdapter};
use consulta_core::types::{AdapterType, HealthStatus, ProviderRequest, ProviderResponse};

/// A mock provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned. Every request is recorded.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
    failing: bool,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
            failing: false,
            delay: None,
        }
    }

    /// A provider whose every call fails with a provider error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// Sleep this long before answering. Pair with a paused tokio clock.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    /// Pop the next response, or return the default.
    async fn next_response(&self) -> String {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ConsultaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ConsultaError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> Result<ProviderResponse, ConsultaError> {
        self.requests.lock().await.push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(ConsultaError::Provider {
                message: "mock provider failure".into(),
                source: None,
            });
        }
        Ok(ProviderResponse {
            content: self.next_response().await,
            model: "mock-model".to_string(),
        })
    }
}
