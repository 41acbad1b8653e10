// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini language-model adapter for Consulta.
//!
//! This crate implements [`ProviderAdapter`] over the Gemini
//! `generateContent` API. It serves both the NLU classification call (with
//! JSON output requested) and the free-form chat reply.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use consulta_config::model::GeminiConfig;
use consulta_core::error::ConsultaError;
use consulta_core::traits::{PluginAdapter, ProviderAdapter};
use consulta_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, Sender,
};
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateRequest, GenerationConfig};

const JSON_MIME_TYPE: &str = "application/json";

/// Gemini provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
pub struct GeminiProvider {
    client: GeminiClient,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiProvider {
    /// Creates a new Gemini provider from the given configuration.
    pub fn new(config: &GeminiConfig) -> Result<Self, ConsultaError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = GeminiClient::new(
            api_key,
            config.base_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;

        info!(model = config.model, "Gemini provider initialized");

        Ok(Self::with_client(client, config))
    }

    /// Creates a provider around an existing client.
    pub fn with_client(client: GeminiClient, config: &GeminiConfig) -> Self {
        Self {
            client,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// Converts a [`ProviderRequest`] to a Gemini [`GenerateRequest`].
    ///
    /// History turns keep their order; the current message is the last
    /// user turn. Per-request sampling settings override the configured ones.
    fn to_generate_request(&self, request: &ProviderRequest) -> GenerateRequest {
        let mut contents: Vec<Content> = request
            .history
            .iter()
            .filter(|entry| !entry.content.trim().is_empty())
            .map(|entry| {
                let role = match entry.sender {
                    Sender::User => "user",
                    Sender::Bot => "model",
                };
                Content::text(Some(role), entry.content.clone())
            })
            .collect();
        contents.push(Content::text(Some("user"), request.message.clone()));

        GenerateRequest {
            contents,
            system_instruction: request
                .system_prompt
                .as_ref()
                .map(|prompt| Content::text(None, prompt.clone())),
            generation_config: GenerationConfig {
                temperature: Some(request.temperature.unwrap_or(self.temperature)),
                max_output_tokens: Some(request.max_output_tokens.unwrap_or(self.max_output_tokens)),
                response_mime_type: request.json_mode.then(|| JSON_MIME_TYPE.to_string()),
            },
        }
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ConsultaError> {
        // No API call here; health checks should not spend quota.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ConsultaError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> Result<ProviderResponse, ConsultaError> {
        let api_request = self.to_generate_request(&request);
        let response = self.client.generate(&api_request).await?;

        let content = response.text().ok_or_else(|| {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            ConsultaError::Provider {
                message: format!("Gemini returned no text ({reason})"),
                source: None,
            }
        })?;

        Ok(ProviderResponse {
            content,
            model: response
                .model_version
                .unwrap_or_else(|| self.client.model().to_string()),
        })
    }
}

/// Resolves the API key: a non-empty config value wins over `GEMINI_API_KEY`.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, ConsultaError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(ConsultaError::Config(
            "Gemini API key not found. Set gemini.api_key in config or GEMINI_API_KEY environment variable.".into(),
        )),
    }
}
