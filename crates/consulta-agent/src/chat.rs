// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Free-form conversational replies for messages that carry no schedule.

use std::sync::Arc;
use std::time::Duration;

use consulta_core::traits::ProviderAdapter;
use consulta_core::types::{HistoryEntry, ProviderRequest};
use tracing::{debug, warn};

use crate::reply::{CHAT_APOLOGY_TEXT, NO_PROVIDER_TEXT};

const CONSULTANT_PROMPT: &str = "You are a professional career consultant and educational advisor. \
Your role is to help students and young professionals with:

1. Career guidance and planning
2. University admissions advice
3. Academic counseling
4. Study abroad guidance
5. Personal development and goal setting

Please provide helpful, professional, and accurate advice. Keep responses focused on educational \
and career topics. If asked about unrelated topics, politely redirect the conversation back to \
career and educational matters. When the user wants to meet a lecturer, ask which day and time \
suit them.";

const GENERAL_PROMPT: &str =
    "You are a helpful AI assistant. Please provide accurate and helpful responses to user queries.";

/// System prompt for a conversation context tag.
pub fn system_prompt(context: &str) -> &'static str {
    if context.eq_ignore_ascii_case("consultant") {
        CONSULTANT_PROMPT
    } else {
        GENERAL_PROMPT
    }
}

/// Asks the language model for a reply. Never fails: any provider error or
/// timeout becomes the fixed apology.
pub struct ChatResponder {
    provider: Option<Arc<dyn ProviderAdapter>>,
    timeout: Duration,
}

impl ChatResponder {
    pub fn new(provider: Option<Arc<dyn ProviderAdapter>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub async fn reply(&self, context: &str, history: &[HistoryEntry], message: &str) -> String {
        let Some(provider) = &self.provider else {
            return NO_PROVIDER_TEXT.to_string();
        };

        let request = ProviderRequest {
            system_prompt: Some(system_prompt(context).to_string()),
            history: history.to_vec(),
            message: message.to_string(),
            json_mode: false,
            max_output_tokens: None,
            temperature: Some(0.7),
        };

        match tokio::time::timeout(self.timeout, provider.complete(request)).await {
            Ok(Ok(response)) if !response.content.trim().is_empty() => {
                debug!(model = response.model, "chat reply generated");
                response.content.trim().to_string()
            }
            Ok(Ok(_)) => {
                warn!("language model returned an empty chat reply");
                CHAT_APOLOGY_TEXT.to_string()
            }
            Ok(Err(e)) => {
                warn!(error = %e, "chat reply failed");
                CHAT_APOLOGY_TEXT.to_string()
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "chat reply timed out");
                CHAT_APOLOGY_TEXT.to_string()
            }
        }
    }
}
