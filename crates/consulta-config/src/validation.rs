// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde attributes cannot express, such as the relation
//! between the alternatives limit and the option cap.

use crate::diagnostic::ConfigError;
use crate::model::ConsultaConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &ConsultaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level `{}` must be one of: {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.gemini.model.trim().is_empty() {
        fail("gemini.model must not be empty".to_string());
    }

    if config.gemini.timeout_secs == 0 {
        fail("gemini.timeout_secs must be at least 1".to_string());
    }

    if !(0.0..=2.0).contains(&config.gemini.temperature) {
        fail(format!(
            "gemini.temperature must be between 0.0 and 2.0, got {}",
            config.gemini.temperature
        ));
    }

    if config.conversation.max_bot_responses == 0 {
        fail("conversation.max_bot_responses must be at least 1".to_string());
    }

    if config.conversation.title_max_chars == 0 {
        fail("conversation.title_max_chars must be at least 1".to_string());
    }

    if config.booking.alternatives_limit == 0 {
        fail("booking.alternatives_limit must be at least 1".to_string());
    }

    if config.booking.alternatives_limit > config.booking.max_options {
        fail(format!(
            "booking.alternatives_limit ({}) must not exceed booking.max_options ({})",
            config.booking.alternatives_limit, config.booking.max_options
        ));
    }

    if config.booking.default_duration_minutes == 0 {
        fail("booking.default_duration_minutes must be at least 1".to_string());
    }

    if config.nlu.remote_timeout_secs == 0 {
        fail("nlu.remote_timeout_secs must be at least 1".to_string());
    }

    if config.nlu.max_input_chars == 0 {
        fail("nlu.max_input_chars must be at least 1".to_string());
    }

    if config.moderation.timeout_secs == 0 {
        fail("moderation.timeout_secs must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
