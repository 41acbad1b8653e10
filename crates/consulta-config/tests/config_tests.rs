// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Consulta configuration system.

use consulta_config::diagnostic::ConfigError;
use consulta_config::model::ConsultaConfig;
use consulta_config::{ConfirmationMode, load_and_validate_str, load_config_from_str};
use serial_test::serial;

/// A file naming every section deserializes into the typed model.
#[test]
fn full_toml_deserializes_into_config() {
    let toml = r#"
[agent]
name = "advisor"
log_level = "debug"

[storage]
database_path = "/tmp/consulta-test.db"
wal_mode = false

[gemini]
api_key = "g-123"
model = "gemini-1.5-pro"
timeout_secs = 30

[conversation]
max_bot_responses = 7
title_max_chars = 40
completion_keywords = ["bye"]

[booking]
confirmation_mode = "two_phase"
alternatives_limit = 3
max_options = 6

[nlu]
remote_enabled = false
max_input_chars = 500

[moderation]
timeout_secs = 2
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "advisor");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/consulta-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.gemini.api_key.as_deref(), Some("g-123"));
    assert_eq!(config.gemini.model, "gemini-1.5-pro");
    assert_eq!(config.gemini.timeout_secs, 30);
    assert_eq!(config.conversation.max_bot_responses, 7);
    assert_eq!(config.conversation.title_max_chars, 40);
    assert_eq!(config.conversation.completion_keywords, vec!["bye"]);
    assert_eq!(config.booking.confirmation_mode, ConfirmationMode::TwoPhase);
    assert_eq!(config.booking.alternatives_limit, 3);
    assert_eq!(config.booking.max_options, 6);
    assert!(!config.nlu.remote_enabled);
    assert_eq!(config.nlu.max_input_chars, 500);
    assert_eq!(config.moderation.timeout_secs, 2);
}

/// An empty file yields the documented defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty config is valid");
    assert_eq!(config.conversation.max_bot_responses, 5);
    assert_eq!(config.conversation.title_max_chars, 50);
    assert_eq!(config.booking.confirmation_mode, ConfirmationMode::Direct);
    assert_eq!(config.booking.alternatives_limit, 5);
    assert_eq!(config.booking.max_options, 8);
    assert_eq!(config.booking.default_duration_minutes, 30);
    assert_eq!(config.nlu.max_input_chars, 2000);
    assert!(config.nlu.remote_enabled);
    assert!(config.gemini.api_key.is_none());
}

/// A misspelled key produces an UnknownKey diagnostic with a suggestion.
#[test]
fn typo_in_booking_section_suggests_fix() {
    let toml = r#"
[booking]
alternatives_limt = 4
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown key must fail");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "alternatives_limt");
            assert_eq!(suggestion.as_deref(), Some("alternatives_limit"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// An unknown top-level section is rejected.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[telegram]
bot_token = "x"
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// A wrong value type is reported as InvalidType.
#[test]
fn wrong_type_reports_invalid_type() {
    let toml = r#"
[conversation]
max_bot_responses = "five"
"#;

    let errors = load_and_validate_str(toml).expect_err("type mismatch must fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after deserialization.
#[test]
fn alternatives_above_option_cap_fails_validation() {
    let toml = r#"
[booking]
alternatives_limit = 10
max_options = 8
"#;

    let errors = load_and_validate_str(toml).expect_err("validation must fail");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
    assert!(errors[0].to_string().contains("alternatives_limit"));
}

/// An unknown confirmation mode is a deserialization error.
#[test]
fn unknown_confirmation_mode_is_rejected() {
    let toml = r#"
[booking]
confirmation_mode = "eventually"
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Environment variables override file values, and keys containing
/// underscores keep them.
#[test]
#[serial]
fn env_vars_override_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "consulta.toml",
            r#"
[conversation]
max_bot_responses = 3
"#,
        )?;
        jail.set_env("CONSULTA_CONVERSATION_MAX_BOT_RESPONSES", "9");
        jail.set_env("CONSULTA_BOOKING_CONFIRMATION_MODE", "two_phase");

        let config: ConsultaConfig =
            consulta_config::load_config_from_path(std::path::Path::new("consulta.toml"))?;
        assert_eq!(config.conversation.max_bot_responses, 9);
        assert_eq!(config.booking.confirmation_mode, ConfirmationMode::TwoPhase);
        Ok(())
    });
}
