// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Consulta booking engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use consulta_core::types::DEFAULT_SLOT_DURATION_MINUTES;
use serde::{Deserialize, Serialize};

/// Top-level Consulta configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConsultaConfig {
    /// Assistant identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Gemini language-model settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Conversation lifecycle settings.
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Booking and slot-offer settings.
    #[serde(default)]
    pub booking: BookingConfig,

    /// NLU pipeline settings.
    #[serde(default)]
    pub nlu: NluConfig,

    /// Moderation collaborator settings.
    #[serde(default)]
    pub moderation: ModerationConfig,
}

/// Assistant identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "consulta".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable SQLite WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("consulta").join("consulta.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("consulta.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Gemini `generateContent` configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. Falls back to the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API root, without the model path.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_gemini_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            timeout_secs: default_gemini_timeout_secs(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_timeout_secs() -> u64 {
    15
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_output_tokens() -> u32 {
    500
}

/// Conversation lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationConfig {
    /// Bot replies allowed before an ongoing conversation is abandoned.
    #[serde(default = "default_max_bot_responses")]
    pub max_bot_responses: u32,

    /// Title length before truncation with an ellipsis.
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,

    /// Prior messages sent to the language model as context.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// Wrap-up phrases that complete a conversation when no time is mentioned.
    #[serde(default = "default_completion_keywords")]
    pub completion_keywords: Vec<String>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_bot_responses: default_max_bot_responses(),
            title_max_chars: default_title_max_chars(),
            history_limit: default_history_limit(),
            completion_keywords: default_completion_keywords(),
        }
    }
}

fn default_max_bot_responses() -> u32 {
    5
}

fn default_title_max_chars() -> usize {
    50
}

fn default_history_limit() -> u32 {
    20
}

fn default_completion_keywords() -> Vec<String> {
    [
        "thanks, bye",
        "thank you, bye",
        "goodbye",
        "that's all",
        "cảm ơn, tạm biệt",
        "tạm biệt",
        "vậy thôi",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// How a confirmed selection is written to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationMode {
    /// Insert the slot as `confirmed` straight away.
    #[default]
    Direct,
    /// Insert as `pending`; a later confirmation flips it to `confirmed`.
    TwoPhase,
}

/// Booking and slot-offer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BookingConfig {
    #[serde(default)]
    pub confirmation_mode: ConfirmationMode,

    /// Alternatives listed when nothing matched exactly.
    #[serde(default = "default_alternatives_limit")]
    pub alternatives_limit: usize,

    /// Upper bound on options returned in one reply.
    #[serde(default = "default_max_options")]
    pub max_options: usize,

    /// Duration used for bookings whose caller gives none.
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            confirmation_mode: ConfirmationMode::default(),
            alternatives_limit: default_alternatives_limit(),
            max_options: default_max_options(),
            default_duration_minutes: default_duration_minutes(),
        }
    }
}

fn default_alternatives_limit() -> usize {
    5
}

fn default_max_options() -> usize {
    8
}

fn default_duration_minutes() -> u32 {
    DEFAULT_SLOT_DURATION_MINUTES
}

/// NLU pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NluConfig {
    /// Try the language model before pattern extraction.
    #[serde(default = "default_remote_enabled")]
    pub remote_enabled: bool,

    /// Bound on a single classification call, in seconds.
    #[serde(default = "default_remote_timeout_secs")]
    pub remote_timeout_secs: u64,

    /// Longest input the pattern stage accepts.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    #[serde(default = "default_reasoning_max_chars")]
    pub reasoning_max_chars: usize,
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            remote_enabled: default_remote_enabled(),
            remote_timeout_secs: default_remote_timeout_secs(),
            max_input_chars: default_max_input_chars(),
            reasoning_max_chars: default_reasoning_max_chars(),
        }
    }
}

fn default_remote_enabled() -> bool {
    true
}

fn default_remote_timeout_secs() -> u64 {
    10
}

fn default_max_input_chars() -> usize {
    2000
}

fn default_reasoning_max_chars() -> usize {
    200
}

/// Moderation collaborator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModerationConfig {
    /// A moderation call slower than this fails open.
    #[serde(default = "default_moderation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_moderation_timeout_secs(),
        }
    }
}

fn default_moderation_timeout_secs() -> u64 {
    5
}
