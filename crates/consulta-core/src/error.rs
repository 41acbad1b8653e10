// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Consulta booking engine.

use thiserror::Error;

/// The primary error type used across all Consulta crates and adapter traits.
#[derive(Debug, Error)]
pub enum ConsultaError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Language-model provider errors (transport failure, API error, bad payload).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Moderation collaborator failure.
    #[error("moderation error: {message}")]
    Moderation { message: String },

    /// Notification collaborator failure.
    #[error("notification error: {message}")]
    Notification { message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// The slot was occupied by another booking between offer and confirmation.
    #[error("slot {date} {time} on availability {availability_id} is already taken")]
    SlotTaken {
        availability_id: i64,
        date: String,
        time: String,
    },

    /// The requested time is not a bookable slot of the profile on that date.
    #[error("{date} {time} is not a bookable slot of availability {availability_id}")]
    SlotUnavailable {
        availability_id: i64,
        date: String,
        time: String,
    },

    /// No conversation with the given id exists.
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),

    /// No availability profile with the given id exists.
    #[error("availability profile not found: {0}")]
    ProfileNotFound(i64),

    /// The caller does not own the conversation it addressed.
    #[error("access denied to conversation {conversation_id}")]
    AccessDenied { conversation_id: String },

    /// Caller-supplied input that can never be processed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConsultaError {
    /// True for the booking conflict the caller must present as "slot just taken".
    pub fn is_slot_taken(&self) -> bool {
        matches!(self, ConsultaError::SlotTaken { .. })
    }
}
