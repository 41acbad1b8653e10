// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation booking lifecycle.
//!
//! A conversation starts `ongoing` and ends in exactly one of two terminal
//! states: `completed` (a booking was confirmed or the user wrapped up) or
//! `abandoned` (the reply budget ran out). Nothing leaves a terminal state;
//! the storage layer enforces the same guard on every transition.

use consulta_core::types::{BookingStatus, Conversation};

/// What to do with a new message before any analysis runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Run the full pipeline.
    Proceed,
    /// Reply with the busy message. `abandon` is set when the conversation
    /// is still `ongoing` and must be moved to `abandoned` first.
    Busy { abandon: bool },
    /// The booking is done; reply with the fixed closing message.
    AlreadyCompleted,
}

/// Decide whether a message on `conversation` may be processed.
pub fn gate(conversation: &Conversation, max_bot_responses: u32) -> Gate {
    match conversation.booking_status {
        BookingStatus::Completed => Gate::AlreadyCompleted,
        BookingStatus::Abandoned => Gate::Busy { abandon: false },
        BookingStatus::Ongoing if conversation.bot_response_count >= max_bot_responses => {
            Gate::Busy { abandon: true }
        }
        BookingStatus::Ongoing => Gate::Proceed,
    }
}

/// Title from the first user message, cut to `max_chars` characters with
/// an ellipsis when anything was cut.
pub fn derive_title(first_message: &str, max_chars: usize) -> String {
    let trimmed = first_message.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut title: String = trimmed.chars().take(max_chars).collect();
    title.push_str("...");
    title
}

/// A title is due once the conversation has a user and a bot message and
/// still has no title.
pub fn needs_title(conversation: &Conversation, user_messages: u32, bot_messages: u32) -> bool {
    conversation.title.is_none() && user_messages >= 1 && bot_messages >= 1
}

/// True when `text` contains one of the wrap-up phrases.
///
/// Matching ignores case and surrounding punctuation.
pub fn is_completion_phrase(text: &str, keywords: &[String]) -> bool {
    let normalized = text
        .trim()
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_lowercase();
    if normalized.is_empty() {
        return false;
    }
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .any(|k| !k.is_empty() && normalized.contains(&k))
}
