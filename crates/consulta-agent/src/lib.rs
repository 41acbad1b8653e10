// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation engine for the Consulta booking assistant.
//!
//! The [`BookingEngine`] is the central coordinator that:
//! - Screens each message with the moderation collaborator
//! - Classifies it with the NLU pipeline and records the analysis
//! - Matches requested times against free lecturer slots
//! - Writes confirmed selections to the booking ledger
//! - Drives each conversation through `ongoing -> completed | abandoned`

pub mod chat;
pub mod composer;
pub mod engine;
pub mod reply;
pub mod state;

pub use engine::BookingEngine;
pub use reply::{EngineReply, ReplyKind, Selection};
