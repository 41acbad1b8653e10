// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Consulta booking engine.
//!
//! WAL-mode SQLite with embedded migrations and a single-writer connection
//! via `tokio-rusqlite`. Holds conversations, messages, availability
//! profiles, the booking ledger, and the NLU audit trail. The guarded
//! booking write lives in [`queries::bookings::create_booking`].

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use models::*;
pub use queries::now_timestamp;
