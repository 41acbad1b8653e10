// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::ConsultaError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for storage and persistence backends.
///
/// Storage adapters manage the lifecycle of the database connection that
/// holds conversations, availability profiles, and the booking ledger.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (open, pragmas, migrations).
    async fn initialize(&self) -> Result<(), ConsultaError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ConsultaError>;
}
