// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary via
//! `embed_migrations!` and applied every time a database is opened.

use consulta_core::ConsultaError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply all pending migrations to the given connection.
///
/// Applied versions are tracked in refinery's `refinery_schema_history` table.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), ConsultaError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| ConsultaError::Storage {
            source: Box::new(e),
        })?;
    tracing::debug!(
        applied = report.applied_migrations().len(),
        "database migrations complete"
    );
    Ok(())
}
