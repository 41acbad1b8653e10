// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use consulta_core::ConsultaError;
use tracing::debug;

use crate::migrations;

/// Convert a tokio-rusqlite error into `ConsultaError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ConsultaError {
    ConsultaError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the single SQLite connection.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database file, apply pragmas, and run
    /// pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, ConsultaError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConsultaError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ConsultaError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Open a private in-memory database with the full schema.
    pub async fn open_in_memory() -> Result<Self, ConsultaError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| ConsultaError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), ConsultaError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    // journal_mode returns a row, so it cannot go through execute_batch.
                    let _mode: String =
                        conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
                }
                conn.execute_batch(
                    "PRAGMA foreign_keys = ON;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA busy_timeout = 5000;",
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        // Migration errors are not rusqlite errors, so they travel back as the
        // closure's value rather than its error.
        self.conn
            .call(|conn| -> Result<Result<(), ConsultaError>, rusqlite::Error> {
                Ok(migrations::run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)?
    }

    /// The shared connection. Every query module goes through it.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), ConsultaError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(|e| ConsultaError::Storage {
            source: Box::new(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("consulta.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        assert!(path.exists());

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        for expected in [
            "availability_blocked_dates",
            "availability_profiles",
            "booking_analyses",
            "booking_slots",
            "conversations",
            "messages",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let path = path.to_str().unwrap();
        Database::open(path, true).await.unwrap().close().await.unwrap();
        Database::open(path, true).await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = Database::open_in_memory().await.unwrap();
        let result = db
            .connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "INSERT INTO messages (id, conversation_id, content, sender) \
                     VALUES ('m1', 'missing', 'hi', 'user')",
                    [],
                )
            })
            .await;
        assert!(result.is_err());
    }
}
