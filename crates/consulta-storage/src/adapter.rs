// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::OnceCell;
use tracing::debug;

use consulta_config::model::StorageConfig;
use consulta_core::{AdapterType, ConsultaError, HealthStatus, PluginAdapter, StorageAdapter};

use crate::database::Database;
use crate::models::{
    AvailabilityProfile, BookingAnalysis, BookingOutcome, BookingRequest, BookingSlot,
    BookingStatus, Conversation, Message, OccupiedSlot, Sender,
};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is opened by [`StorageAdapter::initialize`]; every other
/// call fails until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: StorageAdapter::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already-open database. The adapter counts as initialized.
    pub fn from_database(db: Database) -> Self {
        Self {
            config: StorageConfig::default(),
            db: OnceCell::new_with(Some(db)),
        }
    }

    fn db(&self) -> Result<&Database, ConsultaError> {
        self.db.get().ok_or_else(|| ConsultaError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(db: &Database) -> Result<(), ConsultaError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }

    // --- Conversations ---

    pub async fn create_conversation(&self, c: &Conversation) -> Result<(), ConsultaError> {
        queries::conversations::create_conversation(self.db()?, c).await
    }

    pub async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, ConsultaError> {
        queries::conversations::get_conversation(self.db()?, id).await
    }

    pub async fn list_conversations_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Conversation>, ConsultaError> {
        queries::conversations::list_conversations_for_user(self.db()?, user_id).await
    }

    pub async fn transition_status(
        &self,
        id: &str,
        next: BookingStatus,
    ) -> Result<bool, ConsultaError> {
        queries::conversations::transition_status(self.db()?, id, next).await
    }

    pub async fn increment_bot_response_count(&self, id: &str) -> Result<u32, ConsultaError> {
        queries::conversations::increment_bot_response_count(self.db()?, id).await
    }

    pub async fn set_title_if_absent(&self, id: &str, title: &str) -> Result<bool, ConsultaError> {
        queries::conversations::set_title_if_absent(self.db()?, id, title).await
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<bool, ConsultaError> {
        queries::conversations::delete_conversation(self.db()?, id).await
    }

    // --- Messages ---

    pub async fn insert_message(&self, message: &Message) -> Result<(), ConsultaError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    pub async fn get_messages(
        &self,
        conversation_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Message>, ConsultaError> {
        queries::messages::get_messages(self.db()?, conversation_id, limit).await
    }

    pub async fn count_messages_by_sender(
        &self,
        conversation_id: &str,
        sender: Sender,
    ) -> Result<u32, ConsultaError> {
        queries::messages::count_by_sender(self.db()?, conversation_id, sender).await
    }

    pub async fn first_user_message(
        &self,
        conversation_id: &str,
    ) -> Result<Option<Message>, ConsultaError> {
        queries::messages::first_user_message(self.db()?, conversation_id).await
    }

    // --- Availability ---

    pub async fn create_profile(&self, profile: &AvailabilityProfile) -> Result<i64, ConsultaError> {
        queries::availability::create_profile(self.db()?, profile).await
    }

    pub async fn get_profile(&self, id: i64) -> Result<Option<AvailabilityProfile>, ConsultaError> {
        queries::availability::get_profile(self.db()?, id).await
    }

    pub async fn list_active_profiles(&self) -> Result<Vec<AvailabilityProfile>, ConsultaError> {
        queries::availability::list_active_profiles(self.db()?).await
    }

    pub async fn list_profiles_for_day(
        &self,
        day_of_week: u8,
    ) -> Result<Vec<AvailabilityProfile>, ConsultaError> {
        queries::availability::list_profiles_for_day(self.db()?, day_of_week).await
    }

    pub async fn set_profile_active(&self, id: i64, active: bool) -> Result<bool, ConsultaError> {
        queries::availability::set_profile_active(self.db()?, id, active).await
    }

    pub async fn block_date(&self, id: i64, date: NaiveDate) -> Result<bool, ConsultaError> {
        queries::availability::block_date(self.db()?, id, date).await
    }

    pub async fn unblock_date(&self, id: i64, date: NaiveDate) -> Result<bool, ConsultaError> {
        queries::availability::unblock_date(self.db()?, id, date).await
    }

    // --- Bookings ---

    pub async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingOutcome, ConsultaError> {
        queries::bookings::create_booking(self.db()?, request).await
    }

    pub async fn occupied_slots(&self, date: NaiveDate) -> Result<Vec<OccupiedSlot>, ConsultaError> {
        queries::bookings::occupied_slots(self.db()?, date).await
    }

    pub async fn get_booking(&self, id: &str) -> Result<Option<BookingSlot>, ConsultaError> {
        queries::bookings::get_booking(self.db()?, id).await
    }

    pub async fn list_bookings_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<BookingSlot>, ConsultaError> {
        queries::bookings::list_bookings_for_user(self.db()?, user_id).await
    }

    pub async fn cancel_booking(&self, id: &str) -> Result<bool, ConsultaError> {
        queries::bookings::cancel_booking(self.db()?, id).await
    }

    pub async fn confirm_pending_booking(&self, id: &str) -> Result<bool, ConsultaError> {
        queries::bookings::confirm_pending_booking(self.db()?, id).await
    }

    // --- Analyses ---

    pub async fn insert_analysis(&self, analysis: &BookingAnalysis) -> Result<(), ConsultaError> {
        queries::analyses::insert_analysis(self.db()?, analysis).await
    }

    pub async fn list_analyses(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<BookingAnalysis>, ConsultaError> {
        queries::analyses::list_analyses_for_conversation(self.db()?, conversation_id).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ConsultaError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ConsultaError> {
        if let Some(db) = self.db.get() {
            Self::checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ConsultaError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ConsultaError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ConsultaError> {
        Self::checkpoint(self.db()?).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{at, conversation, monday, monday_profile};
    use consulta_core::types::BookingSlotStatus;
    use tempfile::tempdir;

    fn storage_in(dir: &tempfile::TempDir) -> SqliteStorage {
        SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("t.db").to_string_lossy().into_owned(),
            wal_mode: true,
        })
    }

    #[tokio::test]
    async fn calls_before_initialize_fail() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir);
        assert!(storage.get_conversation("c1").await.is_err());
        assert!(storage.health_check().await.is_err());
        // Shutdown of an unopened adapter is a no-op.
        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn initialize_twice_fails() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir);
        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn delegates_to_queries() {
        let storage = SqliteStorage::from_database(Database::open_in_memory().await.unwrap());
        storage
            .create_conversation(&conversation("c1", Some("u1")))
            .await
            .unwrap();
        let profile_id = storage
            .create_profile(&monday_profile("Dr. Lan"))
            .await
            .unwrap();

        let outcome = storage
            .create_booking(&BookingRequest {
                availability_id: profile_id,
                user_id: Some("u1".into()),
                date: monday(),
                time: at(9, 30),
                subject: "Career planning".into(),
                duration_minutes: 30,
                notes: None,
                status: BookingSlotStatus::Confirmed,
            })
            .await
            .unwrap();
        assert!(!outcome.day_blocked);

        let occupied = storage.occupied_slots(monday()).await.unwrap();
        assert_eq!(occupied.len(), 1);
        assert_eq!(occupied[0].time, at(9, 30));
        assert_eq!(storage.list_bookings_for_user("u1").await.unwrap().len(), 1);
        assert_eq!(storage.list_conversations_for_user("u1").await.unwrap().len(), 1);
    }
}
