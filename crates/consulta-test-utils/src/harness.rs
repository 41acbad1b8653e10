// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a temp-dir SQLite store, seeded availability
//! profiles and mock collaborators. Engine-level tests wire these parts
//! into the engine themselves.

use std::sync::Arc;

use chrono::NaiveTime;
use consulta_config::model::{ConsultaConfig, StorageConfig};
use consulta_core::types::AvailabilityProfile;
use consulta_core::{ConsultaError, StorageAdapter};
use consulta_storage::SqliteStorage;

use crate::mock_moderation::MockModeration;
use crate::mock_notifier::MockNotifier;
use crate::mock_provider::MockProvider;

/// An active profile on `day_of_week` between two `HH:MM` bounds, in 30
/// minute slots with room for ten bookings a day.
///
/// Panics on malformed bounds; meant for test fixtures only.
pub fn profile(lecturer: &str, day_of_week: u8, start: &str, end: &str) -> AvailabilityProfile {
    let parse = |s: &str| {
        NaiveTime::parse_from_str(s, "%H:%M")
            .unwrap_or_else(|e| panic!("bad fixture time `{s}`: {e}"))
    };
    AvailabilityProfile {
        id: 0,
        lecturer_id: None,
        lecturer_name: lecturer.to_string(),
        day_of_week,
        start_time: parse(start),
        end_time: parse(end),
        slot_duration_minutes: Some(30),
        max_slots_per_day: 10,
        is_active: true,
        blocked_dates: Vec::new(),
        blocked_dates_version: 0,
        subject: None,
        location: None,
        notes: None,
    }
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    provider: Option<MockProvider>,
    moderation: Option<MockModeration>,
    notifier: Option<MockNotifier>,
    profiles: Vec<AvailabilityProfile>,
    config: ConsultaConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            provider: None,
            moderation: None,
            notifier: None,
            profiles: Vec::new(),
            config: ConsultaConfig::default(),
        }
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Use a fully configured provider instead of a scripted queue.
    pub fn with_provider(mut self, provider: MockProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_moderation(mut self, moderation: MockModeration) -> Self {
        self.moderation = Some(moderation);
        self
    }

    pub fn with_notifier(mut self, notifier: MockNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Seed an availability profile. Ids are assigned in insertion order.
    pub fn with_profile(mut self, profile: AvailabilityProfile) -> Self {
        self.profiles.push(profile);
        self
    }

    /// Start from this configuration. Its storage section is replaced.
    pub fn with_config(mut self, config: ConsultaConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the test harness, creating the database and seeding profiles.
    pub async fn build(self) -> Result<TestHarness, ConsultaError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| ConsultaError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        let storage = SqliteStorage::new(storage_config.clone());
        storage.initialize().await?;

        let mut profile_ids = Vec::with_capacity(self.profiles.len());
        for profile in &self.profiles {
            profile_ids.push(storage.create_profile(profile).await?);
        }

        let provider = self
            .provider
            .unwrap_or_else(|| MockProvider::with_responses(self.responses));

        let config = ConsultaConfig {
            storage: storage_config,
            ..self.config
        };

        Ok(TestHarness {
            provider: Arc::new(provider),
            moderation: Arc::new(self.moderation.unwrap_or_default()),
            notifier: Arc::new(self.notifier.unwrap_or_default()),
            storage: Arc::new(storage),
            profile_ids,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock collaborators and temp storage.
pub struct TestHarness {
    /// The mock language-model provider.
    pub provider: Arc<MockProvider>,
    pub moderation: Arc<MockModeration>,
    pub notifier: Arc<MockNotifier>,
    /// SQLite storage (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    /// Ids of the seeded profiles, in the order they were added.
    pub profile_ids: Vec<i64>,
    /// Configuration pointing at the temp database.
    pub config: ConsultaConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }
}
