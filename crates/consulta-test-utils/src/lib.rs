// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Consulta integration tests.
//!
//! Provides mock collaborators and a temp-database harness for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Scripted language-model provider with failure and delay modes
//! - [`MockModeration`] - Scripted moderation verdicts
//! - [`MockNotifier`] - Records confirmation sends
//! - [`TestHarness`] - Temp-dir SQLite store with seeded availability profiles

pub mod harness;
pub mod mock_moderation;
pub mod mock_notifier;
pub mod mock_provider;

pub use harness::{TestHarness, profile};
pub use mock_moderation::MockModeration;
pub use mock_notifier::MockNotifier;
pub use mock_provider::MockProvider;
