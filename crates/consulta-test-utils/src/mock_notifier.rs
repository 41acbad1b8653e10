// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notification collaborator that records every confirmation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use consulta_core::ConsultaError;
use consulta_core::traits::{NotificationAdapter, PluginAdapter};
use consulta_core::types::{AdapterType, BookingDetails, HealthStatus};

pub struct MockNotifier {
    sent: Arc<Mutex<Vec<(String, BookingDetails)>>>,
    delivers: bool,
}

impl MockNotifier {
    /// Every send succeeds.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            delivers: true,
        }
    }

    /// Every send is recorded and reported as failed.
    pub fn failing() -> Self {
        Self {
            delivers: false,
            ..Self::new()
        }
    }

    /// (recipient, details) pairs handed to this notifier, oldest first.
    pub async fn sent(&self) -> Vec<(String, BookingDetails)> {
        self.sent.lock().await.clone()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockNotifier {
    fn name(&self) -> &str {
        "mock-notifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notification
    }

    async fn health_check(&self) -> Result<HealthStatus, ConsultaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ConsultaError> {
        Ok(())
    }
}

#[async_trait]
impl NotificationAdapter for MockNotifier {
    async fn send_confirmation(&self, recipient: &str, details: &BookingDetails) -> bool {
        self.sent
            .lock()
            .await
            .push((recipient.to_string(), details.clone()));
        self.delivers
    }
}
