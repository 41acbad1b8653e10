// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock moderation collaborator.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use consulta_core::ConsultaError;
use consulta_core::traits::{ModerationAdapter, PluginAdapter};
use consulta_core::types::{AdapterType, HealthStatus, ModerationVerdict, Verdict};

/// Returns scripted verdicts in order, then `clean` once the script runs out.
pub struct MockModeration {
    verdicts: Arc<Mutex<VecDeque<ModerationVerdict>>>,
    seen: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    failing: bool,
}

impl MockModeration {
    /// Everything is clean.
    pub fn new() -> Self {
        Self::with_verdicts(Vec::new())
    }

    pub fn with_verdicts(verdicts: Vec<ModerationVerdict>) -> Self {
        Self {
            verdicts: Arc::new(Mutex::new(VecDeque::from(verdicts))),
            seen: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            failing: false,
        }
    }

    /// Every call fails with a moderation error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// The next call returns `block` with `reason`.
    pub fn blocking(reason: &str) -> Self {
        Self::with_verdicts(vec![ModerationVerdict {
            verdict: Verdict::Block,
            reason: Some(reason.to_string()),
        }])
    }

    /// The next call returns `warn` with `reason`.
    pub fn warning(reason: &str) -> Self {
        Self::with_verdicts(vec![ModerationVerdict {
            verdict: Verdict::Warn,
            reason: Some(reason.to_string()),
        }])
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Texts submitted for moderation, oldest first.
    pub async fn seen(&self) -> Vec<String> {
        self.seen.lock().await.clone()
    }
}

impl Default for MockModeration {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockModeration {
    fn name(&self) -> &str {
        "mock-moderation"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Moderation
    }

    async fn health_check(&self) -> Result<HealthStatus, ConsultaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ConsultaError> {
        Ok(())
    }
}

#[async_trait]
impl ModerationAdapter for MockModeration {
    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, ConsultaError> {
        self.seen.lock().await.push(text.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(ConsultaError::Moderation {
                message: "mock moderation failure".into(),
            });
        }
        Ok(self
            .verdicts
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(ModerationVerdict::clean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_then_clean() {
        let moderation = MockModeration::blocking("spam");
        let first = moderation.moderate("buy now").await.unwrap();
        assert_eq!(first.verdict, Verdict::Block);
        assert_eq!(first.reason.as_deref(), Some("spam"));
        assert_eq!(
            moderation.moderate("hello").await.unwrap(),
            ModerationVerdict::clean()
        );
        assert_eq!(moderation.seen().await, vec!["buy now", "hello"]);
    }

    #[tokio::test]
    async fn failing_mode_errors_but_records() {
        let moderation = MockModeration::failing();
        assert!(moderation.moderate("hi").await.is_err());
        assert_eq!(moderation.seen().await, vec!["hi"]);
    }
}
