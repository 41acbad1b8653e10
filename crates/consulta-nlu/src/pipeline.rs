// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The three-stage NLU chain: remote model, then patterns, then the safe default.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use consulta_config::model::NluConfig;
use consulta_core::traits::ProviderAdapter;
use consulta_core::types::{HistoryEntry, NluResult, NluStage};
use tracing::{debug, warn};

use crate::patterns::PatternAnalyzer;
use crate::remote::RemoteAnalyzer;

/// Result of one pass through the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct NluOutcome {
    pub result: NluResult,
    pub stage: NluStage,
    pub elapsed: Duration,
}

/// Stateless across calls; everything conversational arrives as `history`.
pub struct NluPipeline {
    remote: Option<RemoteAnalyzer>,
    pattern: PatternAnalyzer,
}

impl NluPipeline {
    /// A pattern-only pipeline.
    pub fn new(pattern: PatternAnalyzer) -> Self {
        Self {
            remote: None,
            pattern,
        }
    }

    /// Put a remote stage in front of the pattern stage.
    pub fn with_remote(mut self, remote: RemoteAnalyzer) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Build from configuration. The remote stage is used only when it is
    /// enabled and a provider is supplied.
    pub fn from_config(config: &NluConfig, provider: Option<Arc<dyn ProviderAdapter>>) -> Self {
        let pipeline = Self::new(PatternAnalyzer::new(
            config.max_input_chars,
            config.reasoning_max_chars,
        ));
        match provider {
            Some(provider) if config.remote_enabled => pipeline.with_remote(RemoteAnalyzer::new(
                provider,
                Duration::from_secs(config.remote_timeout_secs),
                config.reasoning_max_chars,
            )),
            _ => pipeline,
        }
    }

    /// Analyze one user message. Never fails.
    pub async fn analyze(
        &self,
        text: &str,
        history: &[HistoryEntry],
        today: NaiveDate,
    ) -> NluOutcome {
        let started = Instant::now();
        let (result, stage) = self.run(text, history, today).await;
        let elapsed = started.elapsed();
        debug!(
            stage = %stage,
            intent = %result.intent,
            safety_score = result.safety_score,
            slots = result.input_slots.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "NLU stage selected"
        );
        NluOutcome {
            result,
            stage,
            elapsed,
        }
    }

    async fn run(
        &self,
        text: &str,
        history: &[HistoryEntry],
        today: NaiveDate,
    ) -> (NluResult, NluStage) {
        if let Some(remote) = &self.remote {
            match remote.analyze(text, history, today).await {
                Ok(result) => return (result, NluStage::Remote),
                Err(e) => warn!(error = %e, "remote classification failed, using patterns"),
            }
        }
        match self.pattern.analyze(text, today) {
            Ok(result) => (result, NluStage::Pattern),
            Err(e) => {
                warn!(error = %e, "pattern stage failed, using safe default");
                (NluResult::safe_default(), NluStage::Fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use consulta_core::types::Intent;
    use consulta_test_utils::MockProvider;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 22).unwrap()
    }

    fn pattern_only() -> NluPipeline {
        NluPipeline::new(PatternAnalyzer::new(2000, 200))
    }

    #[tokio::test]
    async fn remote_result_wins_when_valid() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            r#"{"intent": "C", "safety_score": 42, "input_slots": ["10:00"]}"#.to_string(),
        ]));
        let pipeline = pattern_only().with_remote(RemoteAnalyzer::new(
            provider,
            Duration::from_secs(5),
            200,
        ));
        let outcome = pipeline.analyze("10h?", &[], today()).await;
        assert_eq!(outcome.stage, NluStage::Remote);
        assert_eq!(outcome.result.safety_score, 42);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn malformed_remote_reply_falls_to_patterns() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            "Sure! The user wants 8:15.".to_string(),
        ]));
        let pipeline = pattern_only().with_remote(RemoteAnalyzer::new(
            provider,
            Duration::from_secs(5),
            200,
        ));
        let outcome = pipeline.analyze("book at 8h15", &[], today()).await;
        assert_eq!(outcome.stage, NluStage::Pattern);
        assert_eq!(
            outcome.result.input_slots,
            vec![NaiveTime::from_hms_opt(8, 15, 0).unwrap()]
        );
        assert!(logs_contain("remote classification failed"));
    }

    #[tokio::test]
    async fn provider_error_falls_to_patterns() {
        let provider = Arc::new(MockProvider::failing());
        let pipeline = pattern_only().with_remote(RemoteAnalyzer::new(
            provider,
            Duration::from_secs(5),
            200,
        ));
        let outcome = pipeline.analyze("từ 8h đến 10h", &[], today()).await;
        assert_eq!(outcome.stage, NluStage::Pattern);
        assert!(outcome.result.time_range.is_some());
        assert!(outcome.result.input_slots.is_empty());
    }

    #[tokio::test]
    async fn refused_input_gets_the_safe_default() {
        let pipeline = NluPipeline::new(PatternAnalyzer::new(5, 200));
        let outcome = pipeline.analyze("a long message", &[], today()).await;
        assert_eq!(outcome.stage, NluStage::Fallback);
        assert_eq!(outcome.result, NluResult::safe_default());
    }

    #[tokio::test]
    async fn disabled_remote_is_not_built() {
        let provider: Arc<dyn ProviderAdapter> = Arc::new(MockProvider::failing());
        let config = NluConfig {
            remote_enabled: false,
            ..NluConfig::default()
        };
        let pipeline = NluPipeline::from_config(&config, Some(provider));
        assert!(pipeline.remote.is_none());
        let outcome = pipeline.analyze("yes", &[], today()).await;
        assert_eq!(outcome.result.intent, Intent::Accepted);
    }

    fn well_formed(r: &NluResult) -> bool {
        (1..=99).contains(&r.safety_score)
            && r.time_range.is_none_or(|t| t.start() < t.end())
            && r.input_slots.iter().enumerate().all(|(i, t)| !r.input_slots[..i].contains(t))
    }

    #[tokio::test]
    async fn non_ascii_digits_are_not_clock_times() {
        for text in ["book at １２３４", "book at १२३४", "từ ８h đến １０h", "２７/０１"] {
            let outcome = pattern_only().analyze(text, &[], today()).await;
            assert_eq!(outcome.stage, NluStage::Pattern, "{text}");
            assert!(outcome.result.input_slots.is_empty(), "{text}");
            assert!(outcome.result.time_range.is_none(), "{text}");
            assert!(outcome.result.date.is_none(), "{text}");
        }
    }

    proptest! {
        #[test]
        fn never_fails_on_arbitrary_text(text in any::<String>()) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let outcome = rt.block_on(pattern_only().analyze(&text, &[], today()));
            prop_assert!(well_formed(&outcome.result));
        }

        #[test]
        fn never_fails_on_odd_shapes(
            text in prop_oneof![
                Just(String::new()),
                "[ \t\n]{1,20}",
                "[😀🎉🙏]{1,10}",
                "[0-9h: ]{1,40}",
                "book at [０-９]{3,4}",
                "[०-९]{1,4}(h|:)?[०-९]{0,2}",
                "[０-９]{1,2}/[０-９]{1,2}",
                ".{1000,1200}",
            ]
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let outcome = rt.block_on(pattern_only().analyze(&text, &[], today()));
            prop_assert!(well_formed(&outcome.result));
        }
    }
}
