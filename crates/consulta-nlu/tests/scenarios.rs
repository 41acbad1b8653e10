// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end NLU scenarios with the remote stage unavailable.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use consulta_core::types::{Intent, NluStage, TimeRange};
use consulta_nlu::{NluPipeline, PatternAnalyzer, RemoteAnalyzer};
use consulta_test_utils::MockProvider;

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 22).unwrap()
}

fn pipeline_with_broken_remote() -> NluPipeline {
    NluPipeline::new(PatternAnalyzer::new(2000, 200)).with_remote(RemoteAnalyzer::new(
        Arc::new(MockProvider::failing()),
        Duration::from_secs(2),
        200,
    ))
}

#[tokio::test]
async fn book_at_8h15_without_history() {
    let outcome = pipeline_with_broken_remote()
        .analyze("book at 8h15", &[], today())
        .await;
    assert_eq!(outcome.stage, NluStage::Pattern);
    assert_eq!(outcome.result.input_slots, vec![at(8, 15)]);
    assert!(matches!(
        outcome.result.intent,
        Intent::Accepted | Intent::Checking
    ));
}

#[tokio::test]
async fn vietnamese_range_without_slots() {
    let outcome = pipeline_with_broken_remote()
        .analyze("từ 8h đến 10h", &[], today())
        .await;
    assert_eq!(
        outcome.result.time_range,
        TimeRange::new(at(8, 0), at(10, 0))
    );
    assert!(outcome.result.input_slots.is_empty());
}

#[tokio::test]
async fn degenerate_inputs_still_produce_results() {
    let pipeline = pipeline_with_broken_remote();
    let long = "x".repeat(1500);
    for text in ["", "   ", "🙏🙏🙏", long.as_str()] {
        let outcome = pipeline.analyze(text, &[], today()).await;
        assert!((1..=99).contains(&outcome.result.safety_score));
        assert!(outcome.result.input_slots.is_empty());
    }
}

#[tokio::test]
async fn weekday_and_time_together() {
    let outcome = pipeline_with_broken_remote()
        .analyze("Thứ 2 lúc 9h30 được không?", &[], today())
        .await;
    assert_eq!(outcome.result.intent, Intent::Checking);
    assert_eq!(outcome.result.input_slots, vec![at(9, 30)]);
    assert_eq!(outcome.result.date, NaiveDate::from_ymd_opt(2025, 1, 27));
    assert_eq!(outcome.result.date_expressions, vec!["thứ 2"]);
}
