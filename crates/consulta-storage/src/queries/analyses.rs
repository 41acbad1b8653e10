// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking analysis audit trail.

use chrono::NaiveTime;
use consulta_core::ConsultaError;
use consulta_core::types::{NluResult, TimeRange, format_hhmm, parse_hhmm};
use rusqlite::types::Type;
use rusqlite::{Row, params};

use crate::database::Database;
use crate::models::BookingAnalysis;
use crate::queries::{enum_col, opt_date_col};

fn json_err(idx: usize, e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn times_to_json(times: &[NaiveTime]) -> String {
    let strings: Vec<String> = times.iter().map(|t| format_hhmm(*t)).collect();
    serde_json::Value::from(strings).to_string()
}

fn row_to_analysis(row: &Row<'_>) -> rusqlite::Result<BookingAnalysis> {
    let slots_raw: String = row.get(7)?;
    let slots: Vec<String> = serde_json::from_str(&slots_raw).map_err(|e| json_err(7, e))?;
    let range_raw: Option<String> = row.get(8)?;
    let time_range = match range_raw {
        Some(raw) => Some(serde_json::from_str::<TimeRange>(&raw).map_err(|e| json_err(8, e))?),
        None => None,
    };
    let expressions_raw: String = row.get(10)?;
    let processing_time_ms: i64 = row.get(13)?;

    Ok(BookingAnalysis {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        message_id: row.get(2)?,
        result: NluResult {
            intent: enum_col(row, 3)?,
            safety_score: row.get(4)?,
            is_rejection: row.get(5)?,
            is_confirmation: row.get(6)?,
            input_slots: slots.iter().filter_map(|s| parse_hhmm(s)).collect(),
            time_range,
            date: opt_date_col(row, 9)?,
            date_expressions: serde_json::from_str(&expressions_raw)
                .map_err(|e| json_err(10, e))?,
            reasoning: row.get(11)?,
        },
        stage: enum_col(row, 12)?,
        processing_time_ms: processing_time_ms.max(0) as u64,
        analysis_version: row.get(14)?,
        created_at: row.get(15)?,
    })
}

/// Record the analysis of one user message.
pub async fn insert_analysis(
    db: &Database,
    analysis: &BookingAnalysis,
) -> Result<(), ConsultaError> {
    let a = analysis.clone();
    db.connection()
        .call(move |conn| {
            let r = &a.result;
            let time_range = r
                .time_range
                .map(|range| serde_json::Value::from(Vec::<String>::from(range)).to_string());
            conn.execute(
                "INSERT INTO booking_analyses (id, conversation_id, message_id, intent,
                     safety_score, is_rejection, is_confirmation, input_slots, time_range,
                     target_date, date_expressions, reasoning, stage, processing_time_ms,
                     analysis_version, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    a.id,
                    a.conversation_id,
                    a.message_id,
                    r.intent.to_string(),
                    r.safety_score,
                    r.is_rejection,
                    r.is_confirmation,
                    times_to_json(&r.input_slots),
                    time_range,
                    r.date.map(|d| d.to_string()),
                    serde_json::Value::from(r.date_expressions.clone()).to_string(),
                    r.reasoning,
                    a.stage.to_string(),
                    i64::try_from(a.processing_time_ms).unwrap_or(i64::MAX),
                    a.analysis_version,
                    a.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Analyses of a conversation in the order they were recorded.
pub async fn list_analyses_for_conversation(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<BookingAnalysis>, ConsultaError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, message_id, intent, safety_score, is_rejection,
                        is_confirmation, input_slots, time_range, target_date, date_expressions,
                        reasoning, stage, processing_time_ms, analysis_version, created_at
                 FROM booking_analyses WHERE conversation_id = ?1
                 ORDER BY created_at, rowid",
            )?;
            let rows = stmt.query_map(params![conversation_id], row_to_analysis)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
