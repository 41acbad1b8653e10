// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod analyses;
pub mod availability;
pub mod bookings;
pub mod conversations;
pub mod messages;

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use consulta_core::types::parse_hhmm;
use rusqlite::Row;
use rusqlite::types::Type;

fn conversion_err(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

/// Read an ISO `YYYY-MM-DD` column.
pub(crate) fn date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| conversion_err(idx, format!("bad date `{raw}`: {e}")))
}

/// Read a nullable ISO date column.
pub(crate) fn opt_date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|e| conversion_err(idx, format!("bad date `{s}`: {e}")))
    })
    .transpose()
}

/// Read an `HH:MM` column.
pub(crate) fn time_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(idx)?;
    parse_hhmm(&raw).ok_or_else(|| conversion_err(idx, format!("bad time `{raw}`")))
}

/// Read a text column holding a strum-serialized enum.
pub(crate) fn enum_col<T: FromStr>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|_| conversion_err(idx, format!("unknown value `{raw}`")))
}

/// Timestamp format shared by every `created_at` / `updated_at` column.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveTime};

    use crate::models::{AvailabilityProfile, BookingStatus, Conversation};

    pub fn conversation(id: &str, user: Option<&str>) -> Conversation {
        Conversation {
            id: id.to_string(),
            user_id: user.map(String::from),
            title: None,
            context: "consultant".to_string(),
            bot_response_count: 0,
            booking_status: BookingStatus::Ongoing,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    /// Monday 09:00-11:00 in 30 minute slots, four slots a day.
    pub fn monday_profile(name: &str) -> AvailabilityProfile {
        AvailabilityProfile {
            id: 0,
            lecturer_id: None,
            lecturer_name: name.to_string(),
            day_of_week: 0,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            slot_duration_minutes: Some(30),
            max_slots_per_day: 4,
            is_active: true,
            blocked_dates: Vec::new(),
            blocked_dates_version: 0,
            subject: Some("Career planning".to_string()),
            location: Some("Room 101".to_string()),
            notes: None,
        }
    }

    /// 2025-01-27, a Monday.
    pub fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 27).unwrap()
    }

    pub fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }
}
