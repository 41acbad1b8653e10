// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `consulta profile` command implementation.

use chrono::{NaiveDate, NaiveTime};
use colored::Colorize;
use consulta_core::ConsultaError;
use consulta_core::types::{AvailabilityProfile, format_hhmm};
use consulta_storage::SqliteStorage;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Accepts an index (0 = Monday), an English name or prefix ("mon"), or the
/// Vietnamese forms "thứ 2".."thứ 7", "t2".."t7" and "chủ nhật"/"cn".
pub fn parse_weekday(s: &str) -> Result<u8, String> {
    let lower = s.trim().to_lowercase();
    if let Ok(index) = lower.parse::<u8>()
        && index < 7
    {
        return Ok(index);
    }
    if lower.len() >= 3
        && let Some(index) = WEEKDAYS
            .iter()
            .position(|name| name.to_lowercase().starts_with(&lower))
    {
        return Ok(index as u8);
    }
    if lower == "chủ nhật" || lower == "cn" {
        return Ok(6);
    }
    let number = lower
        .strip_prefix("thứ")
        .or_else(|| lower.strip_prefix('t'))
        .map(str::trim)
        .and_then(|n| n.parse::<u8>().ok());
    match number {
        Some(n @ 2..=7) => Ok(n - 2),
        _ => Err(format!("unknown weekday `{s}`")),
    }
}

/// Fields of a profile to insert.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub lecturer: String,
    pub day_of_week: u8,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub slot_duration_minutes: Option<u32>,
    pub max_slots_per_day: u32,
    pub subject: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl NewProfile {
    fn into_profile(self) -> Result<AvailabilityProfile, ConsultaError> {
        if self.lecturer.trim().is_empty() {
            return Err(ConsultaError::InvalidInput("lecturer name is empty".into()));
        }
        if self.start >= self.end {
            return Err(ConsultaError::InvalidInput(format!(
                "window start {} must be before end {}",
                format_hhmm(self.start),
                format_hhmm(self.end)
            )));
        }
        if self.slot_duration_minutes == Some(0) || self.max_slots_per_day == 0 {
            return Err(ConsultaError::InvalidInput(
                "slot duration and daily capacity must be positive".into(),
            ));
        }
        Ok(AvailabilityProfile {
            id: 0,
            lecturer_id: None,
            lecturer_name: self.lecturer.trim().to_string(),
            day_of_week: self.day_of_week,
            start_time: self.start,
            end_time: self.end,
            slot_duration_minutes: self.slot_duration_minutes,
            max_slots_per_day: self.max_slots_per_day,
            is_active: true,
            blocked_dates: Vec::new(),
            blocked_dates_version: 0,
            subject: self.subject,
            location: self.location,
            notes: self.notes,
        })
    }
}

pub async fn add(storage: &SqliteStorage, new: NewProfile) -> Result<(), ConsultaError> {
    let profile = new.into_profile()?;
    let id = storage.create_profile(&profile).await?;
    println!("{} profile {id}: {}", "added".green(), describe(&profile));
    Ok(())
}

pub async fn list(storage: &SqliteStorage) -> Result<(), ConsultaError> {
    let profiles = storage.list_active_profiles().await?;
    if profiles.is_empty() {
        println!("no active profiles");
    }
    for profile in &profiles {
        println!("{:>4}  {}", profile.id.to_string().bold(), describe(profile));
        if !profile.blocked_dates.is_empty() {
            let dates: Vec<String> = profile.blocked_dates.iter().map(|d| d.to_string()).collect();
            println!("      blocked: {}", dates.join(", ").dimmed());
        }
    }
    Ok(())
}

pub async fn block(
    storage: &SqliteStorage,
    id: i64,
    date: NaiveDate,
    blocked: bool,
) -> Result<(), ConsultaError> {
    if storage.get_profile(id).await?.is_none() {
        return Err(ConsultaError::ProfileNotFound(id));
    }
    let changed = if blocked {
        storage.block_date(id, date).await?
    } else {
        storage.unblock_date(id, date).await?
    };
    let verb = if blocked { "blocked" } else { "unblocked" };
    if changed {
        println!("{verb} {date} on profile {id}");
    } else {
        println!("{date} was already {verb} on profile {id}");
    }
    Ok(())
}

pub async fn disable(storage: &SqliteStorage, id: i64) -> Result<(), ConsultaError> {
    if !storage.set_profile_active(id, false).await? {
        return Err(ConsultaError::ProfileNotFound(id));
    }
    println!("profile {id} disabled");
    Ok(())
}

/// One-line summary, e.g. `Dr. Lan, Monday 09:00-11:00, 30 min slots, 10/day`.
pub fn describe(profile: &AvailabilityProfile) -> String {
    let day = WEEKDAYS
        .get(usize::from(profile.day_of_week))
        .copied()
        .unwrap_or("?");
    format!(
        "{}, {} {}-{}, {} min slots, {}/day ({} @ {})",
        profile.lecturer_name,
        day,
        format_hhmm(profile.start_time),
        format_hhmm(profile.end_time),
        profile.slot_duration(),
        profile.max_slots_per_day,
        profile.subject_or_default(),
        profile.location_or_default(),
    )
}
