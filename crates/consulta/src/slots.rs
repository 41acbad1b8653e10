// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `consulta slots` command implementation.

use chrono::NaiveDate;
use colored::Colorize;
use consulta_config::model::ConsultaConfig;
use consulta_core::ConsultaError;
use consulta_core::StorageAdapter;
use consulta_core::types::{BookingOption, format_hhmm, weekday_index};
use consulta_schedule::{Occupancy, default_target_date, find_alternatives};
use consulta_storage::SqliteStorage;

pub async fn run_slots(config: ConsultaConfig, date: Option<NaiveDate>) -> Result<(), ConsultaError> {
    let storage = crate::open_storage(&config).await?;
    let date = date.unwrap_or_else(|| default_target_date(chrono::Local::now().date_naive()));
    let free = free_slots(&storage, date).await;
    storage.close().await?;
    let free = free?;

    println!("{}", format!("Free slots on {date}").bold());
    if free.is_empty() {
        println!("  none");
    }
    for option in &free {
        println!("  {}", slot_line(option));
    }
    Ok(())
}

/// Every free slot of every active profile on `date`, earliest first.
pub async fn free_slots(
    storage: &SqliteStorage,
    date: NaiveDate,
) -> Result<Vec<BookingOption>, ConsultaError> {
    let profiles = storage.list_profiles_for_day(weekday_index(date)).await?;
    let occupancy: Occupancy = storage.occupied_slots(date).await?.into_iter().collect();
    Ok(find_alternatives(&profiles, &occupancy, None, date, usize::MAX))
}

pub fn slot_line(option: &BookingOption) -> String {
    format!(
        "{}  {} ({}, {}, {} min) [profile {}]",
        format_hhmm(option.time),
        option.lecturer_name,
        option.subject,
        option.location,
        option.duration_minutes,
        option.availability_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use consulta_core::types::{BookingRequest, BookingSlotStatus};
    use consulta_test_utils::{TestHarness, profile};

    #[tokio::test]
    async fn booked_slots_are_not_free() {
        let harness = TestHarness::builder()
            .with_profile(profile("Dr. Lan", 0, "09:00", "10:00"))
            .build()
            .await
            .unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 1, 27).unwrap();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();

        harness
            .storage
            .create_booking(&BookingRequest {
                availability_id: harness.profile_ids[0],
                user_id: None,
                date: monday,
                time: nine,
                subject: "General".into(),
                duration_minutes: 30,
                notes: None,
                status: BookingSlotStatus::Confirmed,
            })
            .await
            .unwrap();

        let free = free_slots(&harness.storage, monday).await.unwrap();
        assert_eq!(free.len(), 1);
        assert_eq!(slot_line(&free[0]), format!(
            "09:30  Dr. Lan (General, TBD, 30 min) [profile {}]",
            harness.profile_ids[0]
        ));
    }
}
