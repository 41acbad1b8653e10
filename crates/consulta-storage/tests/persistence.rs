// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durability tests: data written through one `SqliteStorage` is visible
//! after closing it and opening the same file again.

use chrono::{NaiveDate, NaiveTime};
use consulta_config::model::StorageConfig;
use consulta_core::StorageAdapter;
use consulta_core::types::{
    AvailabilityProfile, BookingRequest, BookingSlotStatus, BookingStatus, Conversation, Message,
    Sender,
};
use consulta_storage::{SqliteStorage, now_timestamp};

fn config(dir: &tempfile::TempDir) -> StorageConfig {
    StorageConfig {
        database_path: dir.path().join("consulta.db").to_string_lossy().into_owned(),
        wal_mode: true,
    }
}

async fn open(dir: &tempfile::TempDir) -> SqliteStorage {
    let storage = SqliteStorage::new(config(dir));
    storage.initialize().await.unwrap();
    storage
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 27).unwrap()
}

fn profile() -> AvailabilityProfile {
    AvailabilityProfile {
        id: 0,
        lecturer_id: Some("lec-1".into()),
        lecturer_name: "Dr. Lan".into(),
        day_of_week: 0,
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        slot_duration_minutes: Some(30),
        max_slots_per_day: 1,
        is_active: true,
        blocked_dates: Vec::new(),
        blocked_dates_version: 0,
        subject: Some("Thesis".into()),
        location: Some("Room 101".into()),
        notes: None,
    }
}

#[tokio::test]
async fn conversation_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let storage = open(&dir).await;
    let now = now_timestamp();
    storage
        .create_conversation(&Conversation {
            id: "c1".into(),
            user_id: Some("u1".into()),
            title: None,
            context: "consultant".into(),
            bot_response_count: 0,
            booking_status: BookingStatus::Ongoing,
            created_at: now.clone(),
            updated_at: now.clone(),
        })
        .await
        .unwrap();
    for (id, sender) in [("m1", Sender::User), ("m2", Sender::Bot)] {
        storage
            .insert_message(&Message {
                id: id.into(),
                conversation_id: "c1".into(),
                content: format!("{id} text"),
                sender,
                is_appropriate: true,
                created_at: now.clone(),
            })
            .await
            .unwrap();
    }
    storage.increment_bot_response_count("c1").await.unwrap();
    storage.set_title_if_absent("c1", "m1 text").await.unwrap();
    storage
        .transition_status("c1", BookingStatus::Completed)
        .await
        .unwrap();
    storage.close().await.unwrap();
    drop(storage);

    let storage = open(&dir).await;
    let conversation = storage.get_conversation("c1").await.unwrap().unwrap();
    assert_eq!(conversation.bot_response_count, 1);
    assert_eq!(conversation.title.as_deref(), Some("m1 text"));
    assert_eq!(conversation.booking_status, BookingStatus::Completed);

    let messages = storage.get_messages("c1", None).await.unwrap();
    let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["m1", "m2"]);
    storage.close().await.unwrap();
}

#[tokio::test]
async fn bookings_and_blocked_dates_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let storage = open(&dir).await;
    let profile_id = storage.create_profile(&profile()).await.unwrap();
    let outcome = storage
        .create_booking(&BookingRequest {
            availability_id: profile_id,
            user_id: Some("u1".into()),
            date: monday(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            subject: "Thesis".into(),
            duration_minutes: 30,
            notes: None,
            status: BookingSlotStatus::Confirmed,
        })
        .await
        .unwrap();
    // Capacity 1 means the first booking fills the day.
    assert!(outcome.day_blocked);
    storage.close().await.unwrap();
    drop(storage);

    let storage = open(&dir).await;
    let stored = storage.get_profile(profile_id).await.unwrap().unwrap();
    assert!(stored.is_blocked(monday()));
    assert_eq!(stored.blocked_dates_version, 1);

    let occupied = storage.occupied_slots(monday()).await.unwrap();
    assert_eq!(occupied.len(), 1);
    let booking = storage
        .get_booking(&outcome.slot.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(booking.status, BookingSlotStatus::Confirmed);
    storage.close().await.unwrap();
}
