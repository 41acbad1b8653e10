// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Availability profile store.
//!
//! Profiles are owned by scheduling administration. The engine only reads
//! them, apart from the idempotent blocked-date append made when a booking
//! fills a day.

use chrono::NaiveDate;
use consulta_core::ConsultaError;
use consulta_core::types::format_hhmm;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::database::Database;
use crate::models::AvailabilityProfile;
use crate::queries::{date_col, now_timestamp, time_col};

const COLUMNS: &str = "id, lecturer_id, lecturer_name, day_of_week, start_time, end_time, \
     slot_duration_minutes, max_slots_per_day, is_active, blocked_dates_version, \
     subject, location, notes";

/// Maps a profile row. `blocked_dates` is filled in separately.
fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<AvailabilityProfile> {
    Ok(AvailabilityProfile {
        id: row.get(0)?,
        lecturer_id: row.get(1)?,
        lecturer_name: row.get(2)?,
        day_of_week: row.get(3)?,
        start_time: time_col(row, 4)?,
        end_time: time_col(row, 5)?,
        slot_duration_minutes: row.get(6)?,
        max_slots_per_day: row.get(7)?,
        is_active: row.get(8)?,
        blocked_dates: Vec::new(),
        blocked_dates_version: row.get(9)?,
        subject: row.get(10)?,
        location: row.get(11)?,
        notes: row.get(12)?,
    })
}

fn blocked_dates(conn: &Connection, availability_id: i64) -> rusqlite::Result<Vec<NaiveDate>> {
    let mut stmt = conn.prepare_cached(
        "SELECT blocked_date FROM availability_blocked_dates
         WHERE availability_id = ?1 ORDER BY blocked_date",
    )?;
    let rows = stmt.query_map(params![availability_id], |row| date_col(row, 0))?;
    rows.collect()
}

fn with_blocked_dates(
    conn: &Connection,
    mut profile: AvailabilityProfile,
) -> rusqlite::Result<AvailabilityProfile> {
    profile.blocked_dates = blocked_dates(conn, profile.id)?;
    Ok(profile)
}

/// Load one profile with its blocked dates, inside an existing connection call.
pub(crate) fn load_profile(
    conn: &Connection,
    id: i64,
) -> rusqlite::Result<Option<AvailabilityProfile>> {
    let sql = format!("SELECT {COLUMNS} FROM availability_profiles WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_profile)
        .optional()?
        .map(|p| with_blocked_dates(conn, p))
        .transpose()
}

/// Append `date` to a profile's blocked dates.
///
/// A date already present is left alone. Each real append bumps
/// `blocked_dates_version`. Returns whether the date was newly added.
pub(crate) fn append_blocked_date(
    conn: &Connection,
    availability_id: i64,
    date: NaiveDate,
) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO availability_blocked_dates (availability_id, blocked_date, created_at)
         VALUES (?1, ?2, ?3)",
        params![availability_id, date.to_string(), now_timestamp()],
    )?;
    if inserted > 0 {
        conn.execute(
            "UPDATE availability_profiles
             SET blocked_dates_version = blocked_dates_version + 1, updated_at = ?1
             WHERE id = ?2",
            params![now_timestamp(), availability_id],
        )?;
    }
    Ok(inserted > 0)
}

/// Insert a profile and return its assigned id. `profile.id` is ignored.
pub async fn create_profile(
    db: &Database,
    profile: &AvailabilityProfile,
) -> Result<i64, ConsultaError> {
    if profile.day_of_week > 6 {
        return Err(ConsultaError::InvalidInput(format!(
            "day_of_week must be 0..=6, got {}",
            profile.day_of_week
        )));
    }
    if profile.start_time >= profile.end_time {
        return Err(ConsultaError::InvalidInput(
            "availability window must start before it ends".into(),
        ));
    }
    let p = profile.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let now = now_timestamp();
            tx.execute(
                "INSERT INTO availability_profiles (lecturer_id, lecturer_name, day_of_week,
                     start_time, end_time, slot_duration_minutes, max_slots_per_day, is_active,
                     subject, location, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
                params![
                    p.lecturer_id,
                    p.lecturer_name,
                    p.day_of_week,
                    format_hhmm(p.start_time),
                    format_hhmm(p.end_time),
                    p.slot_duration_minutes,
                    p.max_slots_per_day,
                    p.is_active,
                    p.subject,
                    p.location,
                    p.notes,
                    now,
                ],
            )?;
            let id = tx.last_insert_rowid();
            for date in &p.blocked_dates {
                tx.execute(
                    "INSERT OR IGNORE INTO availability_blocked_dates (availability_id, blocked_date)
                     VALUES (?1, ?2)",
                    params![id, date.to_string()],
                )?;
            }
            tx.commit()?;
            Ok(id)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a profile by ID.
pub async fn get_profile(
    db: &Database,
    id: i64,
) -> Result<Option<AvailabilityProfile>, ConsultaError> {
    db.connection()
        .call(move |conn| load_profile(conn, id))
        .await
        .map_err(crate::database::map_tr_err)
}

async fn list_where(
    db: &Database,
    filter: &'static str,
    day: Option<u8>,
) -> Result<Vec<AvailabilityProfile>, ConsultaError> {
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {COLUMNS} FROM availability_profiles WHERE {filter} \
                 ORDER BY start_time, id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let profiles = match day {
                Some(d) => stmt
                    .query_map(params![d], row_to_profile)?
                    .collect::<Result<Vec<_>, _>>()?,
                None => stmt
                    .query_map([], row_to_profile)?
                    .collect::<Result<Vec<_>, _>>()?,
            };
            profiles
                .into_iter()
                .map(|p| with_blocked_dates(conn, p))
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All active profiles, ordered by window start.
pub async fn list_active_profiles(db: &Database) -> Result<Vec<AvailabilityProfile>, ConsultaError> {
    list_where(db, "is_active = 1", None).await
}

/// Active profiles recurring on the given weekday (0 = Monday).
pub async fn list_profiles_for_day(
    db: &Database,
    day_of_week: u8,
) -> Result<Vec<AvailabilityProfile>, ConsultaError> {
    list_where(db, "is_active = 1 AND day_of_week = ?1", Some(day_of_week)).await
}

/// Activate or deactivate a profile. Returns whether the profile exists.
pub async fn set_profile_active(
    db: &Database,
    id: i64,
    active: bool,
) -> Result<bool, ConsultaError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE availability_profiles SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
                params![active, now_timestamp(), id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Administratively block a date. Idempotent.
pub async fn block_date(db: &Database, id: i64, date: NaiveDate) -> Result<bool, ConsultaError> {
    db.connection()
        .call(move |conn| append_blocked_date(conn, id, date))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Administratively lift a blocked date.
///
/// This is the only path that removes a blocked date; cancellations never do.
pub async fn unblock_date(db: &Database, id: i64, date: NaiveDate) -> Result<bool, ConsultaError> {
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM availability_blocked_dates
                 WHERE availability_id = ?1 AND blocked_date = ?2",
                params![id, date.to_string()],
            )?;
            if removed > 0 {
                conn.execute(
                    "UPDATE availability_profiles
                     SET blocked_dates_version = blocked_dates_version + 1, updated_at = ?1
                     WHERE id = ?2",
                    params![now_timestamp(), id],
                )?;
            }
            Ok(removed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{monday, monday_profile};

    #[tokio::test]
    async fn create_and_get_profile() {
        let db = Database::open_in_memory().await.unwrap();
        let mut profile = monday_profile("Dr. Lan");
        profile.blocked_dates = vec![monday()];
        let id = create_profile(&db, &profile).await.unwrap();

        let got = get_profile(&db, id).await.unwrap().unwrap();
        assert_eq!(got.id, id);
        assert_eq!(got.lecturer_name, "Dr. Lan");
        assert_eq!(got.start_time, profile.start_time);
        assert_eq!(got.slot_duration_minutes, Some(30));
        assert_eq!(got.blocked_dates, vec![monday()]);
        assert!(get_profile(&db, id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unset_duration_stays_unset() {
        let db = Database::open_in_memory().await.unwrap();
        let mut profile = monday_profile("Dr. Minh");
        profile.slot_duration_minutes = None;
        let id = create_profile(&db, &profile).await.unwrap();
        let got = get_profile(&db, id).await.unwrap().unwrap();
        assert_eq!(got.slot_duration_minutes, None);
        assert_eq!(got.slot_duration(), 30);
    }

    #[tokio::test]
    async fn inverted_window_is_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let mut profile = monday_profile("Dr. Lan");
        std::mem::swap(&mut profile.start_time, &mut profile.end_time);
        assert!(matches!(
            create_profile(&db, &profile).await,
            Err(ConsultaError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn day_listing_skips_inactive_and_other_days() {
        let db = Database::open_in_memory().await.unwrap();
        let a = create_profile(&db, &monday_profile("A")).await.unwrap();
        let b = create_profile(&db, &monday_profile("B")).await.unwrap();
        let mut tuesday = monday_profile("C");
        tuesday.day_of_week = 1;
        create_profile(&db, &tuesday).await.unwrap();

        set_profile_active(&db, b, false).await.unwrap();

        let monday_profiles = list_profiles_for_day(&db, 0).await.unwrap();
        assert_eq!(monday_profiles.len(), 1);
        assert_eq!(monday_profiles[0].id, a);
        assert_eq!(list_active_profiles(&db).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn blocked_date_append_is_idempotent_and_versioned() {
        let db = Database::open_in_memory().await.unwrap();
        let id = create_profile(&db, &monday_profile("A")).await.unwrap();

        assert!(block_date(&db, id, monday()).await.unwrap());
        assert!(!block_date(&db, id, monday()).await.unwrap());

        let got = get_profile(&db, id).await.unwrap().unwrap();
        assert_eq!(got.blocked_dates, vec![monday()]);
        assert_eq!(got.blocked_dates_version, 1);

        assert!(unblock_date(&db, id, monday()).await.unwrap());
        let got = get_profile(&db, id).await.unwrap().unwrap();
        assert!(got.blocked_dates.is_empty());
        assert_eq!(got.blocked_dates_version, 2);
    }
}
