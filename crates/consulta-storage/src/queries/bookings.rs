// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The booking ledger.
//!
//! [`create_booking`] is the only code path that writes a booking slot. It
//! runs its re-check, capacity check, insert, recount and blocked-date append
//! as a single `IMMEDIATE` transaction inside one connection call, so the
//! whole sequence either commits or leaves no trace. The partial unique index
//! `idx_booking_slots_live` backs it at the storage level.

use chrono::NaiveDate;
use consulta_core::ConsultaError;
use consulta_core::types::format_hhmm;
use rusqlite::{Connection, Row, TransactionBehavior, params};
use tracing::info;

use crate::database::Database;
use crate::models::{BookingOutcome, BookingRequest, BookingSlot, BookingSlotStatus, OccupiedSlot};
use crate::queries::availability::{append_blocked_date, load_profile};
use crate::queries::{date_col, enum_col, now_timestamp, time_col};

const COLUMNS: &str = "id, availability_id, user_id, booking_date, booking_time, \
     duration_minutes, status, subject, notes, created_at";

const LIVE: &str = "status IN ('pending', 'confirmed')";

fn row_to_slot(row: &Row<'_>) -> rusqlite::Result<BookingSlot> {
    Ok(BookingSlot {
        id: row.get(0)?,
        availability_id: row.get(1)?,
        user_id: row.get(2)?,
        booking_date: date_col(row, 3)?,
        booking_time: time_col(row, 4)?,
        duration_minutes: row.get(5)?,
        status: enum_col(row, 6)?,
        subject: row.get(7)?,
        notes: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn slot_is_live(conn: &Connection, id: i64, date: &str, time: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM booking_slots \
             WHERE availability_id = ?1 AND booking_date = ?2 AND booking_time = ?3 AND {LIVE})"
        ),
        params![id, date, time],
        |row| row.get(0),
    )
}

fn live_count_for_day(conn: &Connection, id: i64, date: &str) -> rusqlite::Result<u32> {
    conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM booking_slots \
             WHERE availability_id = ?1 AND booking_date = ?2 AND {LIVE}"
        ),
        params![id, date],
        |row| row.get(0),
    )
}

/// Reserve a slot.
///
/// Fails with [`ConsultaError::SlotTaken`] when the slot is already live,
/// when the day is at capacity or blocked, or when the unique index rejects
/// a concurrent duplicate. Requests for a missing or inactive profile fail
/// with `ProfileNotFound` / `SlotUnavailable`. On success the row is in the
/// ledger and, if it filled the day, the date is on the profile's blocked
/// list; on failure neither is.
pub async fn create_booking(
    db: &Database,
    request: &BookingRequest,
) -> Result<BookingOutcome, ConsultaError> {
    if !request.status.occupies() {
        return Err(ConsultaError::InvalidInput(
            "a new booking must be pending or confirmed".into(),
        ));
    }
    let req = request.clone();
    let id = uuid::Uuid::new_v4().to_string();

    // Business failures come back as the closure's value so the transaction
    // is dropped (rolled back) before they surface.
    let outcome = db
        .connection()
        .call(
            move |conn| -> Result<Result<BookingOutcome, ConsultaError>, rusqlite::Error> {
                let date = req.date.to_string();
                let time = format_hhmm(req.time);
                let taken = || ConsultaError::SlotTaken {
                    availability_id: req.availability_id,
                    date: date.clone(),
                    time: time.clone(),
                };

                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

                let Some(profile) = load_profile(&tx, req.availability_id)? else {
                    return Ok(Err(ConsultaError::ProfileNotFound(req.availability_id)));
                };
                if !profile.is_active {
                    return Ok(Err(ConsultaError::SlotUnavailable {
                        availability_id: req.availability_id,
                        date: date.clone(),
                        time: time.clone(),
                    }));
                }
                if profile.is_blocked(req.date)
                    || slot_is_live(&tx, req.availability_id, &date, &time)?
                    || live_count_for_day(&tx, req.availability_id, &date)?
                        >= profile.max_slots_per_day
                {
                    return Ok(Err(taken()));
                }

                let created_at = now_timestamp();
                let insert = tx.execute(
                    "INSERT INTO booking_slots (id, availability_id, user_id, booking_date,
                         booking_time, duration_minutes, status, subject, notes, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
                    params![
                        id,
                        req.availability_id,
                        req.user_id,
                        date,
                        time,
                        req.duration_minutes,
                        req.status.to_string(),
                        req.subject,
                        req.notes,
                        created_at,
                    ],
                );
                match insert {
                    Ok(_) => {}
                    Err(e) if is_unique_violation(&e) => return Ok(Err(taken())),
                    Err(e) => return Err(e),
                }

                let count = live_count_for_day(&tx, req.availability_id, &date)?;
                let day_blocked = count >= profile.max_slots_per_day
                    && append_blocked_date(&tx, req.availability_id, req.date)?;

                tx.commit()?;

                Ok(Ok(BookingOutcome {
                    slot: BookingSlot {
                        id,
                        availability_id: req.availability_id,
                        user_id: req.user_id,
                        booking_date: req.date,
                        booking_time: req.time,
                        duration_minutes: req.duration_minutes,
                        status: req.status,
                        subject: req.subject,
                        notes: req.notes,
                        created_at,
                    },
                    day_blocked,
                }))
            },
        )
        .await
        .map_err(crate::database::map_tr_err)??;

    info!(
        booking_id = %outcome.slot.id,
        availability_id = outcome.slot.availability_id,
        date = %outcome.slot.booking_date,
        time = %format_hhmm(outcome.slot.booking_time),
        status = %outcome.slot.status,
        "booking created"
    );
    if outcome.day_blocked {
        info!(
            availability_id = outcome.slot.availability_id,
            date = %outcome.slot.booking_date,
            "day reached capacity and was blocked"
        );
    }
    Ok(outcome)
}

/// All live (pending or confirmed) slots on a date, across every profile.
pub async fn occupied_slots(
    db: &Database,
    date: NaiveDate,
) -> Result<Vec<OccupiedSlot>, ConsultaError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT availability_id, booking_date, booking_time FROM booking_slots \
                 WHERE booking_date = ?1 AND {LIVE} ORDER BY booking_time"
            ))?;
            let rows = stmt.query_map(params![date.to_string()], |row| {
                Ok(OccupiedSlot {
                    availability_id: row.get(0)?,
                    date: date_col(row, 1)?,
                    time: time_col(row, 2)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a booking by ID.
pub async fn get_booking(db: &Database, id: &str) -> Result<Option<BookingSlot>, ConsultaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {COLUMNS} FROM booking_slots WHERE id = ?1");
            match conn.query_row(&sql, params![id], row_to_slot) {
                Ok(slot) => Ok(Some(slot)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// A user's bookings, soonest first.
pub async fn list_bookings_for_user(
    db: &Database,
    user_id: &str,
) -> Result<Vec<BookingSlot>, ConsultaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {COLUMNS} FROM booking_slots WHERE user_id = ?1 \
                 ORDER BY booking_date, booking_time"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![user_id], row_to_slot)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

async fn set_status_from(
    db: &Database,
    id: &str,
    from: &'static [BookingSlotStatus],
    to: BookingSlotStatus,
) -> Result<bool, ConsultaError> {
    let id = id.to_string();
    let from_list = from
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ");
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE booking_slots SET status = ?1, updated_at = ?2 \
                     WHERE id = ?3 AND status IN ({from_list})"
                ),
                params![to.to_string(), now_timestamp(), id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Cancel a live booking, freeing its slot.
///
/// A date that was blocked because the day filled up stays blocked.
pub async fn cancel_booking(db: &Database, id: &str) -> Result<bool, ConsultaError> {
    set_status_from(
        db,
        id,
        &[BookingSlotStatus::Pending, BookingSlotStatus::Confirmed],
        BookingSlotStatus::Cancelled,
    )
    .await
}

/// Promote a pending booking to confirmed (two-phase mode).
pub async fn confirm_pending_booking(db: &Database, id: &str) -> Result<bool, ConsultaError> {
    set_status_from(
        db,
        id,
        &[BookingSlotStatus::Pending],
        BookingSlotStatus::Confirmed,
    )
    .await
}
