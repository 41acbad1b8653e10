// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD and lifecycle updates.

use consulta_core::ConsultaError;
use rusqlite::{Row, params};

use crate::database::Database;
use crate::models::{BookingStatus, Conversation};
use crate::queries::{enum_col, now_timestamp};

const COLUMNS: &str =
    "id, user_id, title, context, bot_response_count, booking_status, created_at, updated_at";

fn row_to_conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        context: row.get(3)?,
        bot_response_count: row.get(4)?,
        booking_status: enum_col(row, 5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Insert a new conversation.
pub async fn create_conversation(
    db: &Database,
    conversation: &Conversation,
) -> Result<(), ConsultaError> {
    let c = conversation.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (id, user_id, title, context, bot_response_count, \
                 booking_status, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    c.id,
                    c.user_id,
                    c.title,
                    c.context,
                    c.bot_response_count,
                    c.booking_status.to_string(),
                    c.created_at,
                    c.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a conversation by ID.
pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, ConsultaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {COLUMNS} FROM conversations WHERE id = ?1");
            match conn.query_row(&sql, params![id], row_to_conversation) {
                Ok(c) => Ok(Some(c)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a user's conversations, newest first.
pub async fn list_conversations_for_user(
    db: &Database,
    user_id: &str,
) -> Result<Vec<Conversation>, ConsultaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {COLUMNS} FROM conversations WHERE user_id = ?1 \
                 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![user_id], row_to_conversation)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move an ongoing conversation into a terminal status.
///
/// The `WHERE booking_status = 'ongoing'` guard keeps the status monotonic:
/// a terminal conversation is never touched. Returns whether a row changed.
pub async fn transition_status(
    db: &Database,
    id: &str,
    next: BookingStatus,
) -> Result<bool, ConsultaError> {
    if !BookingStatus::Ongoing.can_transition_to(next) {
        return Err(ConsultaError::Internal(format!(
            "illegal booking status transition to {next}"
        )));
    }
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE conversations SET booking_status = ?1, updated_at = ?2 \
                 WHERE id = ?3 AND booking_status = 'ongoing'",
                params![next.to_string(), now_timestamp(), id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Add one to the bot reply counter and return the new value.
pub async fn increment_bot_response_count(db: &Database, id: &str) -> Result<u32, ConsultaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "UPDATE conversations \
                 SET bot_response_count = bot_response_count + 1, updated_at = ?1 \
                 WHERE id = ?2 RETURNING bot_response_count",
                params![now_timestamp(), id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set the title unless one is already present. Returns whether it was set.
pub async fn set_title_if_absent(
    db: &Database,
    id: &str,
    title: &str,
) -> Result<bool, ConsultaError> {
    let id = id.to_string();
    let title = title.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE conversations SET title = ?1, updated_at = ?2 \
                 WHERE id = ?3 AND title IS NULL",
                params![title, now_timestamp(), id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Permanently delete a conversation with its messages and analyses.
pub async fn delete_conversation(db: &Database, id: &str) -> Result<bool, ConsultaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::conversation;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let db = Database::open_in_memory().await.unwrap();
        create_conversation(&db, &conversation("c1", Some("u1")))
            .await
            .unwrap();
        let got = get_conversation(&db, "c1").await.unwrap().unwrap();
        assert_eq!(got.user_id.as_deref(), Some("u1"));
        assert_eq!(got.booking_status, BookingStatus::Ongoing);
        assert!(get_conversation(&db, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn terminal_status_never_reverts() {
        let db = Database::open_in_memory().await.unwrap();
        create_conversation(&db, &conversation("c1", None)).await.unwrap();

        assert!(
            transition_status(&db, "c1", BookingStatus::Completed)
                .await
                .unwrap()
        );
        // A second terminal move is a no-op.
        assert!(
            !transition_status(&db, "c1", BookingStatus::Abandoned)
                .await
                .unwrap()
        );
        // Moving back to ongoing is rejected outright.
        assert!(
            transition_status(&db, "c1", BookingStatus::Ongoing)
                .await
                .is_err()
        );

        let got = get_conversation(&db, "c1").await.unwrap().unwrap();
        assert_eq!(got.booking_status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn counter_increments_and_title_is_set_once() {
        let db = Database::open_in_memory().await.unwrap();
        create_conversation(&db, &conversation("c1", None)).await.unwrap();

        assert_eq!(increment_bot_response_count(&db, "c1").await.unwrap(), 1);
        assert_eq!(increment_bot_response_count(&db, "c1").await.unwrap(), 2);

        assert!(set_title_if_absent(&db, "c1", "first").await.unwrap());
        assert!(!set_title_if_absent(&db, "c1", "second").await.unwrap());
        let got = get_conversation(&db, "c1").await.unwrap().unwrap();
        assert_eq!(got.title.as_deref(), Some("first"));
        assert_eq!(got.bot_response_count, 2);
    }

    #[tokio::test]
    async fn list_for_user_filters_by_owner() {
        let db = Database::open_in_memory().await.unwrap();
        create_conversation(&db, &conversation("a", Some("u1"))).await.unwrap();
        create_conversation(&db, &conversation("b", Some("u2"))).await.unwrap();
        create_conversation(&db, &conversation("c", Some("u1"))).await.unwrap();

        let mine = list_conversations_for_user(&db, "u1").await.unwrap();
        let ids: Vec<_> = mine.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn delete_removes_conversation() {
        let db = Database::open_in_memory().await.unwrap();
        create_conversation(&db, &conversation("c1", None)).await.unwrap();
        assert!(delete_conversation(&db, "c1").await.unwrap());
        assert!(!delete_conversation(&db, "c1").await.unwrap());
    }
}
