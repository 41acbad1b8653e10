// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message persistence. Messages are append-only.

use consulta_core::ConsultaError;
use rusqlite::{Row, params};

use crate::database::Database;
use crate::models::{Message, Sender};
use crate::queries::enum_col;

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        content: row.get(2)?,
        sender: enum_col(row, 3)?,
        is_appropriate: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Append a message to its conversation.
pub async fn insert_message(db: &Database, message: &Message) -> Result<(), ConsultaError> {
    let msg = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, conversation_id, content, sender, is_appropriate, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    msg.id,
                    msg.conversation_id,
                    msg.content,
                    msg.sender.to_string(),
                    msg.is_appropriate,
                    msg.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Messages of a conversation in arrival order.
///
/// With a `limit`, returns the most recent `limit` messages, still oldest first.
pub async fn get_messages(
    db: &Database,
    conversation_id: &str,
    limit: Option<u32>,
) -> Result<Vec<Message>, ConsultaError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, content, sender, is_appropriate, created_at FROM (
                     SELECT *, rowid AS seq FROM messages WHERE conversation_id = ?1
                     ORDER BY created_at DESC, seq DESC LIMIT ?2
                 ) ORDER BY created_at ASC, seq ASC",
            )?;
            // SQLite treats a negative LIMIT as unlimited.
            let limit = limit.map(i64::from).unwrap_or(-1);
            let rows = stmt.query_map(params![conversation_id, limit], row_to_message)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count stored messages from one sender.
pub async fn count_by_sender(
    db: &Database,
    conversation_id: &str,
    sender: Sender,
) -> Result<u32, ConsultaError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1 AND sender = ?2",
                params![conversation_id, sender.to_string()],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The earliest user message of a conversation, used for title derivation.
pub async fn first_user_message(
    db: &Database,
    conversation_id: &str,
) -> Result<Option<Message>, ConsultaError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, conversation_id, content, sender, is_appropriate, created_at
                 FROM messages WHERE conversation_id = ?1 AND sender = 'user'
                 ORDER BY created_at ASC, rowid ASC LIMIT 1",
                params![conversation_id],
                row_to_message,
            );
            match result {
                Ok(m) => Ok(Some(m)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::conversations::create_conversation;
    use crate::queries::test_support::conversation;

    fn message(id: &str, sender: Sender, content: &str, at: &str) -> Message {
        Message {
            id: id.to_string(),
            conversation_id: "c1".to_string(),
            content: content.to_string(),
            sender,
            is_appropriate: true,
            created_at: at.to_string(),
        }
    }

    async fn seeded() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        create_conversation(&db, &conversation("c1", None)).await.unwrap();
        let t = "2026-01-01T00:00:00.000Z";
        for (id, sender, text) in [
            ("m1", Sender::User, "hello"),
            ("m2", Sender::Bot, "hi"),
            ("m3", Sender::User, "book at 9h"),
            ("m4", Sender::Bot, "options"),
        ] {
            insert_message(&db, &message(id, sender, text, t)).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn messages_keep_arrival_order_with_equal_timestamps() {
        let db = seeded().await;
        let all = get_messages(&db, "c1", None).await.unwrap();
        let ids: Vec<_> = all.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3", "m4"]);
    }

    #[tokio::test]
    async fn limit_returns_latest_oldest_first() {
        let db = seeded().await;
        let tail = get_messages(&db, "c1", Some(2)).await.unwrap();
        let ids: Vec<_> = tail.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m4"]);
    }

    #[tokio::test]
    async fn counts_and_first_user_message() {
        let db = seeded().await;
        assert_eq!(count_by_sender(&db, "c1", Sender::User).await.unwrap(), 2);
        assert_eq!(count_by_sender(&db, "c1", Sender::Bot).await.unwrap(), 2);
        let first = first_user_message(&db, "c1").await.unwrap().unwrap();
        assert_eq!(first.content, "hello");
    }

    #[tokio::test]
    async fn message_for_missing_conversation_is_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let result = insert_message(
            &db,
            &message("m1", Sender::User, "x", "2026-01-01T00:00:00.000Z"),
        )
        .await;
        assert!(result.is_err());
    }
}
