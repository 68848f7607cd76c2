// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat history. Rows are only ever appended.

use roamer_core::types::{ChatMessage, NewChatMessage};
use roamer_core::{ReservationId, RoamerError, UserId};
use rusqlite::params;

use crate::database::Database;

const MESSAGE_COLUMNS: &str =
    "id, from_user_id, to_user_id, reservation_id, content, is_support, created_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
    Ok(ChatMessage {
        id: row.get(0)?,
        from_user_id: UserId(row.get(1)?),
        to_user_id: row.get::<_, Option<i64>>(2)?.map(UserId),
        reservation_id: row.get::<_, Option<i64>>(3)?.map(ReservationId),
        content: row.get(4)?,
        is_support: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Archive a message. Returns its id.
pub async fn insert_chat_message(
    db: &Database,
    message: &NewChatMessage,
) -> Result<i64, RoamerError> {
    let message = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (from_user_id, to_user_id, reservation_id, content, is_support)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    message.from_user_id.0,
                    message.to_user_id.map(|u| u.0),
                    message.reservation_id.map(|r| r.0),
                    message.content,
                    message.is_support,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Messages exchanged under one reservation, oldest first.
pub async fn list_reservation_messages(
    db: &Database,
    reservation: ReservationId,
) -> Result<Vec<ChatMessage>, RoamerError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE reservation_id = ?1 ORDER BY id"
            ))?;
            let rows = stmt.query_map(params![reservation.0], row_to_message)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Support messages sent by or to `user`, oldest first.
pub async fn list_support_messages(
    db: &Database,
    user: UserId,
) -> Result<Vec<ChatMessage>, RoamerError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE is_support = 1 AND (from_user_id = ?1 OR to_user_id = ?1)
                 ORDER BY id"
            ))?;
            let rows = stmt.query_map(params![user.0], row_to_message)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::reservations::create_reservation;
    use crate::queries::test_support::{insert, location, setup_db, user};
    use roamer_core::Role;

    #[tokio::test]
    async fn reservation_chat_is_listed_in_order() {
        let (db, _dir) = setup_db().await;
        let rita = user(&db, 1, "Rita", Role::Requester).await;
        let pat = user(&db, 2, "Pat", Role::Provider).await;
        let loc = insert(&db, location("Inn", 0.0, 0.0, Some(pat.id))).await;
        let res = create_reservation(&db, rita.id, loc, "").await.unwrap();

        for (from, to, text) in [(rita.id, pat.id, "hello"), (pat.id, rita.id, "hi")] {
            insert_chat_message(
                &db,
                &NewChatMessage {
                    from_user_id: from,
                    to_user_id: Some(to),
                    reservation_id: Some(res),
                    content: text.to_string(),
                    is_support: false,
                },
            )
            .await
            .unwrap();
        }

        let history = list_reservation_messages(&db, res).await.unwrap();
        let texts: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(texts, ["hello", "hi"]);
        assert_eq!(history[0].to_user_id, Some(pat.id));
        assert!(!history[0].is_support);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn support_history_covers_both_directions() {
        let (db, _dir) = setup_db().await;
        let rita = user(&db, 1, "Rita", Role::Requester).await;
        let sam = user(&db, 2, "Sam", Role::Support).await;

        let request = NewChatMessage {
            from_user_id: rita.id,
            to_user_id: None,
            reservation_id: None,
            content: "help".to_string(),
            is_support: true,
        };
        insert_chat_message(&db, &request).await.unwrap();
        insert_chat_message(
            &db,
            &NewChatMessage {
                from_user_id: sam.id,
                to_user_id: Some(rita.id),
                content: "on it".to_string(),
                ..request.clone()
            },
        )
        .await
        .unwrap();

        let history = list_support_messages(&db, rita.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].to_user_id, None);
        assert_eq!(history[0].reservation_id, None);
        assert!(history.iter().all(|m| m.is_support));

        assert_eq!(list_support_messages(&db, sam.id).await.unwrap().len(), 1);
        db.close().await.unwrap();
    }
}
