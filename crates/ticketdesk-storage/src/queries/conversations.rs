// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation history queries.
//!
//! Each ticket's messages are stored as one JSON array, replaced wholesale on
//! every write.

use rusqlite::params;
use ticketdesk_core::{ConversationMap, ConversationMessage, TicketdeskError};

use crate::database::{Database, map_tr_err};

const UPSERT_SQL: &str = "INSERT INTO conversations (ticket_id, messages) VALUES (?1, ?2) \
     ON CONFLICT(ticket_id) DO UPDATE SET \
       messages = excluded.messages, \
       updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

fn encode(messages: &[ConversationMessage]) -> Result<String, TicketdeskError> {
    serde_json::to_string(messages).map_err(TicketdeskError::storage)
}

fn decode(blob: &str) -> Result<Vec<ConversationMessage>, TicketdeskError> {
    serde_json::from_str(blob).map_err(TicketdeskError::storage)
}

/// Replace the stored history for one ticket.
pub async fn upsert_conversation(
    db: &Database,
    ticket_id: &str,
    messages: &[ConversationMessage],
) -> Result<(), TicketdeskError> {
    let ticket_id = ticket_id.to_string();
    let blob = encode(messages)?;
    db.connection()
        .call(move |conn| {
            conn.execute(UPSERT_SQL, params![ticket_id, blob])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Replace several histories in one transaction.
pub async fn upsert_conversations(
    db: &Database,
    conversations: &ConversationMap,
) -> Result<(), TicketdeskError> {
    if conversations.is_empty() {
        return Ok(());
    }
    let rows = conversations
        .iter()
        .map(|(id, messages)| Ok::<_, TicketdeskError>((id.clone(), encode(messages)?)))
        .collect::<Result<Vec<_>, TicketdeskError>>()?;
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            for (ticket_id, blob) in &rows {
                tx.execute(UPSERT_SQL, params![ticket_id, blob])?;
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

/// The stored history for one ticket, if any.
pub async fn get_conversation(
    db: &Database,
    ticket_id: &str,
) -> Result<Option<Vec<ConversationMessage>>, TicketdeskError> {
    let ticket_id = ticket_id.to_string();
    let blob: Option<String> = db
        .connection()
        .call(move |conn| {
            match conn.query_row(
                "SELECT messages FROM conversations WHERE ticket_id = ?1",
                params![ticket_id],
                |row| row.get(0),
            ) {
                Ok(blob) => Ok(Some(blob)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;
    blob.as_deref().map(decode).transpose()
}

/// Histories for every listed ticket that has one.
///
/// IDs without a stored history are simply absent from the result. An empty
/// input never touches the database.
pub async fn get_conversations_by_ids(
    db: &Database,
    ticket_ids: &[String],
) -> Result<ConversationMap, TicketdeskError> {
    if ticket_ids.is_empty() {
        return Ok(ConversationMap::new());
    }
    let ids = ticket_ids.to_vec();
    let rows: Vec<(String, String)> = db
        .connection()
        .call(move |conn| {
            let placeholders = vec!["?"; ids.len()].join(", ");
            let mut stmt = conn.prepare(&format!(
                "SELECT ticket_id, messages FROM conversations WHERE ticket_id IN ({placeholders})"
            ))?;
            let rows = stmt.query_map(rusqlite::params_from_iter(ids.iter()), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    rows.into_iter()
        .map(|(id, blob)| Ok::<_, TicketdeskError>((id, decode(&blob)?)))
        .collect()
}

/// Delete every cached ticket and history.
pub async fn clear(db: &Database) -> Result<(), TicketdeskError> {
    db.connection()
        .call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "BEGIN; DELETE FROM conversations; DELETE FROM tickets; COMMIT;",
            )
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: i64, text: &str) -> ConversationMessage {
        ConversationMessage {
            id,
            sender: "Maria (Cliente)".to_string(),
            text: text.to_string(),
            timestamp: 1_700_000_000 + id,
            is_system_message: false,
            attachments: None,
        }
    }

    #[tokio::test]
    async fn history_round_trips() {
        let db = Database::open_in_memory().await.unwrap();
        let messages = vec![message(1, "oi"), message(2, "tudo bem?")];
        upsert_conversation(&db, "42", &messages).await.unwrap();
        assert_eq!(get_conversation(&db, "42").await.unwrap(), Some(messages));
        assert_eq!(get_conversation(&db, "43").await.unwrap(), None);
    }

    #[tokio::test]
    async fn history_is_replaced_not_appended() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_conversation(&db, "42", &[message(1, "a"), message(2, "b")])
            .await
            .unwrap();
        upsert_conversation(&db, "42", &[message(3, "c")]).await.unwrap();
        let stored = get_conversation(&db, "42").await.unwrap().unwrap();
        assert_eq!(stored, vec![message(3, "c")]);
    }

    #[tokio::test]
    async fn history_can_exist_without_a_ticket_row() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_conversation(&db, "orphan", &[message(1, "x")]).await.unwrap();
        assert!(get_conversation(&db, "orphan").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn lookup_by_ids_skips_missing_and_handles_empty_input() {
        let db = Database::open_in_memory().await.unwrap();
        let mut map = ConversationMap::new();
        map.insert("1".to_string(), vec![message(1, "a")]);
        map.insert("2".to_string(), vec![]);
        upsert_conversations(&db, &map).await.unwrap();

        let found = get_conversations_by_ids(
            &db,
            &["1".to_string(), "2".to_string(), "9".to_string()],
        )
        .await
        .unwrap();
        assert_eq!(found, map);

        assert!(get_conversations_by_ids(&db, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let db = Database::open_in_memory().await.unwrap();
        crate::queries::tickets::upsert_ticket(
            &db,
            &crate::queries::tickets::tests::ticket("1", 1),
        )
        .await
        .unwrap();
        upsert_conversation(&db, "1", &[message(1, "a")]).await.unwrap();

        clear(&db).await.unwrap();
        assert_eq!(crate::queries::tickets::count_tickets(&db).await.unwrap(), 0);
        assert!(get_conversation(&db, "1").await.unwrap().is_none());
    }
}
