//! # Message Repository
//!
//! Append-only storage for chat messages. There is no update or delete path; history is
//! always returned in insertion (`seq`) order.

use super::models::{MessageForCreate, MessageRow};
use super::DbPool;
use lib_utils::now_utc;
use sqlx::query_as;
use uuid::Uuid;

/// Message repository for database operations.
pub struct MessageRepository;

impl MessageRepository {
    /// Append a message and bump the owning session's `updated_at` in one transaction.
    pub async fn append(pool: &DbPool, data: MessageForCreate) -> Result<MessageRow, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = now_utc();

        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO chat_messages (id, session_id, sender_id, sender_type, content, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id)
        .bind(&data.session_id)
        .bind(&data.sender_id)
        .bind(data.sender_type.as_str())
        .bind(&data.content)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE chat_sessions SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(&data.session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(MessageRow {
            seq: result.last_insert_rowid(),
            id,
            session_id: data.session_id,
            sender_id: data.sender_id,
            sender_type: data.sender_type.as_str().to_string(),
            content: data.content,
            created_at: now,
        })
    }

    /// Full history of a session in persistence order.
    pub async fn list_for_session(pool: &DbPool, session_id: &str) -> Result<Vec<MessageRow>, sqlx::Error> {
        query_as::<_, MessageRow>(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY seq ASC"
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
    }

    /// The last `limit` messages of a session, oldest first.
    pub async fn recent_for_session(
        pool: &DbPool,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<MessageRow>, sqlx::Error> {
        let mut rows = query_as::<_, MessageRow>(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY seq DESC LIMIT ?"
        )
        .bind(session_id)
        .bind(limit as i64)
        .fetch_all(pool)
        .await?;

        rows.reverse();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::session_repository::SessionRepository;
    use crate::model::store::models::SessionForCreate;
    use crate::model::store::test_support::setup_test_db;
    use shared::SenderType;

    async fn session_id(pool: &DbPool) -> String {
        SessionRepository::create(pool, SessionForCreate {
            merchant_id: "m1".to_string(),
            customer_id: Some("c-1".to_string()),
            customer_name: "Alice".to_string(),
            customer_email: None,
            customer_token: "tok".to_string(),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_history_keeps_insertion_order() {
        let pool = setup_test_db().await;
        let sid = session_id(&pool).await;

        let turns = [
            (SenderType::Customer, Some("c-1"), "Hi"),
            (SenderType::Ai, None, "Hello! How can I help?"),
            (SenderType::Merchant, Some("m1"), "I'll take it from here"),
            (SenderType::Customer, Some("c-1"), "Thanks"),
        ];
        for (sender_type, sender_id, content) in turns {
            MessageRepository::append(
                &pool,
                MessageForCreate::new(&sid, sender_id.map(str::to_string), sender_type, content.to_string()),
            )
            .await
            .unwrap();
        }

        let history: Vec<_> = MessageRepository::list_for_session(&pool, &sid)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.into_message().unwrap())
            .collect();

        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["Hi", "Hello! How can I help?", "I'll take it from here", "Thanks"]);
        assert_eq!(history[1].sender_type, SenderType::Ai);
        assert!(history[1].sender_id.is_none());
    }

    #[tokio::test]
    async fn test_recent_returns_tail_oldest_first() {
        let pool = setup_test_db().await;
        let sid = session_id(&pool).await;
        for n in 1..=5 {
            MessageRepository::append(
                &pool,
                MessageForCreate::new(&sid, Some("c-1".to_string()), SenderType::Customer, format!("msg {n}")),
            )
            .await
            .unwrap();
        }

        let recent = MessageRepository::recent_for_session(&pool, &sid, 2).await.unwrap();

        let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["msg 4", "msg 5"]);
    }

    #[tokio::test]
    async fn test_append_rejects_unknown_session() {
        let pool = setup_test_db().await;

        let result = MessageRepository::append(
            &pool,
            MessageForCreate::new("missing", None, SenderType::Ai, "orphan".to_string()),
        )
        .await;

        assert!(result.is_err());
    }
}
