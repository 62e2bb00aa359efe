//! # Session Repository
//!
//! Provides database access for chat sessions.
//!
//! Sessions are never deleted. Closing a session only flips its status so its history
//! stays queryable.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{SessionRepository, SessionForCreate, create_pool};
//! # async fn example() -> anyhow::Result<()> {
//! let pool = create_pool("sqlite::memory:").await?;
//!
//! let session = SessionRepository::create(&pool, SessionForCreate {
//!     merchant_id: "m1".to_string(),
//!     customer_id: Some("c-42".to_string()),
//!     customer_name: "Alice".to_string(),
//!     customer_email: None,
//!     customer_token: "q8Xr".to_string(),
//! }).await?;
//!
//! let resumed = SessionRepository::find_resumable(&pool, "m1", "q8Xr").await?;
//! assert_eq!(resumed.map(|s| s.id), Some(session.id));
//! # Ok(())
//! # }
//! ```

use super::models::{ChatSession, SessionForCreate, SessionWithPreview};
use super::DbPool;
use lib_utils::now_utc;
use shared::SessionStatus;
use sqlx::query_as;
use uuid::Uuid;

/// Session repository for database operations.
pub struct SessionRepository;

impl SessionRepository {
    /// Create a new active session with AI replies enabled and no takeover.
    pub async fn create(pool: &DbPool, data: SessionForCreate) -> Result<ChatSession, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = now_utc();

        sqlx::query(
            r#"
            INSERT INTO chat_sessions
                (id, merchant_id, customer_id, customer_name, customer_email, customer_token,
                 status, ai_enabled, merchant_took_over, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, 0, ?8, ?8)
            "#
        )
        .bind(&id)
        .bind(&data.merchant_id)
        .bind(&data.customer_id)
        .bind(&data.customer_name)
        .bind(&data.customer_email)
        .bind(&data.customer_token)
        .bind(SessionStatus::Active.as_str())
        .bind(now)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, &id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a session by its ID.
    pub async fn find_by_id(pool: &DbPool, id: &str) -> Result<Option<ChatSession>, sqlx::Error> {
        query_as::<_, ChatSession>("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the active session a returning customer should be re-attached to.
    ///
    /// Tokens only resolve within the merchant they were issued for.
    pub async fn find_resumable(
        pool: &DbPool,
        merchant_id: &str,
        customer_token: &str,
    ) -> Result<Option<ChatSession>, sqlx::Error> {
        query_as::<_, ChatSession>(
            r#"
            SELECT * FROM chat_sessions
            WHERE merchant_id = ? AND customer_token = ? AND status = 'active'
            ORDER BY updated_at DESC
            LIMIT 1
            "#
        )
        .bind(merchant_id)
        .bind(customer_token)
        .fetch_optional(pool)
        .await
    }

    /// Whether this merchant ever issued `customer_token`, including on closed sessions.
    pub async fn token_known(
        pool: &DbPool,
        merchant_id: &str,
        customer_token: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM chat_sessions WHERE merchant_id = ? AND customer_token = ?)
            "#
        )
        .bind(merchant_id)
        .bind(customer_token)
        .fetch_one(pool)
        .await
    }

    /// Active sessions of a merchant, most recently updated first, with a last-message preview.
    pub async fn list_active_for_merchant(
        pool: &DbPool,
        merchant_id: &str,
    ) -> Result<Vec<SessionWithPreview>, sqlx::Error> {
        query_as::<_, SessionWithPreview>(
            r#"
            SELECT s.*,
                (SELECT m.content FROM chat_messages m
                 WHERE m.session_id = s.id
                 ORDER BY m.seq DESC
                 LIMIT 1) AS last_message
            FROM chat_sessions s
            WHERE s.merchant_id = ? AND s.status = 'active'
            ORDER BY s.updated_at DESC
            "#
        )
        .bind(merchant_id)
        .fetch_all(pool)
        .await
    }

    /// Set `merchant_took_over`.
    ///
    /// Returns `true` only when the stored value actually changed, so two concurrent
    /// takeovers produce exactly one transition.
    pub async fn set_merchant_took_over(
        pool: &DbPool,
        id: &str,
        took_over: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE chat_sessions
            SET merchant_took_over = ?1, updated_at = ?2
            WHERE id = ?3 AND merchant_took_over <> ?1
            "#
        )
        .bind(took_over)
        .bind(now_utc())
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Close an active session. Returns `false` if it was already closed.
    pub async fn close(pool: &DbPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE chat_sessions
            SET status = 'closed', updated_at = ?
            WHERE id = ? AND status = 'active'
            "#
        )
        .bind(now_utc())
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
