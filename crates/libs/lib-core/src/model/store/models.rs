use chrono::{DateTime, Utc};
use shared::{ChatMessage, SenderType, SessionInfo, SessionStatus, SessionSummary};
use sqlx::FromRow;

use crate::error::AppError;
use crate::model::takeover::ControlMode;

/// Chat session entity representing a complete row of `chat_sessions`.
#[derive(Debug, Clone, FromRow)]
pub struct ChatSession {
    pub id: String,
    pub merchant_id: String,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_token: String,
    pub status: String,
    pub ai_enabled: bool,
    pub merchant_took_over: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Parsed status. Anything unexpected is treated as closed so it cannot receive messages.
    pub fn status(&self) -> SessionStatus {
        self.status.parse().unwrap_or(SessionStatus::Closed)
    }

    pub fn is_active(&self) -> bool {
        self.status() == SessionStatus::Active
    }

    pub fn control_mode(&self) -> ControlMode {
        ControlMode::from_flags(self.ai_enabled, self.merchant_took_over)
    }

    /// What the customer widget receives in `session:created`.
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            customer_token: Some(self.customer_token.clone()),
            ai_enabled: self.ai_enabled,
            merchant_took_over: self.merchant_took_over,
        }
    }

    /// Dashboard list row. The customer token is never exposed to merchants.
    pub fn summary(&self, last_message: Option<String>) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            merchant_id: self.merchant_id.clone(),
            customer_id: self.customer_id.clone(),
            customer_name: self.customer_name.clone(),
            customer_email: self.customer_email.clone(),
            status: self.status(),
            ai_enabled: self.ai_enabled,
            merchant_took_over: self.merchant_took_over,
            last_message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A session together with the content of its latest message.
#[derive(Debug, Clone, FromRow)]
pub struct SessionWithPreview {
    #[sqlx(flatten)]
    pub session: ChatSession,
    pub last_message: Option<String>,
}

/// Data structure for creating a new session.
///
/// New sessions always start active with AI replies on and no takeover.
#[derive(Debug, Clone)]
pub struct SessionForCreate {
    pub merchant_id: String,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_token: String,
}

/// Message entity representing a row of `chat_messages`.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub seq: i64,
    pub id: String,
    pub session_id: String,
    pub sender_id: Option<String>,
    pub sender_type: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl MessageRow {
    /// Convert into the wire representation.
    pub fn into_message(self) -> Result<ChatMessage, AppError> {
        let sender_type = self
            .sender_type
            .parse::<SenderType>()
            .map_err(AppError::Internal)?;

        Ok(ChatMessage {
            id: self.id,
            session_id: self.session_id,
            sender_id: self.sender_id,
            sender_type,
            content: self.content,
            created_at: self.created_at,
        })
    }
}

/// Data structure for appending a message. `content` must already be sanitized.
#[derive(Debug, Clone)]
pub struct MessageForCreate {
    pub session_id: String,
    pub sender_id: Option<String>,
    pub sender_type: SenderType,
    pub content: String,
}

impl MessageForCreate {
    pub fn new(session_id: &str, sender_id: Option<String>, sender_type: SenderType, content: String) -> Self {
        Self {
            session_id: session_id.to_string(),
            sender_id,
            sender_type,
            content,
        }
    }
}
