//! # Merchant Session Handlers
//!
//! HTTP endpoints for the merchant dashboard.
//!
//! ## Endpoints
//!
//! - `GET  /api/chat/sessions` - Active sessions of the authenticated merchant
//! - `GET  /api/chat/sessions/{session_id}/messages` - Ordered history of one session
//! - `POST /api/chat/sessions/{session_id}/close` - Close a session
//! - `GET  /api/chat/merchants/{merchant_id}/presence` - Whether a merchant is online (public)

use crate::chat::handlers::utils::extract_merchant_id;
use crate::chat::state::ChatAppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use lib_core::AppError;
use shared::{MessageHistoryResponse, PresenceResponse, SessionListResponse};
use std::sync::Arc;
use tracing::info;

/// **Route**: `GET /api/chat/sessions`
pub async fn list_sessions(
    State(app_state): State<Arc<ChatAppState>>,
    headers: HeaderMap,
) -> Result<Json<SessionListResponse>, AppError> {
    let merchant_id = extract_merchant_id(&headers, None, &app_state.config)?;

    let sessions = app_state.gateway.list_sessions(&merchant_id).await?;
    info!(merchant_id = %merchant_id, count = sessions.len(), "[CHAT] Listed sessions");

    Ok(Json(SessionListResponse { sessions }))
}

/// **Route**: `GET /api/chat/sessions/{session_id}/messages`
///
/// 404 for unknown sessions, 403 for sessions of another merchant.
pub async fn get_session_messages(
    Path(session_id): Path<String>,
    State(app_state): State<Arc<ChatAppState>>,
    headers: HeaderMap,
) -> Result<Json<MessageHistoryResponse>, AppError> {
    let merchant_id = extract_merchant_id(&headers, None, &app_state.config)?;

    let messages = app_state.gateway.session_history(&merchant_id, &session_id).await?;

    Ok(Json(MessageHistoryResponse { session_id, messages }))
}

/// **Route**: `POST /api/chat/sessions/{session_id}/close`
///
/// Everyone in the session receives `session:closed`. Closing twice is a no-op.
pub async fn close_session(
    Path(session_id): Path<String>,
    State(app_state): State<Arc<ChatAppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let merchant_id = extract_merchant_id(&headers, None, &app_state.config)?;

    app_state.gateway.close_session(&merchant_id, &session_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// **Route**: `GET /api/chat/merchants/{merchant_id}/presence`
pub async fn merchant_presence(
    Path(merchant_id): Path<String>,
    State(app_state): State<Arc<ChatAppState>>,
) -> Json<PresenceResponse> {
    let online = app_state.gateway.is_merchant_online(&merchant_id).await;

    Json(PresenceResponse { merchant_id, online })
}
