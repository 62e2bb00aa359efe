//! # Chat WebSocket
//!
//! `GET /api/chat/ws?role=customer|merchant[&token=<jwt>]`
//!
//! Merchants are authenticated before the upgrade; a missing or invalid token is answered
//! with 401 and no socket is opened. Customers are anonymous until `customer:join`.
//!
//! Each socket runs two tasks: a writer draining the connection's gateway channel, and a
//! reader feeding client events to the gateway one at a time, in arrival order. When either
//! side ends (close frame, read error, failed write) the connection is disconnected.
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:3001/api/chat/ws?role=customer');
//! ws.onopen = () => ws.send(JSON.stringify({
//!   event: 'customer:join',
//!   data: { merchantId: 'm1', customerName: 'Alice', customerId: 'c-42' },
//! }));
//! ws.onmessage = (frame) => console.log(JSON.parse(frame.data));
//! ```

use crate::chat::gateway::ChatGateway;
use crate::chat::handlers::utils::extract_merchant_id;
use crate::chat::registry::{ConnId, Peer};
use crate::chat::state::ChatAppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use lib_core::{AppError, Config};
use serde::Deserialize;
use shared::ClientEvent;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info, warn};

/// Query parameters of the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct SocketParams {
    /// `customer` (default) or `merchant`
    pub role: Option<String>,
    /// Merchant token for clients that cannot send an `Authorization` header
    pub token: Option<String>,
}

pub async fn chat_websocket(
    ws: WebSocketUpgrade,
    Query(params): Query<SocketParams>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(app_state): State<Arc<ChatAppState>>,
) -> Response {
    let client_ip = headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| addr.ip().to_string());

    let peer = match resolve_peer(&params, &headers, &app_state.config) {
        Ok(peer) => peer,
        Err(err) => {
            warn!(
                client_ip = %client_ip,
                role = ?params.role,
                error = %err,
                "[WS] UPGRADE_REJECTED ip={} error={}",
                client_ip,
                err
            );
            return err.into_response();
        }
    };

    info!(
        client_ip = %client_ip,
        peer = ?peer,
        "[WS] CONNECT_ATTEMPT ip={} peer={:?}",
        client_ip,
        peer
    );

    let gateway = Arc::clone(&app_state.gateway);
    ws.on_upgrade(move |socket| handle_chat_socket(socket, gateway, peer, client_ip))
        .into_response()
}

/// Decide who is connecting from the upgrade request.
pub fn resolve_peer(params: &SocketParams, headers: &HeaderMap, config: &Config) -> Result<Peer, AppError> {
    match params.role.as_deref().map(str::trim).unwrap_or("customer") {
        "customer" => Ok(Peer::Customer),
        "merchant" => {
            let merchant_id = extract_merchant_id(headers, params.token.as_deref(), config)?;
            Ok(Peer::Merchant { merchant_id })
        }
        other => Err(AppError::InvalidInput(format!("Unknown role '{}'", other))),
    }
}

async fn handle_chat_socket(socket: WebSocket, gateway: Arc<ChatGateway>, peer: Peer, client_ip: String) {
    let (mut sender, mut receiver) = socket.split();
    let connection_start = Instant::now();
    let messages_sent = Arc::new(AtomicU64::new(0));
    let messages_received = Arc::new(AtomicU64::new(0));

    let (conn_id, outbound) = gateway.connect(peer).await;
    info!(
        conn_id,
        client_ip = %client_ip,
        "[WS] CONNECTED conn_id={} ip={}",
        conn_id,
        client_ip
    );

    // Writer: gateway events → socket
    let messages_sent_send = Arc::clone(&messages_sent);
    let mut send_task = tokio::spawn(async move {
        let mut outbound = UnboundedReceiverStream::new(outbound);
        while let Some(event) = outbound.next().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!(conn_id, error = %e, "[WS] SERIALIZE_ERROR conn_id={} error={}", conn_id, e);
                    continue;
                }
            };

            if let Err(e) = sender.send(Message::Text(json.into())).await {
                warn!(conn_id, error = %e, "[WS] SEND_ERROR conn_id={} error={}", conn_id, e);
                break;
            }
            let count = messages_sent_send.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(conn_id, event = event.name(), total_sent = count, "[WS] EVENT_SENT");
        }
    });

    // Reader: socket → gateway
    let recv_gateway = Arc::clone(&gateway);
    let messages_received_recv = Arc::clone(&messages_received);
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    messages_received_recv.fetch_add(1, Ordering::Relaxed);
                    dispatch_text(&recv_gateway, conn_id, text.as_str()).await;
                }
                Ok(Message::Close(frame)) => {
                    let close_reason = frame
                        .as_ref()
                        .map(|f| f.code.to_string())
                        .unwrap_or_else(|| "none".to_string());
                    info!(conn_id, reason = %close_reason, "[WS] CLOSE_RECEIVED conn_id={} reason={}", conn_id, close_reason);
                    break;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Binary(data)) => {
                    messages_received_recv.fetch_add(1, Ordering::Relaxed);
                    debug!(conn_id, size = data.len(), "[WS] BINARY_IGNORED");
                    recv_gateway
                        .reject(conn_id, &AppError::InvalidInput("Binary frames are not supported".to_string()))
                        .await;
                }
                Err(e) => {
                    warn!(conn_id, error = %e, "[WS] RECV_ERROR conn_id={} error={}", conn_id, e);
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        result = &mut send_task => {
            recv_task.abort();
            if let Err(e) = result {
                error!(conn_id, error = ?e, "[WS] SEND_TASK_ERROR conn_id={} error={:?}", conn_id, e);
            }
        }
        result = &mut recv_task => {
            send_task.abort();
            if let Err(e) = result {
                error!(conn_id, error = ?e, "[WS] RECV_TASK_ERROR conn_id={} error={:?}", conn_id, e);
            }
        }
    }

    gateway.disconnect(conn_id).await;

    let duration = connection_start.elapsed();
    let sent_count = messages_sent.load(Ordering::Relaxed);
    let received_count = messages_received.load(Ordering::Relaxed);
    info!(
        conn_id,
        client_ip = %client_ip,
        duration_ms = duration.as_millis(),
        messages_sent = sent_count,
        messages_received = received_count,
        "[WS] DISCONNECTED conn_id={} ip={} duration={:.2}s messages_sent={} messages_received={}",
        conn_id,
        client_ip,
        duration.as_secs_f64(),
        sent_count,
        received_count
    );
}

/// Parse one text frame and hand it to the gateway. Malformed frames are rejected to the sender.
async fn dispatch_text(gateway: &Arc<ChatGateway>, conn_id: ConnId, text: &str) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => {
            debug!(conn_id, event = event.name(), "[WS] EVENT_RECEIVED");
            gateway.handle_event(conn_id, event).await;
        }
        Err(e) => {
            warn!(conn_id, error = %e, size = text.len(), "[WS] MALFORMED_EVENT");
            gateway.reject(conn_id, &AppError::from(e)).await;
        }
    }
}
