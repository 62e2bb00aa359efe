//! # Chat Gateway Tests
//!
//! Exercises the gateway the way sockets do: every client is a registered connection whose
//! outbound channel is drained and inspected. AI turns are awaited through the join handle
//! returned by `send_message`, so no test sleeps for replies.

mod http;
mod takeover;

use crate::chat::ai_bot::{AiRequest, AiResponder};
use crate::chat::gateway::{ChatGateway, GatewaySettings};
use crate::chat::registry::{ConnId, Peer};
use async_trait::async_trait;
use lib_core::model::store::ChatSession;
use lib_core::{Config, DbPool, MIGRATOR};
use shared::{CustomerJoin, MessageSend, SenderType, ServerEvent};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Notify;

// region: --- Fixtures

/// In-memory database with the chat schema, on a single never-expiring connection.
pub async fn setup_test_db() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    MIGRATOR.run(&pool).await.expect("Failed to run migrations");

    pool
}

/// Create test config
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret-key-must-be-at-least-32-characters-long!".to_string(),
        jwt_expiration_hours: 24,
        ai_timeout_secs: 5,
        ai_context_window: 20,
        max_message_length: 2000,
    }
}

pub fn test_settings() -> GatewaySettings {
    GatewaySettings::from_config(&test_config())
}

pub async fn test_gateway(responder: Arc<dyn AiResponder>) -> (Arc<ChatGateway>, DbPool) {
    let pool = setup_test_db().await;
    let gateway = Arc::new(ChatGateway::new(pool.clone(), test_settings(), responder));
    (gateway, pool)
}

// endregion: --- Fixtures

// region: --- Responders

/// Always answers with the same text and records what it was asked.
pub struct ScriptedResponder {
    reply: String,
    calls: AtomicUsize,
    requests: Mutex<Vec<AiRequest>>,
}

impl ScriptedResponder {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<AiRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AiResponder for ScriptedResponder {
    async fn respond(&self, request: AiRequest) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        Ok(self.reply.clone())
    }
}

pub struct FailingResponder;

#[async_trait]
impl AiResponder for FailingResponder {
    async fn respond(&self, _request: AiRequest) -> anyhow::Result<String> {
        anyhow::bail!("provider unavailable")
    }
}

/// Takes longer than any test timeout.
pub struct SlowResponder;

#[async_trait]
impl AiResponder for SlowResponder {
    async fn respond(&self, _request: AiRequest) -> anyhow::Result<String> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("too late".to_string())
    }
}

/// Signals when a call starts and answers only once released.
pub struct GatedResponder {
    pub started: Notify,
    pub release: Notify,
    reply: String,
}

impl GatedResponder {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            started: Notify::new(),
            release: Notify::new(),
            reply: reply.to_string(),
        })
    }
}

#[async_trait]
impl AiResponder for GatedResponder {
    async fn respond(&self, _request: AiRequest) -> anyhow::Result<String> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.reply.clone())
    }
}

// endregion: --- Responders

// region: --- Clients

/// A registered connection and its outbound events.
pub struct TestClient {
    pub conn: ConnId,
    rx: UnboundedReceiver<ServerEvent>,
}

impl TestClient {
    pub async fn connect(gateway: &ChatGateway, peer: Peer) -> Self {
        let (conn, rx) = gateway.connect(peer).await;
        Self { conn, rx }
    }

    /// Everything delivered so far.
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn drain_names(&mut self) -> Vec<&'static str> {
        self.drain().iter().map(ServerEvent::name).collect()
    }
}

pub fn join_payload(merchant_id: &str, customer_token: Option<&str>) -> CustomerJoin {
    CustomerJoin {
        merchant_id: merchant_id.to_string(),
        customer_name: "Alice".to_string(),
        customer_email: Some("alice@example.com".to_string()),
        customer_id: "c-42".to_string(),
        customer_token: customer_token.map(str::to_string),
    }
}

/// Connect a customer and join; the join events are drained.
pub async fn join_customer(
    gateway: &ChatGateway,
    merchant_id: &str,
    customer_token: Option<&str>,
) -> (TestClient, ChatSession) {
    let mut client = TestClient::connect(gateway, Peer::Customer).await;
    let session = gateway
        .customer_join(client.conn, join_payload(merchant_id, customer_token))
        .await
        .expect("customer:join should succeed");
    client.drain();
    (client, session)
}

/// Connect a merchant dashboard and join; the join events are drained.
pub async fn join_merchant(gateway: &ChatGateway, merchant_id: &str) -> TestClient {
    let mut client = TestClient::connect(
        gateway,
        Peer::Merchant { merchant_id: merchant_id.to_string() },
    )
    .await;
    gateway
        .merchant_join(client.conn, shared::MerchantJoin { merchant_id: merchant_id.to_string() })
        .await
        .expect("merchant:join should succeed");
    client.drain();
    client
}

pub fn message(session_id: &str, content: &str, sender_type: SenderType) -> MessageSend {
    MessageSend {
        session_id: session_id.to_string(),
        content: content.to_string(),
        sender_type,
    }
}

/// The single error event in `events`, as `(code, message)`.
pub fn error_of(events: &[ServerEvent]) -> Option<(String, String)> {
    events.iter().find_map(|event| match event {
        ServerEvent::Error(err) => Some((err.code.clone(), err.message.clone())),
        _ => None,
    })
}

// endregion: --- Clients
