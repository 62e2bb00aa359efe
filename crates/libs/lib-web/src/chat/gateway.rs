//! # Realtime Chat Gateway
//!
//! Owns everything a chat socket touches: the [`ConnectionRegistry`], merchant presence,
//! one lock per session and the AI responder.
//!
//! ## Ordering
//!
//! Every write to a session (customer/merchant message, takeover flip, AI reply commit) runs
//! under that session's lock and re-reads the session from the store first. The takeover
//! flags are therefore consistent with the order in which messages were persisted. An AI
//! reply is committed only if the session, re-read under the lock after the model returned,
//! is still active and still owned by the AI.
//!
//! The model itself runs in a spawned task without any lock held, so a slow provider never
//! stalls the sender or other sessions.
//!
//! ## Lock order
//!
//! join lock → session lock → presence → registry. The registry lock is never held across
//! an `.await` on anything else. Lock tables only keep entries that are held or awaited.

use crate::chat::ai_bot::{clean_reply, AiRequest, AiResponder, MAX_RESPONSE_LENGTH};
use crate::chat::presence::PresenceTracker;
use crate::chat::registry::{BoundSession, ConnId, ConnectionRegistry, Peer};
use lib_auth::generate_customer_token;
use lib_core::model::store::{
    ChatSession, MessageForCreate, MessageRepository, SessionForCreate, SessionRepository,
};
use lib_core::model::{TakeoverCommand, Transition};
use lib_core::{AppError, Config, DbPool, Result};
use lib_utils::{sanitize_text, validate_email, validate_not_empty};
use shared::{
    ChatMessage, ClientEvent, CustomerJoin, EventError, MerchantJoin, MessageSend, SenderType, ServerEvent,
    SessionRef, SessionSummary, TypingNotice,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

// region: --- Settings

/// Runtime knobs of the gateway, taken from [`Config`].
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub ai_timeout: Duration,
    pub ai_context_window: usize,
    pub max_message_length: usize,
    pub max_reply_length: usize,
}

impl GatewaySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ai_timeout: config.ai_timeout(),
            ai_context_window: config.ai_context_window,
            max_message_length: config.max_message_length,
            max_reply_length: MAX_RESPONSE_LENGTH,
        }
    }
}

// endregion: --- Settings

// region: --- Keyed locks

type LockTable = Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>;

/// One async lock per key. An entry lives only while someone holds or waits for it.
#[derive(Default)]
struct KeyedLocks {
    table: LockTable,
}

impl KeyedLocks {
    async fn acquire(&self, key: &str) -> KeyedGuard {
        let lock = self
            .table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_default()
            .clone();

        let guard = Arc::clone(&lock).lock_owned().await;
        KeyedGuard {
            guard: Some(guard),
            lock,
            key: key.to_string(),
            table: Arc::clone(&self.table),
        }
    }

    /// Keys currently held or awaited.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Releases the key on drop and removes its entry once nobody else is queued on it.
struct KeyedGuard {
    guard: Option<OwnedMutexGuard<()>>,
    lock: Arc<Mutex<()>>,
    key: String,
    table: LockTable,
}

impl Drop for KeyedGuard {
    fn drop(&mut self) {
        self.guard.take();

        // Clones are only taken under the table lock, so the count is stable here.
        // Two references left means the table and this guard.
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        let ours = table.get(&self.key).is_some_and(|lock| Arc::ptr_eq(lock, &self.lock));
        if ours && Arc::strong_count(&self.lock) == 2 {
            table.remove(&self.key);
        }
    }
}

// endregion: --- Keyed locks

/// Who is acting on a session, resolved from the connection.
#[derive(Debug, Clone)]
enum Actor {
    Customer(BoundSession),
    Merchant { merchant_id: String },
}

impl Actor {
    fn sender_type(&self) -> SenderType {
        match self {
            Actor::Customer(_) => SenderType::Customer,
            Actor::Merchant { .. } => SenderType::Merchant,
        }
    }

    /// The customer id stored on the session wins over the one a rejoining tab sent.
    fn sender_id(&self, session: &ChatSession) -> String {
        match self {
            Actor::Customer(bound) => session
                .customer_id
                .clone()
                .unwrap_or_else(|| bound.customer_id.clone()),
            Actor::Merchant { merchant_id } => merchant_id.clone(),
        }
    }

    /// Customers are already scoped by their binding; merchants only reach their own sessions.
    fn check_owns(&self, session: &ChatSession) -> Result<()> {
        match self {
            Actor::Customer(bound) if bound.session_id == session.id => Ok(()),
            Actor::Merchant { merchant_id } if *merchant_id == session.merchant_id => Ok(()),
            _ => Err(AppError::Forbidden("Session belongs to another merchant".to_string())),
        }
    }
}

/// Result of an accepted `message:send`.
#[derive(Debug)]
pub struct SendOutcome {
    pub message: ChatMessage,
    /// The AI turn triggered by this message, if any.
    pub ai_task: Option<JoinHandle<()>>,
}

pub struct ChatGateway {
    db: DbPool,
    settings: GatewaySettings,
    registry: RwLock<ConnectionRegistry>,
    presence: Mutex<PresenceTracker>,
    session_locks: KeyedLocks,
    /// Serializes session resolution per `(merchant, customer token)` in `customer:join`.
    join_locks: KeyedLocks,
    responder: Arc<dyn AiResponder>,
    next_conn_id: AtomicU64,
}

impl ChatGateway {
    pub fn new(db: DbPool, settings: GatewaySettings, responder: Arc<dyn AiResponder>) -> Self {
        Self {
            db,
            settings,
            registry: RwLock::new(ConnectionRegistry::new()),
            presence: Mutex::new(PresenceTracker::new()),
            session_locks: KeyedLocks::default(),
            join_locks: KeyedLocks::default(),
            responder,
            next_conn_id: AtomicU64::new(1),
        }
    }

    // region: --- Connection lifecycle

    /// Register a new socket. Events for it arrive on the returned receiver.
    pub async fn connect(&self, peer: Peer) -> (ConnId, UnboundedReceiver<ServerEvent>) {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = unbounded_channel();

        let mut registry = self.registry.write().await;
        registry.insert(conn_id, peer.clone(), tx);
        debug!(conn_id, peer = ?peer, open = registry.len(), "[CHAT] Connection registered");

        (conn_id, rx)
    }

    /// Forget a socket after close or error. Safe to call more than once.
    pub async fn disconnect(&self, conn_id: ConnId) {
        let removed = self.registry.write().await.remove(conn_id);
        let Some(connection) = removed else {
            return;
        };

        match (&connection.peer, connection.merchant_joined) {
            (Peer::Merchant { merchant_id }, true) => {
                let mut presence = self.presence.lock().await;
                if presence.decrement(merchant_id) {
                    info!(merchant_id = %merchant_id, "[CHAT] Merchant offline");
                    self.registry
                        .read()
                        .await
                        .send_to_merchant_customers(merchant_id, &ServerEvent::MerchantOffline);
                }
            }
            (Peer::Customer, _) => {
                if let Some(bound) = &connection.session {
                    debug!(conn_id, session_id = %bound.session_id, "[CHAT] Customer left session");
                }
            }
            _ => {}
        }
    }

    /// Dispatch one client event. Rejections go back to the sender as an `error` event.
    pub async fn handle_event(self: &Arc<Self>, conn_id: ConnId, event: ClientEvent) {
        let name = event.name();
        let result = match event {
            ClientEvent::CustomerJoin(payload) => self.customer_join(conn_id, payload).await.map(|_| ()),
            ClientEvent::MerchantJoin(payload) => self.merchant_join(conn_id, payload).await,
            ClientEvent::MessageSend(payload) => self.send_message(conn_id, payload).await.map(|_| ()),
            ClientEvent::TypingStart(payload) => self.relay_typing(conn_id, payload, true).await,
            ClientEvent::TypingStop(payload) => self.relay_typing(conn_id, payload, false).await,
            ClientEvent::Takeover(payload) => self
                .apply_takeover(conn_id, payload, TakeoverCommand::Takeover)
                .await
                .map(|_| ()),
            ClientEvent::ReleaseTakeover(payload) => self
                .apply_takeover(conn_id, payload, TakeoverCommand::Release)
                .await
                .map(|_| ()),
        };

        if let Err(err) = result {
            if err.status_code().is_server_error() {
                error!(conn_id, event = name, error = %err, "[CHAT] Event failed");
            } else {
                warn!(conn_id, event = name, error = %err, "[CHAT] Event rejected");
            }
            self.reject(conn_id, &err).await;
        }
    }

    /// Report a rejection to one connection only.
    pub async fn reject(&self, conn_id: ConnId, err: &AppError) {
        let event = ServerEvent::Error(EventError {
            code: err.code().to_string(),
            message: err.user_message(),
        });
        self.registry.read().await.send_to(conn_id, event);
    }

    // endregion: --- Connection lifecycle

    // region: --- Join

    /// Attach a customer connection to its session, creating or resuming it.
    pub async fn customer_join(&self, conn_id: ConnId, payload: CustomerJoin) -> Result<ChatSession> {
        match self.peer_of(conn_id).await? {
            Peer::Customer => {}
            Peer::Merchant { .. } => {
                return Err(AppError::Forbidden(
                    "Merchant connections cannot join as a customer".to_string(),
                ))
            }
        }

        let merchant_id = payload.merchant_id.trim();
        let customer_id = payload.customer_id.trim();
        let customer_name = sanitize_text(&payload.customer_name);
        validate_not_empty(merchant_id, "merchantId").map_err(AppError::InvalidInput)?;
        validate_not_empty(&customer_name, "customerName").map_err(AppError::InvalidInput)?;
        validate_not_empty(customer_id, "customerId").map_err(AppError::InvalidInput)?;

        let customer_email = payload
            .customer_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty());
        if let Some(email) = customer_email {
            validate_email(email).map_err(AppError::InvalidInput)?;
        }

        let token = payload
            .customer_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty());

        // Two tabs rejoining with the same token must settle on one session.
        let join_guard = match token {
            Some(token) => Some(self.join_locks.acquire(&format!("{merchant_id}\n{token}")).await),
            None => None,
        };

        let resumed = match token {
            Some(token) => SessionRepository::find_resumable(&self.db, merchant_id, token).await?,
            None => None,
        };

        let session = match resumed {
            Some(session) => {
                info!(session_id = %session.id, merchant_id, "[CHAT] Customer resumed session");
                session
            }
            None => {
                let customer_token = match token {
                    Some(token) if SessionRepository::token_known(&self.db, merchant_id, token).await? => {
                        token.to_string()
                    }
                    _ => generate_customer_token(),
                };

                let session = SessionRepository::create(&self.db, SessionForCreate {
                    merchant_id: merchant_id.to_string(),
                    customer_id: Some(customer_id.to_string()),
                    customer_name: customer_name.clone(),
                    customer_email: customer_email.map(str::to_string),
                    customer_token,
                })
                .await?;
                info!(session_id = %session.id, merchant_id, "[CHAT] Session created");
                session
            }
        };
        drop(join_guard);

        // Hold the session lock so no message lands between the history read and the binding.
        {
            let _guard = self.session_locks.acquire(&session.id).await;
            let history = self.history_of(&session.id).await?;

            let mut registry = self.registry.write().await;
            registry.bind_customer(conn_id, BoundSession {
                session_id: session.id.clone(),
                merchant_id: session.merchant_id.clone(),
                customer_id: customer_id.to_string(),
            });
            registry.send_to(conn_id, ServerEvent::SessionCreated(session.info()));
            registry.send_to(conn_id, ServerEvent::SessionHistory(history));
        }

        let presence = self.presence.lock().await;
        if presence.is_online(&session.merchant_id) {
            self.registry.read().await.send_to(conn_id, ServerEvent::MerchantOnline);
        }

        Ok(session)
    }

    /// Announce a merchant dashboard. Repeating it on the same connection changes nothing.
    pub async fn merchant_join(&self, conn_id: ConnId, payload: MerchantJoin) -> Result<()> {
        let merchant_id = match self.peer_of(conn_id).await? {
            Peer::Merchant { merchant_id } => merchant_id,
            Peer::Customer => {
                return Err(AppError::Forbidden(
                    "Only merchant connections can join as a merchant".to_string(),
                ))
            }
        };
        if payload.merchant_id.trim() != merchant_id {
            return Err(AppError::Forbidden(
                "Token does not belong to this merchant".to_string(),
            ));
        }

        let mut presence = self.presence.lock().await;
        let newly_joined = self.registry.write().await.join_merchant(conn_id);
        if !newly_joined {
            debug!(conn_id, merchant_id = %merchant_id, "[CHAT] Merchant already joined");
            return Ok(());
        }

        if presence.increment(&merchant_id) {
            info!(merchant_id = %merchant_id, "[CHAT] Merchant online");
            self.registry
                .read()
                .await
                .send_to_merchant_customers(&merchant_id, &ServerEvent::MerchantOnline);
        }

        Ok(())
    }

    // endregion: --- Join

    // region: --- Messaging

    /// Persist a message and broadcast it to the session audience.
    ///
    /// A customer message in an AI-owned session also starts an AI turn.
    pub async fn send_message(self: &Arc<Self>, conn_id: ConnId, payload: MessageSend) -> Result<SendOutcome> {
        let actor = self.actor_for(conn_id, &payload.session_id).await?;
        if payload.sender_type != actor.sender_type() {
            return Err(AppError::InvalidInput(format!(
                "senderType '{}' does not match this connection",
                payload.sender_type
            )));
        }
        let content = self.clean_content(&payload.content)?;

        let (session, message) = {
            let _guard = self.session_locks.acquire(&payload.session_id).await;

            let session = self.load_active_session(&payload.session_id).await?;
            actor.check_owns(&session)?;

            let message = MessageRepository::append(
                &self.db,
                MessageForCreate::new(&session.id, Some(actor.sender_id(&session)), actor.sender_type(), content),
            )
            .await?
            .into_message()?;

            self.broadcast(&session, ServerEvent::MessageReceive(message.clone())).await;
            (session, message)
        };

        debug!(
            session_id = %session.id,
            sender_type = %message.sender_type,
            mode = ?session.control_mode(),
            "[CHAT] Message persisted"
        );

        let ai_task = (message.sender_type == SenderType::Customer && session.control_mode().ai_replies())
            .then(|| self.spawn_ai_turn(session, message.clone()));

        Ok(SendOutcome { message, ai_task })
    }

    /// Forward a typing indicator to the other party. Nothing is stored.
    pub async fn relay_typing(&self, conn_id: ConnId, payload: SessionRef, typing: bool) -> Result<()> {
        let actor = self.actor_for(conn_id, &payload.session_id).await?;
        let session = self.load_active_session(&payload.session_id).await?;
        actor.check_owns(&session)?;

        let notice = TypingNotice {
            session_id: session.id.clone(),
            sender_type: actor.sender_type(),
        };
        let event = if typing {
            ServerEvent::TypingStart(notice)
        } else {
            ServerEvent::TypingStop(notice)
        };

        let registry = self.registry.read().await;
        match actor {
            Actor::Customer(_) => registry.send_to_merchants(&session.merchant_id, &event),
            Actor::Merchant { .. } => registry.send_to_session_customers(&session.id, &event),
        }

        Ok(())
    }

    // endregion: --- Messaging

    // region: --- Takeover

    /// Apply a merchant takeover command. Only real transitions are persisted and broadcast.
    pub async fn apply_takeover(
        &self,
        conn_id: ConnId,
        payload: SessionRef,
        command: TakeoverCommand,
    ) -> Result<Transition> {
        let actor = self.actor_for(conn_id, &payload.session_id).await?;
        if !matches!(actor, Actor::Merchant { .. }) {
            return Err(AppError::Forbidden(
                "Only merchants can take over a conversation".to_string(),
            ));
        }

        let _guard = self.session_locks.acquire(&payload.session_id).await;
        let session = self.load_active_session(&payload.session_id).await?;
        actor.check_owns(&session)?;

        let transition = session.control_mode().apply(command, session.ai_enabled);
        if !transition.changed() {
            debug!(session_id = %session.id, ?command, "[CHAT] Takeover command was a no-op");
            return Ok(transition);
        }

        let changed = SessionRepository::set_merchant_took_over(
            &self.db,
            &session.id,
            transition.merchant_took_over(),
        )
        .await?;
        if !changed {
            return Ok(Transition { from: transition.to, to: transition.to });
        }

        info!(
            session_id = %session.id,
            from = ?transition.from,
            to = ?transition.to,
            "[CHAT] Session ownership changed"
        );
        let session_ref = SessionRef { session_id: session.id.clone() };
        let event = match command {
            TakeoverCommand::Takeover => ServerEvent::MerchantTakeover(session_ref),
            TakeoverCommand::Release => ServerEvent::MerchantReleaseTakeover(session_ref),
        };
        self.broadcast(&session, event).await;

        Ok(transition)
    }

    // endregion: --- Takeover

    // region: --- Merchant dashboard

    /// Close a session of `merchant_id`. Returns `false` if it was already closed.
    pub async fn close_session(&self, merchant_id: &str, session_id: &str) -> Result<bool> {
        let _guard = self.session_locks.acquire(session_id).await;
        let session = self.load_session(session_id).await?;
        if session.merchant_id != merchant_id {
            return Err(AppError::Forbidden("Session belongs to another merchant".to_string()));
        }

        let closed = SessionRepository::close(&self.db, session_id).await?;
        if closed {
            info!(session_id, merchant_id, "[CHAT] Session closed");
            let event = ServerEvent::SessionClosed(SessionRef { session_id: session_id.to_string() });
            self.broadcast(&session, event).await;
        }
        Ok(closed)
    }

    /// Full history of a session owned by `merchant_id`.
    pub async fn session_history(&self, merchant_id: &str, session_id: &str) -> Result<Vec<ChatMessage>> {
        let session = self.load_session(session_id).await?;
        if session.merchant_id != merchant_id {
            return Err(AppError::Forbidden("Session belongs to another merchant".to_string()));
        }
        self.history_of(session_id).await
    }

    /// Active sessions of a merchant, most recently updated first.
    pub async fn list_sessions(&self, merchant_id: &str) -> Result<Vec<SessionSummary>> {
        let rows = SessionRepository::list_active_for_merchant(&self.db, merchant_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| row.session.summary(row.last_message))
            .collect())
    }

    pub async fn is_merchant_online(&self, merchant_id: &str) -> bool {
        self.presence.lock().await.is_online(merchant_id)
    }

    #[cfg(test)]
    pub(crate) fn held_lock_count(&self) -> usize {
        self.session_locks.len() + self.join_locks.len()
    }

    // endregion: --- Merchant dashboard

    // region: --- AI turn

    fn spawn_ai_turn(self: &Arc<Self>, session: ChatSession, trigger: ChatMessage) -> JoinHandle<()> {
        let gateway = Arc::clone(self);
        tokio::spawn(async move { gateway.run_ai_turn(session, trigger).await })
    }

    /// Ask the responder, then commit the reply only if the AI still owns the session.
    ///
    /// Failures are logged and end the turn; the customer simply gets no AI reply.
    async fn run_ai_turn(&self, session: ChatSession, trigger: ChatMessage) {
        let history = match MessageRepository::recent_for_session(
            &self.db,
            &session.id,
            self.settings.ai_context_window,
        )
        .await
        {
            Ok(rows) => rows
                .into_iter()
                .filter_map(|row| row.into_message().ok())
                .collect(),
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "[AI] Failed to load context");
                return;
            }
        };

        let request = AiRequest {
            session_id: session.id.clone(),
            merchant_id: session.merchant_id.clone(),
            customer_name: session.customer_name.clone(),
            message: trigger.content,
            history,
        };

        let raw = match tokio::time::timeout(self.settings.ai_timeout, self.responder.respond(request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(
                    session_id = %session.id,
                    responder = self.responder.name(),
                    error = %e,
                    "[AI] Responder failed"
                );
                return;
            }
            Err(_) => {
                warn!(
                    session_id = %session.id,
                    responder = self.responder.name(),
                    timeout_secs = self.settings.ai_timeout.as_secs_f64(),
                    "[AI] Responder timed out"
                );
                return;
            }
        };

        let Some(reply) = clean_reply(&raw, self.settings.max_reply_length) else {
            warn!(session_id = %session.id, "[AI] Empty reply discarded");
            return;
        };

        let _guard = self.session_locks.acquire(&session.id).await;
        let current = match SessionRepository::find_by_id(&self.db, &session.id).await {
            Ok(Some(current)) => current,
            Ok(None) => return,
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "[AI] Failed to re-read session");
                return;
            }
        };
        if !current.is_active() || !current.control_mode().ai_replies() {
            info!(
                session_id = %session.id,
                mode = ?current.control_mode(),
                "[AI] Reply discarded, session no longer owned by AI"
            );
            return;
        }

        let message = match MessageRepository::append(
            &self.db,
            MessageForCreate::new(&current.id, None, SenderType::Ai, reply),
        )
        .await
        .map_err(AppError::from)
        .and_then(|row| row.into_message())
        {
            Ok(message) => message,
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "[AI] Failed to persist reply");
                return;
            }
        };

        info!(session_id = %session.id, chars = message.content.chars().count(), "[AI] Reply sent");
        self.broadcast(&current, ServerEvent::AiResponse(message)).await;
    }

    // endregion: --- AI turn

    // region: --- Helpers

    async fn peer_of(&self, conn_id: ConnId) -> Result<Peer> {
        self.registry
            .read()
            .await
            .get(conn_id)
            .map(|connection| connection.peer.clone())
            .ok_or_else(|| AppError::Internal(format!("Unknown connection {}", conn_id)))
    }

    /// Resolve who may act on `session_id` from this connection.
    async fn actor_for(&self, conn_id: ConnId, session_id: &str) -> Result<Actor> {
        let registry = self.registry.read().await;
        let connection = registry
            .get(conn_id)
            .ok_or_else(|| AppError::Internal(format!("Unknown connection {}", conn_id)))?;

        match &connection.peer {
            Peer::Customer => match &connection.session {
                Some(bound) if bound.session_id == session_id => Ok(Actor::Customer(bound.clone())),
                Some(_) => Err(AppError::Forbidden(
                    "Connection is not bound to this session".to_string(),
                )),
                None => Err(AppError::Forbidden("Send customer:join first".to_string())),
            },
            Peer::Merchant { merchant_id } if connection.merchant_joined => Ok(Actor::Merchant {
                merchant_id: merchant_id.clone(),
            }),
            Peer::Merchant { .. } => Err(AppError::Forbidden("Send merchant:join first".to_string())),
        }
    }

    fn clean_content(&self, raw: &str) -> Result<String> {
        let content = sanitize_text(raw);
        if content.is_empty() {
            return Err(AppError::InvalidInput("Message content cannot be empty".to_string()));
        }
        if content.chars().count() > self.settings.max_message_length {
            return Err(AppError::InvalidInput(format!(
                "Message exceeds {} characters",
                self.settings.max_message_length
            )));
        }
        Ok(content)
    }

    async fn load_session(&self, session_id: &str) -> Result<ChatSession> {
        SessionRepository::find_by_id(&self.db, session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
    }

    async fn load_active_session(&self, session_id: &str) -> Result<ChatSession> {
        let session = self.load_session(session_id).await?;
        if !session.is_active() {
            return Err(AppError::Conflict("Session is closed".to_string()));
        }
        Ok(session)
    }

    async fn history_of(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        MessageRepository::list_for_session(&self.db, session_id)
            .await?
            .into_iter()
            .map(|row| row.into_message())
            .collect()
    }

    async fn broadcast(&self, session: &ChatSession, event: ServerEvent) {
        self.registry
            .read()
            .await
            .broadcast_session(&session.id, &session.merchant_id, &event);
    }

    // endregion: --- Helpers
}
