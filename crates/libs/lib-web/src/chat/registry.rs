//! # Connection Registry
//!
//! Explicit map of every open chat socket and the indexes used to fan events out:
//!
//! - `ConnId → Connection` (role, outbound channel, joined state)
//! - `sessionId → customer ConnIds` bound to that session
//! - `merchantId → merchant ConnIds` that sent `merchant:join`
//!
//! Sends never block: each connection owns an unbounded channel drained by its socket
//! writer task. A send to a connection whose writer already stopped is dropped silently;
//! the connection leaves the registry when its socket task calls `disconnect`.

use shared::ServerEvent;
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Process-local connection identifier.
pub type ConnId = u64;

/// Who is on the other end of a socket, fixed at upgrade time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peer {
    Customer,
    /// Merchant dashboard; `merchant_id` comes from the verified bearer token.
    Merchant { merchant_id: String },
}

/// The session a customer connection is currently attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundSession {
    pub session_id: String,
    pub merchant_id: String,
    pub customer_id: String,
}

#[derive(Debug)]
pub struct Connection {
    pub peer: Peer,
    tx: UnboundedSender<ServerEvent>,
    /// Customer connections only.
    pub session: Option<BoundSession>,
    /// Merchant connections only; set by the first `merchant:join`.
    pub merchant_joined: bool,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnId, Connection>,
    session_customers: HashMap<String, HashSet<ConnId>>,
    merchant_connections: HashMap<String, HashSet<ConnId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ConnId, peer: Peer, tx: UnboundedSender<ServerEvent>) {
        self.connections.insert(id, Connection { peer, tx, session: None, merchant_joined: false });
    }

    pub fn get(&self, id: ConnId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Drop a connection and every index entry pointing at it.
    pub fn remove(&mut self, id: ConnId) -> Option<Connection> {
        let connection = self.connections.remove(&id)?;

        if let Some(bound) = &connection.session {
            remove_from_index(&mut self.session_customers, &bound.session_id, id);
        }
        if let Peer::Merchant { merchant_id } = &connection.peer {
            remove_from_index(&mut self.merchant_connections, merchant_id, id);
        }

        Some(connection)
    }

    /// Attach a customer connection to a session, detaching it from any previous one.
    pub fn bind_customer(&mut self, id: ConnId, bound: BoundSession) -> bool {
        let Some(connection) = self.connections.get_mut(&id) else {
            return false;
        };

        if let Some(previous) = connection.session.take() {
            remove_from_index(&mut self.session_customers, &previous.session_id, id);
        }

        self.session_customers
            .entry(bound.session_id.clone())
            .or_default()
            .insert(id);
        connection.session = Some(bound);
        true
    }

    /// Mark a merchant connection as joined. Returns `false` if it already was.
    pub fn join_merchant(&mut self, id: ConnId) -> bool {
        let Some(connection) = self.connections.get_mut(&id) else {
            return false;
        };
        let Peer::Merchant { merchant_id } = &connection.peer else {
            return false;
        };
        if connection.merchant_joined {
            return false;
        }

        connection.merchant_joined = true;
        self.merchant_connections
            .entry(merchant_id.clone())
            .or_default()
            .insert(id);
        true
    }

    // region: --- Fan-out

    pub fn send_to(&self, id: ConnId, event: ServerEvent) {
        if let Some(connection) = self.connections.get(&id) {
            if connection.tx.send(event).is_err() {
                debug!(conn_id = id, "[CHAT] Dropped event for closing connection");
            }
        }
    }

    /// Customer connections bound to the session.
    pub fn send_to_session_customers(&self, session_id: &str, event: &ServerEvent) {
        self.send_to_index(&self.session_customers, session_id, event);
    }

    /// Joined merchant connections of the merchant.
    pub fn send_to_merchants(&self, merchant_id: &str, event: &ServerEvent) {
        self.send_to_index(&self.merchant_connections, merchant_id, event);
    }

    /// The session audience: its bound customers plus the merchant's dashboards.
    pub fn broadcast_session(&self, session_id: &str, merchant_id: &str, event: &ServerEvent) {
        self.send_to_session_customers(session_id, event);
        self.send_to_merchants(merchant_id, event);
    }

    /// Every customer connection bound to any session of the merchant.
    pub fn send_to_merchant_customers(&self, merchant_id: &str, event: &ServerEvent) {
        for (id, connection) in &self.connections {
            let bound_here = connection
                .session
                .as_ref()
                .is_some_and(|bound| bound.merchant_id == merchant_id);
            if bound_here {
                self.send_to(*id, event.clone());
            }
        }
    }

    fn send_to_index(&self, index: &HashMap<String, HashSet<ConnId>>, key: &str, event: &ServerEvent) {
        if let Some(ids) = index.get(key) {
            for id in ids {
                self.send_to(*id, event.clone());
            }
        }
    }

    // endregion: --- Fan-out
}

fn remove_from_index(index: &mut HashMap<String, HashSet<ConnId>>, key: &str, id: ConnId) {
    if let Some(ids) = index.get_mut(key) {
        ids.remove(&id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}
