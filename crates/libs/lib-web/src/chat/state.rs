//! # Chat State
//!
//! Application state handed to the chat routes.

use crate::chat::ai_bot::AiResponder;
use crate::chat::gateway::{ChatGateway, GatewaySettings};
use lib_core::{Config, DbPool};
use std::sync::Arc;

/// Application state for chat module
pub struct ChatAppState {
    pub db: DbPool,
    pub config: Config,
    pub gateway: Arc<ChatGateway>,
}

impl ChatAppState {
    pub fn new(db: DbPool, config: Config, responder: Arc<dyn AiResponder>) -> Self {
        let settings = GatewaySettings::from_config(&config);
        let gateway = Arc::new(ChatGateway::new(db.clone(), settings, responder));

        Self { db, config, gateway }
    }
}

impl axum::extract::FromRef<ChatAppState> for DbPool {
    fn from_ref(state: &ChatAppState) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<ChatAppState> for Config {
    fn from_ref(state: &ChatAppState) -> Self {
        state.config.clone()
    }
}
