//! # Chat Module
//!
//! Real-time storefront chat between customers, the AI assistant and merchants.
//!
//! Customers and merchant dashboards connect over a WebSocket (`GET /api/chat/ws`) and
//! exchange JSON events with the [`ChatGateway`]. Merchants additionally get a small HTTP
//! surface for their session list, history, closing sessions and presence.

pub mod ai_bot;
pub mod gateway;
pub mod handlers;
pub mod presence;
pub mod registry;
pub mod state;

#[cfg(test)]
mod tests;

pub use ai_bot::{responder_from_env, AiProvider, AiRequest, AiResponder, BotConfig, DisabledResponder};
#[cfg(feature = "genai")]
pub use ai_bot::GenAiResponder;
pub use gateway::{ChatGateway, GatewaySettings, SendOutcome};
pub use registry::{ConnId, Peer};
pub use state::ChatAppState;
