//! # Chat Handlers
//!
//! WebSocket and HTTP handlers for chat functionality.

// region: --- Modules
pub mod sessions;
pub mod socket;
pub mod utils;
// endregion: --- Modules

// region: --- Re-exports
pub use sessions::{close_session, get_session_messages, list_sessions, merchant_presence};
pub use socket::chat_websocket;
// endregion: --- Re-exports
