//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between the storefront chat widgets (customer
//! browser, merchant dashboard) and the chat backend. All DTOs use JSON serialization
//! via `serde`.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects
//!   - **[`dto::chat`]**: Messages, sessions and HTTP response bodies
//!   - **[`dto::events`]**: Realtime events exchanged over the chat WebSocket
//! - **[`utils`]**: Shared helpers
//!   - **[`utils::preview`]**: Shorten message content for session lists
//!
//! ## Wire Format
//!
//! - Field names are **camelCase** in JSON (`#[serde(rename_all = "camelCase")]`), matching
//!   what the browser widgets already send
//! - Optional fields are omitted from JSON when `None`
//! - Realtime frames are adjacently tagged: `{"event": "message:send", "data": {...}}`
//!
//! ## Usage
//!
//! ```rust
//! use shared::dto::events::ClientEvent;
//!
//! let raw = r#"{"event":"typing:start","data":{"sessionId":"s-1"}}"#;
//! let event: ClientEvent = serde_json::from_str(raw).unwrap();
//! assert_eq!(event.name(), "typing:start");
//! ```

pub mod dto;
pub mod utils;

// Wildcard re-exports: shared is a DTO library, everything here is public API
pub use dto::*;
pub use utils::*;
