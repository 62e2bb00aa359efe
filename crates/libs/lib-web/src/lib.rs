//! # Web Library
//!
//! Realtime chat gateway, HTTP/WebSocket handlers, middleware and server bootstrap.

pub mod chat;
pub mod middleware;
pub mod server;

pub use server::{create_router, start_server, ServerConfig};
