//! # Data Transfer Objects (DTOs)
//!
//! This module contains all data structures used for communication between
//! the chat widgets and the backend, both over HTTP and over the realtime socket.
//!
//! ## Module Organization
//!
//! - [`chat`] - Messages, session descriptions, presence and error bodies
//! - [`events`] - Client → server and server → client realtime events
//!
//! ## Example JSON Communication
//!
//! ```text
//! → {"event":"customer:join","data":{"merchantId":"m1","customerName":"Alice","customerId":"c-42"}}
//! ← {"event":"session:created","data":{"id":"9b1d…","customerToken":"q8Xr…","aiEnabled":true,"merchantTookOver":false}}
//! ← {"event":"session:history","data":[]}
//! ```

pub mod chat;
pub mod events;

pub use chat::*;
pub use events::*;
