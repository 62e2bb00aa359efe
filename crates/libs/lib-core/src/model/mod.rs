//! # Domain Model
//!
//! - [`store`]: SQLite pool, row types and repositories
//! - [`takeover`]: who answers customer messages in a session

pub mod store;
pub mod takeover;

pub use takeover::{ControlMode, TakeoverCommand, Transition};
