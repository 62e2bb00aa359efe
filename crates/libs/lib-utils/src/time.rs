//! # Time Utilities
//!
//! Utilities for time handling using chrono.

use chrono::{DateTime, SubsecRound, Utc};

/// Get current UTC time at microsecond precision.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
