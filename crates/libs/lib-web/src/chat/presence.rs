//! # Merchant Presence
//!
//! Counts joined merchant connections per merchant. A merchant is online while at least one
//! of its dashboard tabs has joined. Only 0→1 and 1→0 crossings are reported, which is what
//! keeps `merchant:online`/`merchant:offline` from being repeated for every extra tab.
//!
//! The tracker itself does no locking; the gateway keeps it behind a mutex and broadcasts the
//! crossing while still holding it, so customers see crossings in the order they happened.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct PresenceTracker {
    counts: HashMap<String, usize>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a joined connection. Returns `true` when the merchant just came online.
    pub fn increment(&mut self, merchant_id: &str) -> bool {
        let count = self.counts.entry(merchant_id.to_string()).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Record a closed connection. Returns `true` when the merchant just went offline.
    ///
    /// Decrementing a merchant that is not online is a no-op.
    pub fn decrement(&mut self, merchant_id: &str) -> bool {
        match self.counts.get_mut(merchant_id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                self.counts.remove(merchant_id);
                true
            }
            None => false,
        }
    }

    pub fn is_online(&self, merchant_id: &str) -> bool {
        self.counts.contains_key(merchant_id)
    }

    /// Number of joined connections for a merchant.
    pub fn count(&self, merchant_id: &str) -> usize {
        self.counts.get(merchant_id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_first_join_and_last_leave_cross() {
        let mut presence = PresenceTracker::new();

        assert!(presence.increment("m1"));
        assert!(!presence.increment("m1"));
        assert!(!presence.increment("m1"));
        assert_eq!(presence.count("m1"), 3);

        assert!(!presence.decrement("m1"));
        assert!(!presence.decrement("m1"));
        assert!(presence.is_online("m1"));
        assert!(presence.decrement("m1"));
        assert!(!presence.is_online("m1"));
    }

    #[test]
    fn test_decrement_at_zero_is_a_no_op() {
        let mut presence = PresenceTracker::new();

        assert!(!presence.decrement("m1"));
        assert_eq!(presence.count("m1"), 0);

        // Still reports the next join as a crossing.
        assert!(presence.increment("m1"));
    }

    #[test]
    fn test_merchants_are_independent() {
        let mut presence = PresenceTracker::new();
        presence.increment("m1");

        assert!(presence.increment("m2"));
        assert!(presence.decrement("m2"));
        assert!(presence.is_online("m1"));
    }
}
