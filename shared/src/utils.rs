//! # Shared Utility Functions
//!
//! Helpers used by both the backend and the dashboard widgets.
//!
//! ```rust
//! use shared::utils::preview;
//!
//! assert_eq!(preview("Is the blue mug in stock?", 10), "Is the bl…");
//! ```

/// Shorten `text` to at most `max_chars` characters, ending with `…` when cut.
///
/// Counts characters rather than bytes so multi-byte text is never split.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let mut short: String = text.chars().take(max_chars - 1).collect();
    short.push('…');
    short
}
