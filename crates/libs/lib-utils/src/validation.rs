//! # Validation Utilities
//!
//! Input validation helpers.

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate email format (basic check).
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.contains('@') && email.contains('.') {
        Ok(())
    } else {
        Err("Invalid email format".to_string())
    }
}

/// Reduce user-supplied text to plain text.
///
/// Removes HTML tags, drops control characters other than newline and tab, and trims
/// surrounding whitespace. A `<` only opens a tag when followed by a letter, `/` or `!`,
/// and the tag ends at the next `>` on the same line. Anything else, such as
/// `under < 20 and over > 5`, is kept verbatim.
pub fn sanitize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some(end) = tag_len(rest) {
                rest = &rest[end..];
                continue;
            }
        }

        rest = &rest[c.len_utf8()..];
        if c.is_control() && c != '\n' && c != '\t' {
            continue;
        }
        out.push(c);
    }

    out.trim().to_string()
}

/// Byte length of the tag at the start of `text`, `<` through `>` inclusive.
fn tag_len(text: &str) -> Option<usize> {
    match text[1..].chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' => {}
        _ => return None,
    }

    let body_end = text[1..].find(|c: char| matches!(c, '>' | '<' | '\n'))? + 1;
    (text.as_bytes()[body_end] == b'>').then_some(body_end + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("  Alice ", "name").is_ok());
        assert_eq!(
            validate_not_empty("   ", "name").unwrap_err(),
            "name cannot be empty"
        );
    }

    #[test]
    fn test_sanitize_strips_tags() {
        assert_eq!(
            sanitize_text("<b>Is this</b> in stock?<script>alert(1)</script>"),
            "Is this in stock?alert(1)"
        );
    }

    #[test]
    fn test_sanitize_keeps_plain_comparisons() {
        assert_eq!(sanitize_text("price < 20"), "price < 20");
        assert_eq!(
            sanitize_text("Is it under < 20 cm and over > 5 cm?"),
            "Is it under < 20 cm and over > 5 cm?"
        );
        assert_eq!(sanitize_text("5<6 and 7>3"), "5<6 and 7>3");
    }

    #[test]
    fn test_sanitize_tag_does_not_span_lines_or_nested_brackets() {
        assert_eq!(sanitize_text("see <this\nnote> here"), "see <this\nnote> here");
        assert_eq!(sanitize_text("x <a <b>c"), "x <a c");
        assert_eq!(sanitize_text("<!-- hidden -->shown"), "shown");
    }

    #[test]
    fn test_sanitize_drops_control_chars_and_trims() {
        assert_eq!(sanitize_text("  hi\u{0}\u{7} there\n "), "hi there");
        assert_eq!(sanitize_text("line one\nline two"), "line one\nline two");
    }

    #[test]
    fn test_sanitize_can_empty_a_message() {
        assert!(sanitize_text("<p></p>   ").is_empty());
    }
}
