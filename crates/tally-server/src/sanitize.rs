//! Request text sanitization
//!
//! Descriptions arriving over HTTP are cleaned before they reach the
//! predictor: invisible Unicode and control characters are dropped, HTML
//! special characters are escaped and surrounding whitespace is trimmed.

/// Maximum accepted description length in bytes (before sanitization)
pub const MAX_INPUT_BYTES: usize = 10_000;

/// Clean a description for prediction and echoing back to clients
pub fn sanitize_text(raw: &str) -> String {
    let visible = remove_control_characters(&remove_invisible_unicode(raw));
    escape_html(visible.trim())
}

/// Remove zero-width and invisible Unicode characters
fn remove_invisible_unicode(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(
                *c,
                '\u{200B}'..='\u{200F}'  // Zero-width chars
                | '\u{202A}'..='\u{202E}' // Directional formatting
                | '\u{2060}'..='\u{2064}' // Invisible operators
                | '\u{2066}'..='\u{2069}' // Directional isolates
                | '\u{FEFF}'              // BOM
                | '\u{00AD}'              // Soft hyphen
                | '\u{034F}'              // Combining grapheme joiner
                | '\u{180E}'              // Mongolian vowel separator
            )
        })
        .collect()
}

/// Remove control characters; newlines and tabs become spaces
fn remove_control_characters(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Escape `&`, `<` and `>` (quotes are left alone, they are common in descriptions)
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_invisible_unicode() {
        assert_eq!(sanitize_text("Lunch\u{200B} Rs.\u{FEFF} 500"), "Lunch Rs. 500");
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(sanitize_text("Taxi\x00\x07 Rs. 200"), "Taxi Rs. 200");
        assert_eq!(sanitize_text("line one\nline two"), "line one line two");
    }

    #[test]
    fn escapes_html() {
        assert_eq!(
            sanitize_text("<script>alert(1)</script> Rs. 5"),
            "&lt;script&gt;alert(1)&lt;/script&gt; Rs. 5"
        );
        assert_eq!(sanitize_text("Fish & chips"), "Fish &amp; chips");
        assert_eq!(sanitize_text("Joe's \"lunch\""), "Joe's \"lunch\"");
    }

    #[test]
    fn trims_and_keeps_unicode_text() {
        assert_eq!(sanitize_text("   Diesel 20L – LKR 8,000  "), "Diesel 20L – LKR 8,000");
        assert_eq!(sanitize_text("Movie ₹500 🍿"), "Movie ₹500 🍿");
        assert_eq!(sanitize_text(""), "");
        assert_eq!(sanitize_text(" \u{200B}\t "), "");
    }
}
