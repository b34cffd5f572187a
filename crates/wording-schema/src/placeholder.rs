#![forbid(unsafe_code)]

//! `{name}` placeholder extraction from template text.
//!
//! The scanner walks the text once: a `{` opens a capture, a `}` closes
//! it, and a `{` inside an open capture restarts it. Captured names are
//! trimmed of interior whitespace padding. Malformed syntax (unmatched
//! braces, empty `{}`) yields no token and is silently ignored — a
//! half-typed placeholder must never break the editor.

/// Extract placeholder names from `text`, trimmed, deduplicated, in
/// first-occurrence order.
#[must_use]
pub fn extract_placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut capture: Option<String> = None;
    for ch in text.chars() {
        match ch {
            '{' => capture = Some(String::new()),
            '}' => {
                if let Some(body) = capture.take() {
                    let name = body.trim();
                    if !name.is_empty() && !names.iter().any(|n| n == name) {
                        names.push(name.to_string());
                    }
                }
            }
            _ => {
                if let Some(buf) = capture.as_mut() {
                    buf.push(ch);
                }
            }
        }
    }
    names
}

/// Extracted names, sorted — used for order-independent comparison
/// against a stored parameter map.
#[must_use]
pub fn placeholder_set(text: &str) -> Vec<String> {
    let mut names = extract_placeholders(text);
    names.sort();
    names
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
