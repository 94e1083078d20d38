use serde_json::Value;

use crate::error::NormalizationError;

const FENCE: &str = "```";

/// Strip markdown code fences wrapped around a model reply.
///
/// Only an exact ```` ``` ```` token at the very start (optionally followed by a
/// language tag such as `json`, which must start with a letter) and at the very end is removed. Fences that
/// appear mid-text are left alone. Stripping repeats until nothing changes, so
/// the result is a fixed point.
pub fn strip_fences(text: &str) -> &str {
    let mut current = text.trim();
    loop {
        let next = strip_once(current);
        if next.len() == current.len() {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> &str {
    let mut s = text.trim();

    if let Some(rest) = s.strip_prefix(FENCE) {
        // Tags start with a letter, so a bare number after the fence stays content.
        let tag_len = if rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
            rest.find(|c: char| !is_tag_char(c)).unwrap_or(rest.len())
        } else {
            0
        };
        let after_tag = &rest[tag_len..];
        // A tag only counts when the opener line ends right after it.
        s = if tag_len > 0 && (after_tag.is_empty() || after_tag.starts_with(char::is_whitespace)) {
            after_tag
        } else {
            rest
        };
    }

    if let Some(rest) = s.strip_suffix(FENCE) {
        s = rest;
    }

    s.trim()
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')
}

/// Turn a raw model reply into a JSON value.
///
/// Any valid JSON is accepted (objects, arrays, scalars); shape checks belong
/// to the post-processors.
pub fn normalize(raw: &str) -> Result<Value, NormalizationError> {
    let cleaned = strip_fences(raw);
    if cleaned.is_empty() {
        log::warn!("⚠️ Model reply is empty after cleaning");
        return Err(NormalizationError::UnparsableText);
    }

    serde_json::from_str(cleaned).map_err(|e| {
        log::warn!("⚠️ Model reply is not valid JSON: {}", e);
        log::debug!("📄 Unparsable reply: {}", raw);
        NormalizationError::UnparsableText
    })
}
