use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

lazy_static! {
    static ref DECIMAL_REGEX: Regex = Regex::new(r"^([0-9]+)(?:\.[0-9]+)?$").unwrap();
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// Remove thousands separators and any whitespace (including NBSP) from a
/// locale-formatted number.
pub fn strip_thousands_separators(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect()
}

/// Parse text such as `"156,868"` into `156868`.
///
/// A fractional part is dropped (`"36.12"` becomes `36`). Empty cells,
/// signs and anything else non-numeric are rejected.
pub fn parse_grouped_integer(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    let cleaned = strip_thousands_separators(raw);

    if cleaned.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }

    if let Some(rest) = cleaned.strip_prefix('-') {
        if DECIMAL_REGEX.is_match(rest) {
            return Err(ValidationError::Negative {
                field,
                value: cleaned,
            });
        }
    }

    let Some(whole) = DECIMAL_REGEX.captures(&cleaned).and_then(|c| c.get(1)) else {
        return Err(ValidationError::NotANumber {
            field,
            raw: raw.to_string(),
        });
    };

    // Digits only, so the only possible failure is overflow
    whole.as_str().parse::<i64>().map_err(|_| ValidationError::NotANumber {
        field,
        raw: raw.to_string(),
    })
}

/// Collapse runs of whitespace and trim, for titles and descriptions.
pub fn normalize_text(raw: &str) -> String {
    WHITESPACE_REGEX.replace_all(raw.trim(), " ").into_owned()
}

/// First `max_chars` characters of `text`, for log context.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
