//! Shared utility functions

use chrono::{DateTime, Utc};

/// Escape character used in LIKE patterns built by [`like_pattern`]
pub const LIKE_ESCAPE: char = '\\';

/// Parse a datetime string (RFC3339 format) or return current time
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Build a `%word%` LIKE pattern with wildcards in `word` escaped
///
/// The caller must pair the pattern with `ESCAPE '\'`.
pub fn like_pattern(word: &str) -> String {
    let mut pattern = String::with_capacity(word.len() + 2);
    pattern.push('%');
    for c in word.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
