//! Tag normalization for post keywords

use std::collections::BTreeSet;

/// Split a comma-separated tag string into distinct, trimmed, lower-cased names.
///
/// Empty entries (`"a,,b"`, trailing commas) are dropped. The result is sorted.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
