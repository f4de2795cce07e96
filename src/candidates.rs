// Candidate handle generation from a display name.
//
// When all we have is "Jane Doe", we guess the handles a person with that
// name would plausibly register: janedoe, jane-doe, jane.doe, jane_doe,
// janedoeofficial, janedoe_official, janedoe1, jdoe, doejd. This is a pure
// string transformation. It knows nothing about which platforms accept which
// characters; the fetchers simply come back empty for invalid handles.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex_lite::Regex;

/// Default cap on generated candidates.
pub const DEFAULT_MAX_CANDIDATES: usize = 50;

static SEPARATOR_RUN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"[._-]{2,}").unwrap()
});

const SEPARATORS: &[char] = &['.', '_', '-'];

/// Collapse every run of separators to its first character, then strip
/// separators from both ends.
fn normalize(candidate: &str) -> String {
    let collapsed = SEPARATOR_RUN.replace_all(candidate, |caps: &regex_lite::Captures| {
        caps[0].chars().next().map(String::from).unwrap_or_default()
    });
    collapsed.trim_matches(SEPARATORS).to_string()
}

/// Generate handle candidates for a display name, in generation order,
/// deduplicated and truncated to `max_candidates`.
pub fn handle_candidates(full_name: &str, max_candidates: usize) -> Vec<String> {
    let parts: Vec<String> = full_name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    let Some(last) = parts.last() else {
        return Vec::new();
    };

    let joined = parts.concat();
    let initials: String = parts.iter().filter_map(|p| p.chars().next()).collect();

    let variants = [
        joined.clone(),
        parts.join("-"),
        parts.join("."),
        parts.join("_"),
        format!("{joined}official"),
        format!("{joined}_official"),
        format!("{joined}1"),
        format!("{initials}{last}"),
        format!("{last}{initials}"),
    ];

    let mut seen = HashSet::new();
    variants
        .iter()
        .map(|v| normalize(v))
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.clone()))
        .take(max_candidates)
        .collect()
}
