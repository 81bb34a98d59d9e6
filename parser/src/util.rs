//! Shared text helpers for device output parsing.

/// Minimum run of dashes that counts as a separator line.
pub const MIN_SEPARATOR_LEN: usize = 8;

/// Collapses every run of whitespace to a single space and trims both ends.
///
/// Newlines count as whitespace, so a multi-line block becomes one line.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns `true` when the line is only dashes (ignoring surrounding
/// whitespace) and at least [`MIN_SEPARATOR_LEN`] long.
pub fn is_dash_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= MIN_SEPARATOR_LEN && trimmed.chars().all(|ch| ch == '-')
}

/// Returns `true` when `line` starts with `name` followed by whitespace or
/// end-of-line.
///
/// Keeps `GE1/0/1` from matching a line that starts with `GE1/0/10`.
pub fn starts_with_name(line: &str, name: &str) -> bool {
    if name.is_empty() || !line.starts_with(name) {
        return false;
    }
    line[name.len()..]
        .chars()
        .next()
        .is_none_or(|ch| ch.is_whitespace())
}

/// Removes every hyphen from a detail block and splits it into lines.
///
/// An absent block yields a single empty line.
pub fn strip_separator_hyphens(block: Option<&str>) -> Vec<String> {
    match block {
        Some(text) => text.replace('-', "").split('\n').map(String::from).collect(),
        None => vec![String::new()],
    }
}
