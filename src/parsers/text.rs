use crate::utils::truncate_chars;

/// Maximum snippet length in characters
pub const SNIPPET_CHARS: usize = 400;

/// Collapses every run of whitespace (including newlines) into one space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lead excerpt of already-cleaned text
pub fn snippet(text: &str) -> String {
    truncate_chars(text, SNIPPET_CHARS)
}

/// First non-blank line, whitespace-collapsed and truncated to `max` characters
pub fn first_line(text: &str, max: usize) -> Option<String> {
    text.lines()
        .map(collapse_whitespace)
        .find(|line| !line.is_empty())
        .map(|line| truncate_chars(&line, max))
}
