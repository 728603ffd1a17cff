use crate::parsers::text::{SNIPPET_CHARS, collapse_whitespace, first_line, snippet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Boil\n\n water\t notice  "), "Boil water notice");
        assert_eq!(collapse_whitespace(" \n\t "), "");
    }

    #[test]
    fn test_snippet_counts_chars_not_bytes() {
        let text = "é".repeat(SNIPPET_CHARS + 10);
        let s = snippet(&text);
        assert_eq!(s.chars().count(), SNIPPET_CHARS);
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn test_first_line_skips_blank_lines() {
        let text = "\n   \n  Annual   Water Report \nsecond line";
        assert_eq!(first_line(text, 120).as_deref(), Some("Annual Water Report"));
        assert_eq!(first_line(text, 6).as_deref(), Some("Annual"));
        assert_eq!(first_line(" \n ", 120), None);
    }
}
