use url::Url;

/// Lower-cased hostname of a URL string, if it parses and has one
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
}

/// True when `host` equals `domain` or is one of its subdomains
pub fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return false;
    }
    host == domain
        || host
            .strip_suffix(&domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// True when `host` matches any domain in `domains`
pub fn host_in<'a, I>(host: &str, domains: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    domains.into_iter().any(|d| host_matches(host, d))
}

/// Hostname with a leading `www.` removed
pub fn display_host(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Take at most `max` characters (not bytes) from `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_matches() {
        assert!(host_matches("epa.gov", "epa.gov"));
        assert!(host_matches("www.epa.gov", "epa.gov"));
        assert!(host_matches("WWW.EPA.GOV", "epa.gov"));
        assert!(!host_matches("notepa.gov", "epa.gov"));
        assert!(!host_matches("epa.gov.evil.com", "epa.gov"));
        assert!(!host_matches("epa.gov", ""));
    }

    #[test]
    fn test_host_of() {
        assert_eq!(
            host_of("https://WWW.Austintexas.gov/water"),
            Some("www.austintexas.gov".to_string())
        );
        assert_eq!(host_of("not a url"), None);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
