use crate::location::tokenize;
use crate::results::RetrievedDocument;
use crate::utils::{host_in, host_of};
use serde::{Deserialize, Serialize};

/// Minimum length of a location token that counts toward a strong match
const MIN_TOKEN_LEN: usize = 3;

/// Location tokens used for strong-match tests: alphanumeric runs of length ≥ 3
pub fn location_tokens(location: &str) -> Vec<String> {
    tokenize(location)
        .into_iter()
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .collect()
}

/// Hits needed for a strong match: `min(2, max(1, floor(tokens / 2)))`
pub fn required_hits(token_count: usize) -> usize {
    (token_count / 2).max(1).min(2)
}

/// True when enough location tokens occur (as substrings) in the haystack
pub fn strong_location_match(location: &str, haystack: &str) -> bool {
    let tokens = location_tokens(location);
    let haystack = haystack.to_lowercase();
    let hits = tokens.iter().filter(|t| haystack.contains(t.as_str())).count();
    hits >= required_hits(tokens.len())
}

/// Configuration for relevance filtering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceFilterConfig {
    /// Domains (and their subdomains) whose documents are always kept
    pub allowed_domains: Vec<String>,

    /// Free-text location used for the strong-match fallback
    pub location: String,

    /// When set, only allow-listed hosts survive
    #[serde(default = "default_strict_local")]
    pub strict_local: bool,
}

fn default_strict_local() -> bool {
    true
}

/// Single-pass, order-preserving document filter
#[derive(Debug)]
pub struct RelevanceFilter {
    config: RelevanceFilterConfig,
}

impl RelevanceFilter {
    pub fn new(config: RelevanceFilterConfig) -> Self {
        Self { config }
    }

    /// Determine if a document should be kept
    pub fn keeps(&self, doc: &RetrievedDocument) -> bool {
        if self.is_in_domain_scope(&doc.url) {
            return true;
        }
        if self.config.strict_local {
            return false;
        }
        strong_location_match(&self.config.location, &doc.haystack())
    }

    /// Check if a URL's host is on the allow-list
    fn is_in_domain_scope(&self, url: &str) -> bool {
        host_of(url).is_some_and(|host| host_in(&host, &self.config.allowed_domains))
    }

    /// Keep matching documents in their original order
    pub fn apply(&self, docs: Vec<RetrievedDocument>, debug: bool) -> Vec<RetrievedDocument> {
        let before = docs.len();
        let kept: Vec<RetrievedDocument> = docs
            .into_iter()
            .filter(|doc| {
                let keep = self.keeps(doc);
                if !keep {
                    if debug {
                        ::log::info!("Filter dropped {} ({:?})", doc.url, doc.title);
                    } else {
                        ::log::debug!("Filter dropped {}", doc.url);
                    }
                }
                keep
            })
            .collect();

        ::log::debug!(
            "Relevance filter kept {} of {} documents (strict_local: {})",
            kept.len(),
            before,
            self.config.strict_local
        );
        kept
    }
}
