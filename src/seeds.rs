//! Candidate URL generation.
//!
//! Seeds come from three places, in discovery order: the fixed federal
//! pages, one curated page per recognized state/municipal domain group, and
//! optionally an external search restricted to the allow-list.

use crate::location::ResolvedLocation;
use crate::search::WebSearcher;
use crate::utils::{host_in, host_of};
use std::collections::HashSet;
use url::Url;

/// Domains trusted for every location
pub const BASE_ALLOWED_DOMAINS: &[&str] = &["epa.gov", "cdc.gov"];

/// Always-fetched federal pages: EPA consumer report portal and CDC advisories
pub const FEDERAL_SEEDS: &[&str] = &[
    "https://www.epa.gov/ccr/ccr-information-consumers",
    "https://www.cdc.gov/drinking-water/advisories/index.html",
];

/// One curated page per domain group, keyed by the allowed domain that enables it
const CURATED_SEEDS: &[(&str, &str)] = &[
    (
        "nyc.gov",
        "https://www.nyc.gov/site/dep/water/drinking-water-quality-reports.page",
    ),
    (
        "cityofflint.com",
        "https://www.cityofflint.com/public-works/water-plant/",
    ),
    (
        "jacksonms.gov",
        "https://www.jacksonms.gov/water-sewer-operations/",
    ),
    (
        "austintexas.gov",
        "https://www.austintexas.gov/department/water-quality-reports",
    ),
    (
        "pgh2o.com",
        "https://www.pgh2o.com/your-water/water-quality",
    ),
    (
        "michigan.gov",
        "https://www.michigan.gov/egle/about/organization/drinking-water-and-environmental-health",
    ),
    (
        "msdh.ms.gov",
        "https://msdh.ms.gov/page/30,0,76.html",
    ),
    (
        "waterboards.ca.gov",
        "https://www.waterboards.ca.gov/drinking_water/certlic/drinkingwater/",
    ),
    (
        "tceq.texas.gov",
        "https://www.tceq.texas.gov/drinkingwater/ccr",
    ),
    (
        "floridahealth.gov",
        "https://www.floridahealth.gov/environmental-health/drinking-water/",
    ),
    (
        "dep.pa.gov",
        "https://www.dep.pa.gov/Citizens/My-Water/PublicDrinkingWater/Pages/default.aspx",
    ),
];

/// Fixed phrases combined with the location for templated search queries
const QUERY_PHRASES: &[&str] = &[
    "Consumer Confidence Report",
    "drinking water report",
    "boil water notice",
];

/// Base allow-list as owned strings
pub fn base_allowed_domains() -> Vec<String> {
    BASE_ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect()
}

/// Normalize a candidate URL: http(s) only, fragment removed
pub fn normalize_seed(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.host_str()?;
    url.set_fragment(None);
    Some(url.to_string())
}

/// Insertion-ordered URL set
#[derive(Debug, Default)]
pub struct SeedSet {
    seen: HashSet<String>,
    urls: Vec<String>,
}

impl SeedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a URL; returns false when it is invalid or already present
    pub fn insert(&mut self, raw: &str) -> bool {
        match normalize_seed(raw) {
            Some(url) if self.seen.insert(url.clone()) => {
                self.urls.push(url);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.urls
    }
}

/// Curated seeds enabled by the resolved location's domains
pub fn curated_seeds(resolved: &ResolvedLocation) -> Vec<String> {
    CURATED_SEEDS
        .iter()
        .filter(|(domain, _)| resolved.allowed_domains.contains(*domain))
        .map(|(_, url)| url.to_string())
        .collect()
}

/// Templated search queries for a location and question
pub fn search_queries(location: &str, question: &str) -> Vec<String> {
    let location = location.trim();
    let question = question.trim();
    let mut queries = Vec::new();

    if !question.is_empty() {
        queries.push(format!("{} {}", question, location).trim().to_string());
    }
    if !location.is_empty() {
        for phrase in QUERY_PHRASES {
            queries.push(format!("{} {}", location, phrase));
        }
    }
    queries
}

/// Generates the candidate URL set for one retrieval run
pub struct SeedGenerator<'a> {
    searcher: Option<&'a dyn WebSearcher>,
    max_results_per_query: usize,
    restrict_hits: bool,
    debug: bool,
}

impl<'a> SeedGenerator<'a> {
    /// Create a generator that only uses fixed and curated seeds
    pub fn new() -> Self {
        Self {
            searcher: None,
            max_results_per_query: 5,
            restrict_hits: true,
            debug: false,
        }
    }

    /// Enable the external search step
    pub fn with_searcher(mut self, searcher: &'a dyn WebSearcher, max_results: usize) -> Self {
        self.searcher = Some(searcher);
        self.max_results_per_query = max_results;
        self
    }

    /// Drop search hits whose host is not allow-listed (on by default)
    pub fn with_hit_restriction(mut self, restrict: bool) -> Self {
        self.restrict_hits = restrict;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Produce deduplicated seeds; `allowed` is the full base + local allow-list
    pub async fn generate(
        &self,
        location: &str,
        question: &str,
        resolved: &ResolvedLocation,
        allowed: &[String],
    ) -> Vec<String> {
        let mut seeds = SeedSet::new();

        for url in FEDERAL_SEEDS {
            seeds.insert(url);
        }
        for url in curated_seeds(resolved) {
            seeds.insert(&url);
        }

        if let Some(searcher) = self.searcher {
            for query in search_queries(location, question) {
                let hits = match searcher
                    .search(&query, allowed, self.max_results_per_query)
                    .await
                {
                    Ok(hits) => hits,
                    Err(e) => {
                        if self.debug {
                            ::log::warn!("{} search failed for {:?}: {}", searcher.name(), query, e);
                        }
                        continue;
                    }
                };

                for hit in hits {
                    let url = hit.url.as_str();
                    let on_allow_list = host_of(url).is_some_and(|h| host_in(&h, allowed));
                    if self.restrict_hits && !on_allow_list {
                        if self.debug {
                            ::log::info!("Ignoring search hit outside allow-list: {}", url);
                        }
                        continue;
                    }
                    seeds.insert(url);
                }
            }
        }

        ::log::debug!("Generated {} seed URLs for {:?}", seeds.len(), location);
        seeds.into_vec()
    }
}

impl Default for SeedGenerator<'_> {
    fn default() -> Self {
        Self::new()
    }
}
