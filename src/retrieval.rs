//! The retrieval pipeline for one query.
//!
//! resolve location → allow-list → seeds → concurrent fetch → relevance
//! filter → rank. Every stage degrades to fewer documents instead of failing,
//! so the only observable failure is an empty result.

use crate::config::RetrievalConfig;
use crate::error::FetchResult;
use crate::fetcher::{FanOut, HttpFetch, HttpFetcher, fetch_all};
use crate::filter::{RelevanceFilter, RelevanceFilterConfig};
use crate::location::resolve;
use crate::ranking::{MAX_RESULTS, ScoringContext, rank};
use crate::results::RetrievedDocument;
use crate::search::{self, WebSearcher};
use crate::seeds::{SeedGenerator, base_allowed_domains};
use std::sync::Arc;
use tokio::time::{Instant, timeout_at};

/// Runs retrievals with a fixed configuration and reusable HTTP client
pub struct Retriever {
    config: RetrievalConfig,
    fetcher: Arc<dyn HttpFetch>,
    searcher: Option<Box<dyn WebSearcher>>,
}

impl Retriever {
    /// Build a retriever with a reqwest client and the configured search provider
    pub fn new(config: RetrievalConfig) -> FetchResult<Self> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.fetch_timeout())?;
        let searcher = search::from_config(config.search.as_ref());
        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            searcher,
        })
    }

    /// Replace the HTTP fetcher
    pub fn with_fetcher(mut self, fetcher: Arc<dyn HttpFetch>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replace (or disable, with `None`) the search provider
    pub fn with_searcher(mut self, searcher: Option<Box<dyn WebSearcher>>) -> Self {
        self.searcher = searcher;
        self
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Ranked authoritative documents for a location and question, at most
    /// `max_results` (never more than six) long and possibly empty.
    ///
    /// Search and fetching share `total_timeout_secs`; search may use at most
    /// half of it.
    pub async fn fetch_authoritative(&self, location: &str, question: &str) -> Vec<RetrievedDocument> {
        let debug = self.config.debug;
        let started = Instant::now();
        let deadline = started + self.config.total_timeout();
        let search_deadline = started + self.config.total_timeout() / 2;
        let resolved = resolve(location);

        let base_allow = base_allowed_domains();
        let local_allow: Vec<String> = resolved
            .allowed_domains
            .iter()
            .filter(|d| !base_allow.contains(*d))
            .cloned()
            .collect();
        let allowed: Vec<String> = base_allow.iter().chain(&local_allow).cloned().collect();

        if debug {
            ::log::info!(
                "Resolved {:?}: state={:?} places={:?} allow-list={:?}",
                location,
                resolved.state_code,
                resolved.matched_places,
                allowed
            );
        }

        let mut generator = SeedGenerator::new()
            .with_hit_restriction(self.config.strict_local)
            .with_debug(debug);
        if let Some(searcher) = self.searcher.as_deref() {
            let per_query = self
                .config
                .search
                .as_ref()
                .map(|s| s.max_results_per_query)
                .unwrap_or(5);
            generator = generator.with_searcher(searcher, per_query);
        }
        let seeds = match timeout_at(
            search_deadline,
            generator.generate(location, question, &resolved, &allowed),
        )
        .await
        {
            Ok(seeds) => seeds,
            Err(_) => {
                ::log::warn!(
                    "Search for {:?} ran out of time; using fixed and curated seeds",
                    location
                );
                SeedGenerator::new()
                    .generate(location, question, &resolved, &allowed)
                    .await
            }
        };

        if seeds.is_empty() {
            ::log::info!("No seed URLs for {:?}", location);
            return Vec::new();
        }

        let limits = FanOut {
            max_concurrency: self.config.max_concurrency,
            fetch_timeout: self.config.fetch_timeout(),
            total_timeout: deadline.saturating_duration_since(Instant::now()),
        };
        let docs = fetch_all(Arc::clone(&self.fetcher), seeds, limits).await;

        let filter = RelevanceFilter::new(RelevanceFilterConfig {
            allowed_domains: allowed,
            location: location.to_string(),
            strict_local: self.config.strict_local,
        });
        let docs = filter.apply(docs, debug);

        let ctx = ScoringContext::new(base_allow, local_allow, location);
        let limit = self.config.max_results.min(MAX_RESULTS);
        let ranked = rank(docs, &ctx, limit, debug);
        ::log::info!("Returning {} documents for {:?}", ranked.len(), location);
        ranked
    }
}

/// One-shot retrieval with a fresh [`Retriever`]; never fails, an unusable
/// configuration yields an empty list
pub async fn fetch_authoritative(
    location: &str,
    question: &str,
    config: &RetrievalConfig,
) -> Vec<RetrievedDocument> {
    match Retriever::new(config.clone()) {
        Ok(retriever) => retriever.fetch_authoritative(location, question).await,
        Err(e) => {
            ::log::error!("Could not build HTTP client: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SearchProvider, SearchProviderConfig};
    use crate::error::SearchResult;
    use crate::fetcher::tests::FakeFetcher;
    use crate::results::Tier;
    use crate::search::SearchHit;
    use crate::seeds::FEDERAL_SEEDS;
    use async_trait::async_trait;
    use std::time::Duration;

    const AUSTIN_CITY: &str = "https://www.austintexas.gov/department/water-quality-reports";
    const AUSTIN_TCEQ: &str = "https://www.tceq.texas.gov/drinkingwater/ccr";
    const EPA: &str = "https://www.epa.gov/ccr/ccr-information-consumers";
    const CDC: &str = "https://www.cdc.gov/drinking-water/advisories/index.html";

    struct StaticSearcher(Vec<&'static str>);

    #[async_trait]
    impl WebSearcher for StaticSearcher {
        async fn search(&self, _: &str, _: &[String], limit: usize) -> SearchResult<Vec<SearchHit>> {
            Ok(self
                .0
                .iter()
                .filter_map(|u| SearchHit::from_url(u, None))
                .take(limit)
                .collect())
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    struct SlowSearcher(Duration);

    #[async_trait]
    impl WebSearcher for SlowSearcher {
        async fn search(&self, _: &str, _: &[String], _: usize) -> SearchResult<Vec<SearchHit>> {
            tokio::time::sleep(self.0).await;
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    fn page(title: &str, body: &str) -> String {
        format!(
            "<html><head><title>{}</title></head><body><main>{}</main></body></html>",
            title, body
        )
    }

    fn retriever(fetcher: FakeFetcher, config: RetrievalConfig) -> Retriever {
        Retriever::new(config)
            .unwrap()
            .with_fetcher(Arc::new(fetcher))
            .with_searcher(None)
    }

    fn austin_fetcher() -> FakeFetcher {
        FakeFetcher::new()
            .html(
                AUSTIN_CITY,
                &page(
                    "Austin Water Quality Report 2024",
                    "Austin Water serves Austin, Texas with safe tap water.",
                ),
            )
            .respond(AUSTIN_TCEQ, 200, "image/png", b"\x89PNG")
            .html(EPA, &page("Consumer Confidence Reports", "Find your annual report."))
    }

    #[tokio::test]
    async fn test_unknown_location_with_failed_fetches_is_empty() {
        let fetcher = Arc::new(FakeFetcher::new());
        let retriever = Retriever::new(RetrievalConfig::default())
            .unwrap()
            .with_fetcher(fetcher.clone())
            .with_searcher(None);

        let docs = retriever
            .fetch_authoritative("Nowhere, ZZ", "is my water safe")
            .await;

        assert!(docs.is_empty());
        let mut requested = fetcher.requested.lock().unwrap().clone();
        requested.sort();
        let mut expected: Vec<String> = FEDERAL_SEEDS.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(requested, expected);
    }

    #[tokio::test]
    async fn test_local_document_ranks_first_and_unsupported_is_dropped() {
        let retriever = retriever(austin_fetcher(), RetrievalConfig::default());
        let docs = retriever
            .fetch_authoritative("Austin, TX", "is the tap water safe")
            .await;

        let urls: Vec<&str> = docs.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, vec![AUSTIN_CITY, EPA]);
        assert_eq!(docs[0].tier(), Tier::State);
        assert_eq!(docs[0].score, Some(6));
        assert_eq!(docs[1].tier(), Tier::Federal);
        assert_eq!(docs[1].score, Some(3));
    }

    #[tokio::test]
    async fn test_strict_mode_drops_off_list_search_hits() {
        let blog = "https://kxan.com/austin-boil-notice";
        let fetcher = || austin_fetcher().html(blog, &page("Austin boil notice lifted", "Austin Water"));
        let searcher = || Some(Box::new(StaticSearcher(vec![blog])) as Box<dyn WebSearcher>);

        let strict = retriever(fetcher(), RetrievalConfig::default()).with_searcher(searcher());
        let docs = strict.fetch_authoritative("Austin, TX", "").await;
        assert!(docs.iter().all(|d| d.url != blog));

        let config = RetrievalConfig {
            strict_local: false,
            ..RetrievalConfig::default()
        };
        let relaxed = retriever(fetcher(), config).with_searcher(searcher());
        let docs = relaxed.fetch_authoritative("Austin, TX", "").await;
        let blog_doc = docs.iter().find(|d| d.url == blog).unwrap();
        assert_eq!(blog_doc.tier(), Tier::Other);
        // location 2 + safety 2
        assert_eq!(blog_doc.score, Some(4));
    }

    #[tokio::test]
    async fn test_results_are_capped() {
        let hits: Vec<&'static str> = vec![
            "https://www.austintexas.gov/a",
            "https://www.austintexas.gov/b",
            "https://www.austintexas.gov/c",
            "https://www.austintexas.gov/d",
            "https://www.austintexas.gov/e",
        ];
        let mut fetcher = austin_fetcher().html(CDC, &page("Advisories", "Drinking water advisories"));
        for url in &hits {
            fetcher = fetcher.html(url, &page("Austin notice", "Austin Water"));
        }
        let config = RetrievalConfig {
            search: Some(SearchProviderConfig::new(
                SearchProvider::Serper,
                "unused",
            )),
            ..RetrievalConfig::default()
        };

        let retriever = retriever(fetcher, config).with_searcher(Some(Box::new(StaticSearcher(hits))));
        let docs = retriever.fetch_authoritative("Austin, TX", "").await;

        assert_eq!(docs.len(), 6);
        assert!(docs.windows(2).all(|w| w[0].score >= w[1].score));
        for doc in &docs {
            let host = doc.host().unwrap();
            let expected = if host.ends_with("epa.gov") || host.ends_with("cdc.gov") {
                Tier::Federal
            } else {
                Tier::State
            };
            assert_eq!(doc.tier(), expected, "{}", doc.url);
        }
    }

    #[tokio::test]
    async fn test_configured_limit_never_exceeds_six() {
        let hits: Vec<&'static str> = vec![
            "https://www.austintexas.gov/a",
            "https://www.austintexas.gov/b",
            "https://www.austintexas.gov/c",
            "https://www.austintexas.gov/d",
            "https://www.austintexas.gov/e",
            "https://www.austintexas.gov/f",
            "https://www.austintexas.gov/g",
            "https://www.austintexas.gov/h",
        ];
        let mut fetcher = austin_fetcher().html(CDC, &page("Advisories", "Drinking water advisories"));
        for url in &hits {
            fetcher = fetcher.html(url, &page("Austin notice", "Austin Water"));
        }
        let mut search = SearchProviderConfig::new(SearchProvider::Tavily, "unused");
        search.max_results_per_query = 10;
        let config = RetrievalConfig {
            max_results: 10,
            search: Some(search),
            ..RetrievalConfig::default()
        };

        let capped = retriever(fetcher, config).with_searcher(Some(Box::new(StaticSearcher(hits))));
        let docs = capped.fetch_authoritative("Austin, TX", "").await;
        assert_eq!(docs.len(), MAX_RESULTS);

        let config = RetrievalConfig {
            max_results: 1,
            ..RetrievalConfig::default()
        };
        let docs = retriever(austin_fetcher(), config)
            .fetch_authoritative("Austin, TX", "")
            .await;
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_slow_search_counts_against_total_budget() {
        let config = RetrievalConfig {
            total_timeout_secs: 2,
            ..RetrievalConfig::default()
        };
        let searcher = SlowSearcher(Duration::from_millis(1500));
        let retriever = retriever(austin_fetcher(), config).with_searcher(Some(Box::new(searcher)));

        let started = std::time::Instant::now();
        let docs = retriever.fetch_authoritative("Austin, TX", "").await;
        let elapsed = started.elapsed();

        assert!(elapsed < Duration::from_millis(1900), "took {:?}", elapsed);
        // Fixed and curated seeds are still fetched after search is cut off
        let urls: Vec<&str> = docs.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, vec![AUSTIN_CITY, EPA]);
    }

    #[tokio::test]
    async fn test_total_budget_fails_open() {
        let fetcher = austin_fetcher().delay(AUSTIN_CITY, Duration::from_secs(5));
        let config = RetrievalConfig {
            total_timeout_secs: 1,
            ..RetrievalConfig::default()
        };

        let docs = retriever(fetcher, config)
            .fetch_authoritative("Austin, TX", "")
            .await;
        let urls: Vec<&str> = docs.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, vec![EPA]);
    }

    #[tokio::test]
    async fn test_free_function_uses_config() {
        let config = RetrievalConfig {
            total_timeout_secs: 0,
            max_results: 0,
            ..RetrievalConfig::default()
        };
        assert!(fetch_authoritative("Nowhere, ZZ", "", &config).await.is_empty());
    }
}
