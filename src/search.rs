//! External search providers used to discover extra seed URLs.
//!
//! Search is optional: with no provider configured the seed generator uses
//! curated seeds only. Every provider restricts results to a domain
//! allow-list.

use crate::config::{SearchProvider, SearchProviderConfig};
use crate::error::{SearchError, SearchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// A candidate URL returned by a search provider
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub url: Url,
    pub title: Option<String>,
}

impl SearchHit {
    /// Build a hit from a URL string, dropping anything that does not parse
    pub fn from_url(url: &str, title: Option<String>) -> Option<Self> {
        Url::parse(url).ok().map(|url| Self { url, title })
    }
}

/// Search capability restricted to a domain allow-list
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search for `query`, returning at most `limit` hits on `domains`
    async fn search(
        &self,
        query: &str,
        domains: &[String],
        limit: usize,
    ) -> SearchResult<Vec<SearchHit>>;

    fn name(&self) -> &str;
}

/// Build the configured searcher, if any
pub fn from_config(config: Option<&SearchProviderConfig>) -> Option<Box<dyn WebSearcher>> {
    let config = config?;
    if config.api_key.trim().is_empty() {
        return None;
    }
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .ok()?;

    let searcher: Box<dyn WebSearcher> = match config.provider {
        SearchProvider::Tavily => Box::new(TavilySearcher {
            client,
            endpoint: config.endpoint().to_string(),
            api_key: config.api_key.clone(),
        }),
        SearchProvider::Serper => Box::new(SerperSearcher {
            client,
            endpoint: config.endpoint().to_string(),
            api_key: config.api_key.clone(),
        }),
    };
    Some(searcher)
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    include_domains: &'a [String],
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    url: String,
    title: Option<String>,
}

/// Tavily search API
pub struct TavilySearcher {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[async_trait]
impl WebSearcher for TavilySearcher {
    async fn search(
        &self,
        query: &str,
        domains: &[String],
        limit: usize,
    ) -> SearchResult<Vec<SearchHit>> {
        let request = TavilyRequest {
            query,
            search_depth: "basic",
            include_domains: domains,
            max_results: limit,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status().as_u16()));
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;

        Ok(body
            .results
            .into_iter()
            .filter_map(|r| SearchHit::from_url(&r.url, r.title))
            .take(limit)
            .collect())
    }

    fn name(&self) -> &str {
        "tavily"
    }
}

#[derive(Debug, Serialize)]
struct SerperRequest {
    q: String,
    num: usize,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, Deserialize)]
struct SerperResult {
    link: String,
    title: Option<String>,
}

/// Serper (Google) search API; the domain restriction is expressed with `site:` operators
pub struct SerperSearcher {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

/// Append `(site:a OR site:b)` to a query
pub fn with_site_filter(query: &str, domains: &[String]) -> String {
    if domains.is_empty() {
        return query.to_string();
    }
    let sites = domains
        .iter()
        .map(|d| format!("site:{}", d))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("{} ({})", query, sites)
}

#[async_trait]
impl WebSearcher for SerperSearcher {
    async fn search(
        &self,
        query: &str,
        domains: &[String],
        limit: usize,
    ) -> SearchResult<Vec<SearchHit>> {
        let request = SerperRequest {
            q: with_site_filter(query, domains),
            num: limit,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status().as_u16()));
        }

        let body: SerperResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;

        Ok(body
            .organic
            .into_iter()
            .filter_map(|r| SearchHit::from_url(&r.link, r.title))
            .take(limit)
            .collect())
    }

    fn name(&self) -> &str {
        "serper"
    }
}
