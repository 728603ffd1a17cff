//! Document fetching.
//!
//! [`fetch_document`] does one GET, classifies the response and runs the
//! matching parser, reporting every failure as a [`FetchError`].
//! [`fetch_and_parse`] is the per-URL boundary that turns those failures into
//! `None`, and [`fetch_all`] fans it out over a seed list.

use crate::dates::parse_http_date;
use crate::error::{FetchError, FetchResult, ParseError};
use crate::parsers::text::snippet;
use crate::parsers::{Parser, ParserType};
use crate::results::RetrievedDocument;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderName, LAST_MODIFIED};
use reqwest::redirect::Policy;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout, timeout_at};

/// Largest response body read before the document is abandoned
pub const MAX_BODY_BYTES: usize = 15 * 1024 * 1024;

/// Raw HTTP response as seen by the parser stage
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub last_modified: Option<String>,
    pub body: Vec<u8>,
}

/// HTTP GET capability
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(&self, url: &str) -> FetchResult<FetchResponse>;
}

/// reqwest-backed fetcher sending a fixed user agent
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, request_timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(Policy::limited(8))
            .timeout(request_timeout)
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for HttpFetcher {
    async fn get(&self, url: &str) -> FetchResult<FetchResponse> {
        ::log::debug!("GET {}", url);
        let mut response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Http(Box::new(e))
            }
        })?;

        let status = response.status().as_u16();
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        };
        let content_type = header(CONTENT_TYPE);
        let last_modified = header(LAST_MODIFIED);

        if response
            .content_length()
            .is_some_and(|len| len > MAX_BODY_BYTES as u64)
        {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                limit: MAX_BODY_BYTES,
            });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?
        {
            if body.len() + chunk.len() > MAX_BODY_BYTES {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    limit: MAX_BODY_BYTES,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(FetchResponse {
            status,
            content_type,
            last_modified,
            body,
        })
    }
}

/// Fetch and parse one URL, reporting why it produced nothing.
///
/// `fetch_timeout` bounds the request and the parse together.
pub async fn fetch_document(
    fetcher: &dyn HttpFetch,
    url: &str,
    fetch_timeout: Duration,
) -> FetchResult<RetrievedDocument> {
    timeout(fetch_timeout, load_document(fetcher, url))
        .await
        .map_err(|_| FetchError::Timeout {
            url: url.to_string(),
        })?
}

async fn load_document(fetcher: &dyn HttpFetch, url: &str) -> FetchResult<RetrievedDocument> {
    let response = fetcher.get(url).await?;

    if response.body.len() > MAX_BODY_BYTES {
        return Err(FetchError::TooLarge {
            url: url.to_string(),
            limit: MAX_BODY_BYTES,
        });
    }

    if !(200..300).contains(&response.status) {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }

    let content_type = response.content_type.clone().unwrap_or_default();
    let parser_type = ParserType::from_content_type(&content_type).ok_or_else(|| {
        FetchError::UnsupportedContentType {
            url: url.to_string(),
            content_type: content_type.clone(),
        }
    })?;

    // PDF extraction is CPU-bound; keep it off the async workers
    let body = response.body;
    let parsed = tokio::task::spawn_blocking(move || Parser::parse(&body, parser_type))
        .await
        .map_err(|e| ParseError::Task(e.to_string()))??;

    let published_at = parsed.published_at.or_else(|| {
        response
            .last_modified
            .as_deref()
            .and_then(parse_http_date)
    });

    let snippet = snippet(&parsed.text);
    Ok(RetrievedDocument::new(
        url.to_string(),
        parsed.title,
        parsed.text,
        snippet,
        parsed.content_type,
        published_at,
    ))
}

/// Fetch and parse one URL; any failure yields `None`
pub async fn fetch_and_parse(
    fetcher: &dyn HttpFetch,
    url: &str,
    fetch_timeout: Duration,
) -> Option<RetrievedDocument> {
    match fetch_document(fetcher, url, fetch_timeout).await {
        Ok(doc) => {
            ::log::debug!(
                "Fetched {} ({}, {} chars, tier {:?})",
                url,
                doc.content_type.as_mime(),
                doc.text.len(),
                doc.tier()
            );
            Some(doc)
        }
        Err(e @ FetchError::UnsupportedContentType { .. }) => {
            ::log::debug!("Dropping {}: {}", url, e);
            None
        }
        Err(e) => {
            ::log::warn!("Failed to fetch {}: {}", url, e);
            None
        }
    }
}

/// Limits for a fetch fan-out
#[derive(Debug, Clone, Copy)]
pub struct FanOut {
    pub max_concurrency: usize,
    pub fetch_timeout: Duration,
    pub total_timeout: Duration,
}

/// Fetch every URL concurrently and return the successes in input order.
///
/// At most `max_concurrency` fetches run at once. When `total_timeout`
/// elapses, outstanding fetches are abandoned and whatever already
/// succeeded is returned.
pub async fn fetch_all(
    fetcher: Arc<dyn HttpFetch>,
    urls: Vec<String>,
    limits: FanOut,
) -> Vec<RetrievedDocument> {
    let total = urls.len();
    let semaphore = Arc::new(Semaphore::new(limits.max_concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (index, url) in urls.into_iter().enumerate() {
        let fetcher = Arc::clone(&fetcher);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            let doc = fetch_and_parse(fetcher.as_ref(), &url, limits.fetch_timeout).await?;
            Some((index, doc))
        });
    }

    // One slot per URL keeps discovery order regardless of completion order
    let mut slots: Vec<Option<RetrievedDocument>> = (0..total).map(|_| None).collect();
    let deadline = Instant::now() + limits.total_timeout;

    loop {
        match timeout_at(deadline, tasks.join_next()).await {
            Ok(Some(Ok(Some((index, doc))))) => slots[index] = Some(doc),
            Ok(Some(Ok(None))) => {}
            Ok(Some(Err(e))) => ::log::warn!("Fetch task failed: {}", e),
            Ok(None) => break,
            Err(_) => {
                ::log::warn!(
                    "Retrieval budget of {:?} exhausted with {} fetches outstanding",
                    limits.total_timeout,
                    tasks.len()
                );
                tasks.abort_all();
                break;
            }
        }
    }

    let docs: Vec<RetrievedDocument> = slots.into_iter().flatten().collect();
    ::log::info!("Fetched {} of {} seed URLs", docs.len(), total);
    docs
}
