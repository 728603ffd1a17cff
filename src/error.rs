use thiserror::Error;

/// Errors raised while fetching a single document URL.
///
/// These never leave the crate's public retrieval entry point; the per-URL
/// boundary in [`crate::fetcher::fetch_and_parse`] turns them into absence.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed or uses a scheme other than http(s)
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Transport-level failure (DNS, connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-2xx status
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    /// Per-fetch deadline elapsed
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Content type is neither HTML/text nor PDF
    #[error("unsupported content type {content_type:?} for {url}")]
    UnsupportedContentType { url: String, content_type: String },

    /// Body exceeded the download cap
    #[error("response for {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
}

/// Errors raised by the format-specific parsers.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("PDF load failed: {0}")]
    PdfLoad(String),

    #[error("PDF text extraction failed on page {page}: {reason}")]
    PdfExtract { page: u32, reason: String },

    #[error("no extractable text")]
    Empty,

    /// Parser task panicked or was cancelled
    #[error("parser task failed: {0}")]
    Task(String),
}

/// Errors raised by an external search provider call.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search provider returned status {0}")]
    Status(u16),

    #[error("search response could not be decoded: {0}")]
    Decode(String),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

pub type SearchResult<T> = std::result::Result<T, SearchError>;
