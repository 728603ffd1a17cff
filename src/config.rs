use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// User agent sent with every document fetch
pub const DEFAULT_USER_AGENT: &str =
    "tapwater-sources/0.1 (+drinking-water-safety-assistant; contact: ops@tapwater.example)";

/// External search providers the seed generator can call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    /// Tavily search API (domain restriction via `include_domains`)
    Tavily,
    /// Serper Google search API (domain restriction via `site:` operators)
    Serper,
}

impl SearchProvider {
    /// Parse a provider name as found in the environment
    pub fn from_name(name: &str) -> Result<Option<Self>, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "off" => Ok(None),
            "tavily" => Ok(Some(SearchProvider::Tavily)),
            "serper" => Ok(Some(SearchProvider::Serper)),
            other => Err(ConfigError::InvalidValue {
                key: "SEARCH_PROVIDER".to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Default API endpoint for the provider
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            SearchProvider::Tavily => "https://api.tavily.com/search",
            SearchProvider::Serper => "https://google.serper.dev/search",
        }
    }
}

/// Configuration for the optional external search call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchProviderConfig {
    /// Which provider to call
    pub provider: SearchProvider,

    /// API endpoint; empty means the provider default
    #[serde(default)]
    pub endpoint: String,

    /// API key sent with each request
    pub api_key: String,

    /// Maximum candidates requested per templated query
    #[serde(default = "default_max_results_per_query")]
    pub max_results_per_query: usize,
}

impl SearchProviderConfig {
    /// Create a provider configuration using the provider's default endpoint
    pub fn new(provider: SearchProvider, api_key: &str) -> Self {
        Self {
            provider,
            endpoint: provider.default_endpoint().to_string(),
            api_key: api_key.to_string(),
            max_results_per_query: default_max_results_per_query(),
        }
    }

    /// Endpoint to call, falling back to the provider default
    pub fn endpoint(&self) -> &str {
        if self.endpoint.trim().is_empty() {
            self.provider.default_endpoint()
        } else {
            &self.endpoint
        }
    }
}

/// Configuration for one retrieval run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Only keep documents hosted on an allow-listed domain
    #[serde(default = "default_strict_local")]
    pub strict_local: bool,

    /// Verbose diagnostics about dropped and selected documents
    #[serde(default)]
    pub debug: bool,

    /// External search provider; `None` disables search
    #[serde(default)]
    pub search: Option<SearchProviderConfig>,

    /// Maximum number of concurrent document fetches
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Deadline for a single document fetch (seconds)
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Wall-clock budget for search plus fetching (seconds)
    #[serde(default = "default_total_timeout_secs")]
    pub total_timeout_secs: u64,

    /// Maximum number of ranked documents returned; values above six are clamped
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// User agent sent with each fetch
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strict_local: default_strict_local(),
            debug: false,
            search: None,
            max_concurrency: default_max_concurrency(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            total_timeout_secs: default_total_timeout_secs(),
            max_results: default_max_results(),
            user_agent: default_user_agent(),
        }
    }
}

impl RetrievalConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, starting from defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("SOURCES_DEBUG") {
            config.debug = parse_flag("SOURCES_DEBUG", &value)?;
        }
        if let Some(value) = lookup("STRICT_LOCAL") {
            config.strict_local = parse_flag("STRICT_LOCAL", &value)?;
        }

        let provider = match lookup("SEARCH_PROVIDER") {
            Some(name) => SearchProvider::from_name(&name)?,
            None => None,
        };
        let api_key = lookup("SEARCH_API_KEY").filter(|k| !k.trim().is_empty());

        // A provider without credentials means search is disabled
        if let (Some(provider), Some(api_key)) = (provider, api_key) {
            let mut search = SearchProviderConfig::new(provider, &api_key);
            if let Some(endpoint) = lookup("SEARCH_ENDPOINT").filter(|e| !e.trim().is_empty()) {
                search.endpoint = endpoint;
            }
            config.search = Some(search);
        }

        Ok(config)
    }

    /// Per-fetch timeout as a duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Whole fan-out budget as a duration
    pub fn total_timeout(&self) -> Duration {
        Duration::from_secs(self.total_timeout_secs)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Default value for strict_local
fn default_strict_local() -> bool {
    true
}

/// Default value for max_concurrency
fn default_max_concurrency() -> usize {
    6
}

fn default_fetch_timeout_secs() -> u64 {
    20
}

fn default_total_timeout_secs() -> u64 {
    45
}

/// Output cap for ranked documents
fn default_max_results() -> usize {
    6
}

fn default_max_results_per_query() -> usize {
    5
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
