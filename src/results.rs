use crate::utils::{display_host, host_matches, host_of};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder title used when an HTML page has no `<title>`
pub const UNTITLED: &str = "Untitled";

/// Placeholder title used when a PDF yields no first line
pub const PDF_TITLE: &str = "PDF";

/// Coarse trust classification of a document's source, derived from its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Federal,
    State,
    Local,
    Other,
}

/// Hosts outside `.gov`/`.us` with a fixed tier
const HOST_TIERS: &[(&str, Tier)] = &[("who.int", Tier::Federal)];

impl Tier {
    /// Classify a hostname
    pub fn from_host(host: &str) -> Self {
        let host = host.to_ascii_lowercase();
        if host.ends_with(".gov") {
            if host.contains("epa.gov") || host.contains("cdc.gov") {
                Tier::Federal
            } else {
                Tier::State
            }
        } else if host.ends_with(".us") {
            Tier::Local
        } else {
            HOST_TIERS
                .iter()
                .find(|(domain, _)| host_matches(&host, domain))
                .map(|(_, tier)| *tier)
                .unwrap_or(Tier::Other)
        }
    }

    /// Classify the host of a URL string; unparseable URLs are `Other`
    pub fn from_url(url: &str) -> Self {
        host_of(url)
            .map(|h| Self::from_host(&h))
            .unwrap_or(Tier::Other)
    }
}

/// Supported document content types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "text/html")]
    Html,
    #[serde(rename = "application/pdf")]
    Pdf,
}

impl ContentType {
    pub fn as_mime(&self) -> &'static str {
        match self {
            ContentType::Html => "text/html",
            ContentType::Pdf => "application/pdf",
        }
    }
}

/// A fetched, parsed and classified source document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DocumentFields")]
pub struct RetrievedDocument {
    /// Absolute URL, unique within a retrieval run
    pub url: String,

    /// Best-effort human title
    pub title: String,

    /// Human-readable source name, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    /// Publication date from metadata, body text or `Last-Modified`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,

    /// Lead excerpt of the cleaned text
    pub snippet: String,

    /// Cleaned full text
    pub text: String,

    pub content_type: ContentType,

    tier: Tier,

    /// Relevance score, set once by the ranker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
}

/// Deserialized form of a document; any serialized `tier` is ignored and
/// recomputed from the URL
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentFields {
    url: String,
    title: String,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    snippet: String,
    text: String,
    content_type: ContentType,
    #[serde(default)]
    score: Option<i32>,
}

impl From<DocumentFields> for RetrievedDocument {
    fn from(fields: DocumentFields) -> Self {
        let mut doc = RetrievedDocument::new(
            fields.url,
            fields.title,
            fields.text,
            fields.snippet,
            fields.content_type,
            fields.published_at,
        );
        doc.publisher = fields.publisher;
        doc.score = fields.score;
        doc
    }
}

impl RetrievedDocument {
    /// Create a document; the tier is derived from the URL's host here and never changes
    pub fn new(
        url: String,
        title: String,
        text: String,
        snippet: String,
        content_type: ContentType,
        published_at: Option<DateTime<Utc>>,
    ) -> Self {
        let tier = Tier::from_url(&url);
        Self {
            url,
            title,
            publisher: None,
            published_at,
            snippet,
            text,
            content_type,
            tier,
            score: None,
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Lower-cased hostname of the document URL
    pub fn host(&self) -> Option<String> {
        host_of(&self.url)
    }

    /// Publisher for display: the explicit publisher, else the hostname
    pub fn publisher_or_host(&self) -> String {
        if let Some(publisher) = self.publisher.as_deref().filter(|p| !p.trim().is_empty()) {
            return publisher.to_string();
        }
        self.host()
            .map(|h| display_host(&h).to_string())
            .unwrap_or_else(|| self.url.clone())
    }

    /// `published_at` as ISO-8601 with millisecond precision, e.g. `2024-10-01T00:00:00.000Z`
    pub fn published_at_iso(&self) -> Option<String> {
        self.published_at
            .map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Title and text joined, the haystack used by relevance heuristics
    pub fn haystack(&self) -> String {
        format!("{} {}", self.title, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn doc(url: &str) -> RetrievedDocument {
        RetrievedDocument::new(
            url.to_string(),
            "t".to_string(),
            "body".to_string(),
            "body".to_string(),
            ContentType::Html,
            None,
        )
    }

    #[test]
    fn test_tier_rules() {
        assert_eq!(Tier::from_host("www.epa.gov"), Tier::Federal);
        assert_eq!(Tier::from_host("www.cdc.gov"), Tier::Federal);
        assert_eq!(Tier::from_host("austintexas.gov"), Tier::State);
        assert_eq!(Tier::from_host("health.ny.gov"), Tier::State);
        assert_eq!(Tier::from_host("alleghenycounty.us"), Tier::Local);
        assert_eq!(Tier::from_host("www.who.int"), Tier::Federal);
        assert_eq!(Tier::from_host("pgh2o.com"), Tier::Other);
        assert_eq!(Tier::from_url("::bad::"), Tier::Other);
    }

    #[test]
    fn test_tier_assigned_at_creation() {
        assert_eq!(doc("https://www.epa.gov/ccr").tier(), Tier::Federal);
        assert_eq!(doc("https://www.traviscountytx.gov/x").tier(), Tier::State);
    }

    #[test]
    fn test_publisher_or_host() {
        let mut d = doc("https://www.nyc.gov/site/dep");
        assert_eq!(d.publisher_or_host(), "nyc.gov");
        d.publisher = Some("NYC DEP".to_string());
        assert_eq!(d.publisher_or_host(), "NYC DEP");
    }

    #[test]
    fn test_published_at_iso() {
        let mut d = doc("https://www.epa.gov/ccr");
        assert_eq!(d.published_at_iso(), None);
        d.published_at = Some(Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap());
        assert_eq!(
            d.published_at_iso().as_deref(),
            Some("2024-10-01T00:00:00.000Z")
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(doc("https://www.epa.gov/ccr")).unwrap();
        assert_eq!(json["contentType"], "text/html");
        assert_eq!(json["tier"], "federal");
        assert!(json.get("score").is_none());
    }

    #[test]
    fn test_deserialized_tier_comes_from_host() {
        let json = r#"{
            "url": "https://example.com/water",
            "title": "Water",
            "snippet": "s",
            "text": "t",
            "contentType": "text/html",
            "tier": "federal",
            "score": 4
        }"#;
        let d: RetrievedDocument = serde_json::from_str(json).unwrap();
        assert_eq!(d.tier(), Tier::Other);
        assert_eq!(d.score, Some(4));

        let original = doc("https://www.cdc.gov/advisories");
        let json = serde_json::to_string(&original).unwrap();
        let d: RetrievedDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(d.tier(), Tier::Federal);
    }
}
