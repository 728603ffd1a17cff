use crate::filter::strong_location_match;
use crate::results::RetrievedDocument;
use crate::utils::host_in;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Default number of documents kept after ranking
pub const MAX_RESULTS: usize = 6;

static SAFETY_TERMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)boil|do not drink|advisor(y|ies)|notice").expect("safety pattern is valid")
});

static UTILITY_JARGON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(pws|pwsa|pwsid|dep|deq|ddw|egle|tceq|msdh|awu|ccr)\b")
        .expect("jargon pattern is valid")
});

/// Everything a score depends on besides the document itself
#[derive(Debug, Clone)]
pub struct ScoringContext {
    /// Federal domains trusted for every location
    pub base_allow: Vec<String>,

    /// State and municipal domains derived from the location
    pub local_allow: Vec<String>,

    pub location: String,

    /// Reference time for recency; fixed in tests
    pub now: DateTime<Utc>,
}

impl ScoringContext {
    pub fn new(base_allow: Vec<String>, local_allow: Vec<String>, location: &str) -> Self {
        Self {
            base_allow,
            local_allow,
            location: location.to_string(),
            now: Utc::now(),
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// Precomputed per-document inputs shared by every rule
struct Subject<'a> {
    host: Option<String>,
    haystack: String,
    ctx: &'a ScoringContext,
}

/// One additive scoring rule
struct ScoreRule {
    name: &'static str,
    weight: i32,
    applies: fn(&Subject) -> bool,
}

fn on_base_allow_list(s: &Subject) -> bool {
    s.host
        .as_deref()
        .is_some_and(|h| host_in(h, &s.ctx.base_allow))
}

fn on_local_allow_list(s: &Subject) -> bool {
    s.host
        .as_deref()
        .is_some_and(|h| host_in(h, &s.ctx.local_allow))
}

fn mentions_location(s: &Subject) -> bool {
    strong_location_match(&s.ctx.location, &s.haystack)
}

fn mentions_safety(s: &Subject) -> bool {
    SAFETY_TERMS.is_match(&s.haystack)
}

fn mentions_utility(s: &Subject) -> bool {
    UTILITY_JARGON.is_match(&s.haystack)
}

static RULES: &[ScoreRule] = &[
    ScoreRule {
        name: "base-domain",
        weight: 3,
        applies: on_base_allow_list,
    },
    ScoreRule {
        name: "local-domain",
        weight: 4,
        applies: on_local_allow_list,
    },
    ScoreRule {
        name: "location-match",
        weight: 2,
        applies: mentions_location,
    },
    ScoreRule {
        name: "safety-terms",
        weight: 2,
        applies: mentions_safety,
    },
    ScoreRule {
        name: "utility-jargon",
        weight: 1,
        applies: mentions_utility,
    },
];

/// Recency bonus: +2 under 60 days old, +1 under a year, otherwise nothing
fn recency_bonus(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i32 {
    let Some(published_at) = published_at else {
        return 0;
    };
    let age_days = (now - published_at).num_days();
    if age_days < 60 {
        2
    } else if age_days < 365 {
        1
    } else {
        0
    }
}

/// Names of the rules that fire for a document, for diagnostics
pub fn explain(doc: &RetrievedDocument, ctx: &ScoringContext) -> Vec<&'static str> {
    let subject = Subject {
        host: doc.host(),
        haystack: doc.haystack(),
        ctx,
    };
    RULES
        .iter()
        .filter(|rule| (rule.applies)(&subject))
        .map(|rule| rule.name)
        .collect()
}

/// Additive relevance score; pure given the document and context
pub fn score(doc: &RetrievedDocument, ctx: &ScoringContext) -> i32 {
    let subject = Subject {
        host: doc.host(),
        haystack: doc.haystack(),
        ctx,
    };
    let rules: i32 = RULES
        .iter()
        .filter(|rule| (rule.applies)(&subject))
        .map(|rule| rule.weight)
        .sum();
    rules + recency_bonus(doc.published_at, ctx.now)
}

/// Score every document, stable-sort by score descending and keep the top `limit`
pub fn rank(
    mut docs: Vec<RetrievedDocument>,
    ctx: &ScoringContext,
    limit: usize,
    debug: bool,
) -> Vec<RetrievedDocument> {
    for doc in docs.iter_mut() {
        doc.score = Some(score(doc, ctx));
    }

    // sort_by is stable, so equal scores keep discovery order
    docs.sort_by(|a, b| b.score.cmp(&a.score));
    docs.truncate(limit);

    if debug {
        for doc in &docs {
            ::log::info!(
                "Selected {} score={} tier={:?} rules={:?}",
                doc.url,
                doc.score.unwrap_or_default(),
                doc.tier(),
                explain(doc, ctx)
            );
        }
    }
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::resolve;
    use crate::results::{ContentType, Tier};
    use crate::seeds::base_allowed_domains;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn doc(url: &str, title: &str, text: &str) -> RetrievedDocument {
        RetrievedDocument::new(
            url.to_string(),
            title.to_string(),
            text.to_string(),
            String::new(),
            ContentType::Html,
            None,
        )
    }

    fn austin_context() -> ScoringContext {
        let resolved = resolve("Austin, TX");
        ScoringContext::new(
            base_allowed_domains(),
            resolved.allowed_domains.into_iter().collect(),
            "Austin, TX",
        )
        .at(now())
    }

    #[test]
    fn test_local_page_outscores_generic_federal_page() {
        let ctx = austin_context();
        let local = doc(
            "https://www.austintexas.gov/water-quality",
            "Austin Water Quality Report 2024",
            "Austin, Texas tap water meets all standards.",
        );
        let federal = doc(
            "https://www.epa.gov/ccr/ccr-information-consumers",
            "Consumer Confidence Reports",
            "Find your annual water quality report.",
        );

        assert_eq!(local.tier(), Tier::State);
        assert_eq!(score(&local, &ctx), 6);
        assert_eq!(score(&federal, &ctx), 3);
        assert_eq!(explain(&local, &ctx), vec!["local-domain", "location-match"]);
    }

    #[test]
    fn test_safety_and_jargon_terms() {
        let ctx = austin_context();
        let d = doc(
            "https://www.epa.gov/notices",
            "Boil Water Advisory",
            "PWSID TX0000001 issued a boil notice.",
        );
        // base 3 + safety 2 + jargon 1
        assert_eq!(score(&d, &ctx), 6);

        // "deposit" must not count as the DEP abbreviation
        let d = doc("https://www.epa.gov/x", "Mineral deposits", "");
        assert_eq!(score(&d, &ctx), 3);
    }

    #[test]
    fn test_score_is_deterministic() {
        let ctx = austin_context();
        let d = doc("https://www.austintexas.gov/a", "Austin boil notice", "AWU update");
        let first = score(&d, &ctx);
        for _ in 0..5 {
            assert_eq!(score(&d, &ctx), first);
        }
    }

    #[test]
    fn test_recency_is_monotonic() {
        let ctx = austin_context();
        let ages = [0, 10, 59, 60, 200, 364, 365, 2000];
        let scores: Vec<i32> = ages
            .iter()
            .map(|days| {
                let mut d = doc("https://example.com/a", "a", "");
                d.published_at = Some(now() - Duration::days(*days));
                score(&d, &ctx)
            })
            .collect();

        assert_eq!(scores, vec![2, 2, 2, 1, 1, 1, 0, 0]);
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        let undated = doc("https://example.com/a", "a", "");
        assert_eq!(score(&undated, &ctx), 0);
    }

    #[test]
    fn test_rank_is_stable_and_capped() {
        let ctx = austin_context();
        let mut docs: Vec<RetrievedDocument> = (0..9)
            .map(|i| doc(&format!("https://example.com/{}", i), "plain", ""))
            .collect();
        docs.push(doc("https://www.epa.gov/top", "federal", ""));

        let ranked = rank(docs, &ctx, MAX_RESULTS, false);
        let urls: Vec<&str> = ranked.iter().map(|d| d.url.as_str()).collect();

        assert_eq!(ranked.len(), MAX_RESULTS);
        assert_eq!(
            urls,
            vec![
                "https://www.epa.gov/top",
                "https://example.com/0",
                "https://example.com/1",
                "https://example.com/2",
                "https://example.com/3",
                "https://example.com/4",
            ]
        );
        assert_eq!(ranked[0].score, Some(3));
        assert_eq!(ranked[1].score, Some(0));
    }

    #[test]
    fn test_rank_fewer_than_limit() {
        let ctx = austin_context();
        let ranked = rank(vec![doc("https://example.com/a", "a", "")], &ctx, MAX_RESULTS, true);
        assert_eq!(ranked.len(), 1);
        assert!(rank(Vec::new(), &ctx, MAX_RESULTS, false).is_empty());
    }
}
