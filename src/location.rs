//! Heuristic location resolution.
//!
//! Turns free-text like `"Flint, MI"` or `"Brooklyn, New York"` into a state
//! code and the set of state/municipal domains trusted for that place. Pure
//! and deterministic: everything is driven by the static tables below.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Full state names recognized when no two-letter code is present
const STATE_NAMES: &[(&str, &str)] = &[
    ("new york", "NY"),
    ("michigan", "MI"),
    ("mississippi", "MS"),
    ("california", "CA"),
    ("texas", "TX"),
    ("florida", "FL"),
    ("pennsylvania", "PA"),
];

/// Known government and utility domains per state code
const STATE_DOMAINS: &[(&str, &[&str])] = &[
    ("NY", &["health.ny.gov", "nyc.gov", "dep.nyc.gov"]),
    ("MI", &["michigan.gov"]),
    ("MS", &["msdh.ms.gov"]),
    ("CA", &["waterboards.ca.gov", "cdph.ca.gov"]),
    ("TX", &["tceq.texas.gov", "dshs.texas.gov"]),
    ("FL", &["floridahealth.gov", "floridadep.gov"]),
    ("PA", &["dep.pa.gov", "health.pa.gov"]),
];

/// A city/region special case: fires when `pattern` matches the normalized
/// location and, if set, the resolved state equals `state`.
struct PlaceRule {
    name: &'static str,
    pattern: &'static str,
    state: Option<&'static str>,
    domains: &'static [&'static str],
}

const PLACE_RULES: &[PlaceRule] = &[
    PlaceRule {
        name: "nyc",
        pattern: r"new york city|\bnyc\b|manhattan|brooklyn|queens|bronx|staten island",
        state: None,
        domains: &["nyc.gov", "dep.nyc.gov", "health.ny.gov"],
    },
    PlaceRule {
        name: "flint",
        pattern: r"\bflint\b",
        state: None,
        domains: &["cityofflint.com", "michigan.gov"],
    },
    PlaceRule {
        name: "jackson-ms",
        pattern: r"\bjackson\b",
        state: Some("MS"),
        domains: &["jacksonms.gov", "msdh.ms.gov"],
    },
    PlaceRule {
        name: "austin",
        pattern: r"\baustin\b|travis county",
        state: None,
        domains: &["austintexas.gov", "traviscountytx.gov", "tceq.texas.gov"],
    },
    PlaceRule {
        name: "pittsburgh",
        pattern: r"pittsburgh|allegheny",
        state: None,
        domains: &["pgh2o.com", "alleghenycounty.us", "dep.pa.gov"],
    },
];

static STATE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2})\b").expect("state code pattern is valid"));

static PLACE_PATTERNS: LazyLock<Vec<(&'static PlaceRule, Regex)>> = LazyLock::new(|| {
    PLACE_RULES
        .iter()
        .filter_map(|rule| match Regex::new(rule.pattern) {
            Ok(re) => Some((rule, re)),
            Err(e) => {
                ::log::error!("Invalid place pattern for {}: {}", rule.name, e);
                None
            }
        })
        .collect()
});

/// Result of resolving a location string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLocation {
    /// Two-letter state code, if one could be inferred
    pub state_code: Option<String>,

    /// State and municipal domains trusted for this location
    pub allowed_domains: BTreeSet<String>,

    /// Names of the place rules that fired
    pub matched_places: Vec<&'static str>,
}

/// Lower-case, trim and collapse a location to space-separated alphanumeric tokens
pub fn normalize(location: &str) -> String {
    tokenize(location).join(" ")
}

/// Alphanumeric runs of the lower-cased text
pub fn tokenize(text: &str) -> Vec<String> {
    text.trim()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Infer a state code: a bounded uppercase two-letter token first, then full state names
pub fn infer_state(location: &str) -> Option<String> {
    if let Some(caps) = STATE_CODE.captures(location) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    let normalized = normalize(location);
    STATE_NAMES
        .iter()
        .find(|(name, _)| normalized.contains(name))
        .map(|(_, code)| code.to_string())
}

/// Resolve a free-text location into a state code and trusted domains
pub fn resolve(location: &str) -> ResolvedLocation {
    let state_code = infer_state(location);
    let normalized = normalize(location);
    let mut allowed_domains = BTreeSet::new();

    if let Some(code) = &state_code {
        if let Some((_, domains)) = STATE_DOMAINS.iter().find(|(c, _)| c == code) {
            allowed_domains.extend(domains.iter().map(|d| d.to_string()));
        }
    }

    let mut matched_places = Vec::new();
    for (rule, re) in PLACE_PATTERNS.iter() {
        if !re.is_match(&normalized) {
            continue;
        }
        if let Some(required) = rule.state {
            if state_code.as_deref() != Some(required) {
                continue;
            }
        }
        ::log::debug!("Location {:?} matched place rule {}", location, rule.name);
        matched_places.push(rule.name);
        allowed_domains.extend(rule.domains.iter().map(|d| d.to_string()));
    }

    ResolvedLocation {
        state_code,
        allowed_domains,
        matched_places,
    }
}
