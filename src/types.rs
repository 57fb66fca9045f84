use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Base for canonical title pages; a candidate's id is appended to build
/// [`RatingRecord::url`].
const TITLE_URL_BASE: &str = "https://www.imdb.com/title/";

/// Category tag used in keys when the caller supplies none.
const UNKNOWN_CATEGORY: &str = "unknown";

/// Deterministic cache-slot identity for a `(title, category)` lookup.
///
/// Two logically-identical lookups always produce the same key: the title is
/// lower-cased and the category tag (or the `unknown` sentinel) is appended
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupKey(String);

impl LookupKey {
    pub fn new(title: &str, category: Option<&str>) -> Self {
        let category = category.filter(|c| !c.is_empty()).unwrap_or(UNKNOWN_CATEGORY);
        Self(format!("{}_{}", title.to_lowercase(), category))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Aggregate rating as serialized on a remote candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRating {
    #[serde(default)]
    pub aggregate_rating: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
}

/// Raw search result from the remote lookup service.
///
/// Everything beyond `id` is optional on the wire; the selector skips
/// candidates that lack a usable primary title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTitle {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub primary_title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    /// Category tag. Some deployments serialize this as `titleType`.
    #[serde(default, rename = "type", alias = "titleType")]
    pub title_type: Option<String>,
    #[serde(default)]
    pub start_year: Option<u32>,
    #[serde(default)]
    pub rating: Option<AggregateRating>,
}

/// A rating value that may be absent, serialized as a number or the literal
/// string `"N/A"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatingScore {
    Rated(f64),
    Unrated,
}

impl fmt::Display for RatingScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingScore::Rated(score) => write!(f, "{score}"),
            RatingScore::Unrated => f.write_str("N/A"),
        }
    }
}

impl Serialize for RatingScore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RatingScore::Rated(score) => serializer.serialize_f64(*score),
            RatingScore::Unrated => serializer.serialize_str("N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for RatingScore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ScoreVisitor;

        impl Visitor<'_> for ScoreVisitor {
            type Value = RatingScore;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a rating number or the string \"N/A\"")
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
                Ok(RatingScore::Rated(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(RatingScore::Rated(value as f64))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(RatingScore::Rated(value as f64))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                if value == "N/A" {
                    Ok(RatingScore::Unrated)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(value), &self))
                }
            }
        }

        deserializer.deserialize_any(ScoreVisitor)
    }
}

/// Canonical rating record handed back to callers and persisted in the cache.
///
/// Immutable after creation; refreshes overwrite the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub score: RatingScore,
    /// Abbreviated vote count, e.g. `"2.3M"` or `"12.5K"`.
    pub votes: String,
    pub title: String,
    pub category: String,
    pub year: Option<u32>,
    pub url: String,
}

impl RatingRecord {
    /// Build the caller-facing record from a selected candidate.
    pub fn from_candidate(candidate: &CandidateTitle) -> Self {
        let rating = candidate.rating.as_ref();
        let score = rating
            .and_then(|r| r.aggregate_rating)
            .map_or(RatingScore::Unrated, RatingScore::Rated);
        let votes = rating
            .and_then(|r| r.vote_count)
            .map_or_else(|| "0".to_string(), format_votes);
        let title = candidate
            .primary_title
            .clone()
            .or_else(|| candidate.original_title.clone())
            .unwrap_or_default();
        let category = candidate
            .title_type
            .clone()
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

        Self {
            score,
            votes,
            title,
            category,
            year: candidate.start_year,
            url: format!("{TITLE_URL_BASE}{}/", candidate.id),
        }
    }
}

/// Abbreviate a vote count for display: millions and thousands get one
/// decimal place, anything smaller stays a literal integer.
pub fn format_votes(votes: u64) -> String {
    if votes >= 1_000_000 {
        format!("{:.1}M", votes as f64 / 1_000_000.0)
    } else if votes >= 1_000 {
        format!("{:.1}K", votes as f64 / 1_000.0)
    } else {
        votes.to_string()
    }
}
