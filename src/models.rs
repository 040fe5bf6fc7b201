use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A raw (title, description, url, date) tuple as supplied by a fetcher,
/// before relevance filtering. Absent fields are empty strings, never null.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Candidate {
    pub company: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub date: String, // ISO8601 or empty
    pub source: String,
}

impl Candidate {
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// One durable ledger row. Rows are append-only; `id` is assigned once at
/// insertion and never reused or renumbered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRow {
    pub id: u64,
    pub company: String,
    pub title: String,
    pub original_url: String,
    pub validated: bool,
    pub human_url: String, // empty, a URL, or the literal sentinel "no"
    pub master_url: String,
    pub source: UrlSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlSource {
    Human,
    Auto,
}

impl UrlSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlSource::Human => "Human",
            UrlSource::Auto => "Auto",
        }
    }
}

/// Frequency-ranked keywords for one company, in rank order.
pub type TopicList = Vec<(String, u32)>;

/// The unordered topic universe per company used by the overlap engine.
pub type TopicSet = BTreeSet<String>;

#[derive(Debug, Clone, Serialize)]
pub struct ReviewSample {
    pub text: String,
    pub rating: String,
    pub author: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewPlatform {
    pub platform: String,
    pub rating: String,
    pub url: String,
    pub count: u32,
    pub sample_reviews: Vec<ReviewSample>,
}

/// Read-only review reference data. `platforms` is empty for unknown companies.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ReviewSummary {
    pub platforms: Vec<ReviewPlatform>,
}

/// Everything the renderer needs for one company section.
#[derive(Debug, Clone)]
pub struct CompanyReport {
    pub company: String,
    pub articles: Vec<LedgerRow>,
    pub topics: TopicList,
    pub reviews: ReviewSummary,
}

/// Per-company word frequencies exported for the external word-cloud renderer.
pub type CloudInputs = BTreeMap<String, TopicList>;
