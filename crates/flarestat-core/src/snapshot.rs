// ── Snapshot ──
//
// Flat metric-key → value mapping, rebuilt from scratch on every
// successful refresh. Values are plain JSON so that the snapshot can be
// printed, serialized, and projected by descriptors without a schema.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value, json};

/// The parsed result of one refresh.
///
/// Readers must tolerate missing keys: a section whose upstream shape
/// did not match simply contributes nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot(IndexMap<String, Value>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Walk into a structured value: `get_path(&["web_today", "visits"])`.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.0.get(*first)?, |value, segment| value.get(*segment))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ── Section summaries ────────────────────────────────────────────────

/// Requests, bytes, and uniques summed over one rolling window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowTotals {
    pub requests: u64,
    pub bytes: u64,
    pub uniques: u64,
}

impl WindowTotals {
    pub fn add(&mut self, requests: u64, bytes: u64, uniques: u64) {
        self.requests = self.requests.saturating_add(requests);
        self.bytes = self.bytes.saturating_add(bytes);
        self.uniques = self.uniques.saturating_add(uniques);
    }
}

/// Per-country request counts for one window plus the leader.
///
/// Empty input yields `top_country: None, top_requests: None` and an
/// empty map, never a zero-count leader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountrySummary {
    pub top_country: Option<String>,
    pub top_requests: Option<u64>,
    pub countries: IndexMap<String, u64>,
}

impl From<CountrySummary> for Value {
    fn from(summary: CountrySummary) -> Self {
        let countries: Map<String, Value> = summary
            .countries
            .into_iter()
            .map(|(name, count)| (name, Value::from(count)))
            .collect();
        json!({
            "top_country": summary.top_country,
            "top_requests": summary.top_requests,
            "countries": countries,
        })
    }
}

/// Web-performance aggregates for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WebSummary {
    pub visits: u64,
    pub page_views: u64,
    /// Mean of the per-group averages; `None` if no group reported one.
    pub page_load_time: Option<f64>,
}

impl From<WebSummary> for Value {
    fn from(summary: WebSummary) -> Self {
        json!({
            "visits": summary.visits,
            "page_views": summary.page_views,
            "page_load_time": summary.page_load_time,
        })
    }
}

/// One row of a top-N breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopEntry {
    pub label: String,
    pub count: u64,
}
