//! Metadata collector for a single crawl job
//!
//! Holds an arbitrary string-keyed map of JSON values next to an append-only
//! list of per-page entries. The `items_count` and `pages_visited` aggregates
//! are maintained by [`MetadataCollector::record_page`] so they always agree
//! with the page list.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Aggregate key: total number of records extracted
pub const ITEMS_COUNT: &str = "items_count";

/// Aggregate key: wall-clock seconds spent in the crawl loop
pub const DURATION: &str = "duration";

/// Aggregate key: number of pages fetched and extracted
pub const PAGES_VISITED: &str = "pages_visited";

/// Timing and item count for one visited page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMetrics {
    /// The frontier URL of the page
    pub url: String,

    /// Wall-clock time of the whole iteration (middleware, fetch, extract)
    #[serde(with = "duration_secs")]
    pub duration: Duration,

    /// Number of records the extractor produced
    pub item_count: usize,
}

/// Job-scoped metrics store
#[derive(Debug, Clone, Default)]
pub struct MetadataCollector {
    values: HashMap<String, Value>,
    pages: Vec<PageMetrics>,
}

impl MetadataCollector {
    /// Creates an empty collector with zeroed aggregates
    pub fn new() -> Self {
        let mut collector = Self::default();
        collector.set(ITEMS_COUNT, 0u64);
        collector.set(PAGES_VISITED, 0u64);
        collector
    }

    /// Sets a named value, replacing any previous one
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Gets a named value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Appends a page entry and bumps the item and page aggregates
    pub fn record_page(&mut self, page: PageMetrics) {
        let items = self.items_count() + page.item_count as u64;
        let pages = self.pages_visited() + 1;
        self.set(ITEMS_COUNT, items);
        self.set(PAGES_VISITED, pages);
        self.pages.push(page);
    }

    /// Per-page entries in visit order
    pub fn pages(&self) -> &[PageMetrics] {
        &self.pages
    }

    /// The `items_count` aggregate
    pub fn items_count(&self) -> u64 {
        self.counter(ITEMS_COUNT)
    }

    /// The `pages_visited` aggregate
    pub fn pages_visited(&self) -> u64 {
        self.counter(PAGES_VISITED)
    }

    /// The `duration` aggregate, if the crawl loop has finished
    pub fn duration(&self) -> Option<Duration> {
        self.get(DURATION)
            .and_then(Value::as_f64)
            .map(Duration::from_secs_f64)
    }

    /// Iterates over all named values
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sum of `item_count` over every recorded page
    pub fn summed_item_count(&self) -> u64 {
        self.pages.iter().map(|p| p.item_count as u64).sum()
    }

    fn counter(&self, key: &str) -> u64 {
        self.get(key).and_then(Value::as_u64).unwrap_or(0)
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }
}
