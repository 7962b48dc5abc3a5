//! Frontier queue for a crawl job
//!
//! This module handles:
//! - FIFO ordering of (url, extractor) entries
//! - Deduplication against pending and already-visited URLs
//! - Forced re-enqueueing that bypasses deduplication

use crate::extract::Extractor;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

/// A URL waiting to be visited, with the extractor bound to it
#[derive(Clone)]
pub struct FrontierEntry {
    /// The URL to fetch
    pub url: String,

    /// Extractor invoked on the fetched document
    pub extractor: Arc<dyn Extractor>,
}

impl fmt::Debug for FrontierEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrontierEntry")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// FIFO visit queue with a visited set
///
/// A URL is accepted by [`Frontier::enqueue`] only if it is neither pending
/// nor visited, so duplicate seeds collapse onto their first occurrence. The
/// visited set only ever grows.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    /// Queued copies per URL; forced entries can make this exceed one
    pending: HashMap<String, usize>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a URL for visiting
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to visit
    /// * `extractor` - Extractor bound to this visit
    /// * `force` - Queue even if the URL is pending or was already visited
    ///
    /// # Returns
    ///
    /// `true` if the entry was queued
    pub fn enqueue(
        &mut self,
        url: impl Into<String>,
        extractor: Arc<dyn Extractor>,
        force: bool,
    ) -> bool {
        let url = url.into();

        if !force && (self.visited.contains(&url) || self.pending.contains_key(&url)) {
            tracing::trace!("Skipping duplicate URL: {}", url);
            return false;
        }

        *self.pending.entry(url.clone()).or_insert(0) += 1;
        self.queue.push_back(FrontierEntry { url, extractor });
        true
    }

    /// Pops the oldest entry
    pub fn dequeue(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        if let Some(count) = self.pending.get_mut(&entry.url) {
            *count -= 1;
            if *count == 0 {
                self.pending.remove(&entry.url);
            }
        }
        Some(entry)
    }

    /// Records that a URL has been fetched
    ///
    /// Returns `true` if this is the first visit.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    /// Checks whether a URL has been fetched
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is left to visit
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct URLs visited so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
