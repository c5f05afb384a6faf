//! Resolution orchestration.
//!
//! [`Resolver::resolve`] runs the full pipeline for one URL: try the
//! payload, then the cache, then the network, caching whatever a fetch
//! produces. Resolution can fail for a dozen unremarkable reasons
//! (unreachable host, bare HTML, garbage payload), so failure is expressed
//! as `None` and logged, never returned as an error: the caller renders a
//! plain link and moves on.

pub mod fetch;
pub mod identity;

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::debug;
use unfurl_common::MetadataRecord;
use unfurl_parser::{parse_html, parse_social_title};

use crate::cache::MetadataCache;
use fetch::PageFetcher;

/// How many URLs of a batch resolve concurrently.
const MAX_CONCURRENT_RESOLVES: usize = 20;

pub struct Resolver {
    cache: Arc<MetadataCache>,
    fetcher: Arc<dyn PageFetcher>,
}

impl Resolver {
    pub fn new(cache: Arc<MetadataCache>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { cache, fetcher }
    }

    /// Resolve one URL, optionally against an attached archive payload.
    ///
    /// Returns `None` when nothing renderable could be produced; that
    /// outcome may itself be cached in the memory tier so the next attempt
    /// does not refetch.
    pub async fn resolve(&self, url: &str, payload: Option<&[u8]>) -> Option<MetadataRecord> {
        let now = Utc::now().timestamp();

        if let Some(bytes) = payload {
            if let Some(record) = self.resolve_from_payload(url, bytes, now) {
                return Some(record);
            }
        }

        if let Some(record) = self.cache.get(url, now) {
            debug!(url = %url, has_data = record.has_data(), "cache hit");
            return finish(record);
        }

        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                debug!(url = %url, error = %e, "fetch failed");
                return None;
            }
        };

        let mut record = parse_html(&html, url);
        merge_social_title(&mut record);
        self.cache.put(&record, now);
        finish(record)
    }

    /// Payload path: a successful decode and extraction skips the network
    /// entirely and seeds both cache tiers.
    fn resolve_from_payload(&self, url: &str, bytes: &[u8], now: i64) -> Option<MetadataRecord> {
        let graph = match unfurl_archive::decode(bytes) {
            Ok(graph) => graph,
            Err(e) => {
                debug!(url = %url, error = %e, "payload decode failed");
                return None;
            }
        };

        let mut record = unfurl_archive::extract_record(&graph, url)?;
        if record.image_url.is_none() {
            // No structured image field; fall back to scoring every string
            // stored in the archive.
            record.image_url = unfurl_parser::best_candidate(graph.text_pool());
        }
        merge_social_title(&mut record);
        self.cache.put(&record, now);
        Some(record)
    }

    /// Resolve a batch of URLs concurrently, preserving input order.
    ///
    /// Batches carry no payload: an archive payload accompanies exactly
    /// one link, and resolving other URLs against it would return — and
    /// cache — that link's metadata under theirs. Callers with a payload
    /// use [`resolve`](Self::resolve) for its URL.
    pub async fn resolve_many(&self, urls: &[String]) -> Vec<Option<MetadataRecord>> {
        stream::iter(urls)
            .map(|url| self.resolve(url, None))
            .buffered(MAX_CONCURRENT_RESOLVES)
            .collect()
            .await
    }
}

/// An empty record is a cacheable fact but not a resolvable result.
fn finish(record: MetadataRecord) -> Option<MetadataRecord> {
    if record.has_data() {
        Some(record)
    } else {
        None
    }
}

/// Derive social fields from a social-shaped title, without touching the
/// title itself or overwriting fields another source already set.
fn merge_social_title(record: &mut MetadataRecord) {
    let Some(title) = record.title.as_deref() else {
        return;
    };
    let parsed = parse_social_title(title);
    if parsed.is_empty() {
        return;
    }

    let social = record.social_mut();
    if social.author_name.is_none() {
        social.author_name = parsed.author_name;
    }
    if social.handle.is_none() {
        social.handle = parsed.handle;
    }
    if social.like_count.is_none() {
        social.like_count = parsed.like_count;
    }
    if social.reply_count.is_none() {
        social.reply_count = parsed.reply_count;
    }
}
