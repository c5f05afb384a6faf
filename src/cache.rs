//! Two-tier metadata cache.
//!
//! Tier A is an in-process [`DashMap`] keyed by exact URL string; tier B is
//! the SQLite table behind [`unfurl_db`]. Both tiers use the same 7-day
//! TTL. Reads check memory first, then the database, mirroring database
//! hits back into memory. Writes always land in memory, but only records
//! carrying renderable data reach the database: an empty record is a
//! short-lived negative marker that suppresses refetching, never a durable
//! fact.
//!
//! Database trouble degrades the cache to memory-only instead of failing
//! resolution.

use dashmap::DashMap;
use tracing::{debug, warn};
use unfurl_common::MetadataRecord;
use unfurl_db::pool::get_conn;
use unfurl_db::queries::metadata_cache;
use unfurl_db::{CachedMetadata, DbPool, CACHE_TTL_SECS};

#[derive(Debug, Clone)]
struct MemoryEntry {
    record: MetadataRecord,
    cached_at: i64,
}

/// Two-tier cache for resolved metadata records.
pub struct MetadataCache {
    memory: DashMap<String, MemoryEntry>,
    pool: Option<DbPool>,
}

impl MetadataCache {
    /// Create a cache over an optional durable tier.
    ///
    /// With `None` the cache is memory-only, which is how resolution keeps
    /// working when the database cannot be opened.
    pub fn new(pool: Option<DbPool>) -> Self {
        Self {
            memory: DashMap::new(),
            pool,
        }
    }

    /// Look up a fresh record for an exact URL at time `now` (epoch
    /// seconds).
    ///
    /// A memory hit may return an empty record; a database hit never does,
    /// because empty records are not persisted.
    pub fn get(&self, url: &str, now: i64) -> Option<MetadataRecord> {
        if let Some(entry) = self.memory.get(url) {
            if now - entry.cached_at < CACHE_TTL_SECS {
                return Some(entry.record.clone());
            }
            drop(entry);
            self.memory.remove(url);
        }

        let pool = self.pool.as_ref()?;
        let row = get_conn(pool)
            .and_then(|conn| metadata_cache::get(&conn, url, now))
            .unwrap_or_else(|e| {
                warn!(url = %url, error = %e, "cache read failed, treating as miss");
                None
            })?;

        let record = row.into_record();
        self.memory.insert(
            url.to_string(),
            MemoryEntry {
                record: record.clone(),
                cached_at: now,
            },
        );
        Some(record)
    }

    /// Store a resolved record in both tiers.
    ///
    /// Memory always takes the record; the durable tier takes it only when
    /// it has renderable data.
    pub fn put(&self, record: &MetadataRecord, now: i64) {
        self.memory.insert(
            record.canonical_url.clone(),
            MemoryEntry {
                record: record.clone(),
                cached_at: now,
            },
        );

        if !record.has_data() {
            debug!(url = %record.canonical_url, "empty record kept in memory tier only");
            return;
        }

        if let Some(pool) = &self.pool {
            let row = CachedMetadata::from_record(record, now);
            if let Err(e) = get_conn(pool).and_then(|conn| metadata_cache::put(&conn, &row)) {
                warn!(url = %record.canonical_url, error = %e, "cache write failed");
            }
        }
    }

    /// Drop expired entries from both tiers. Returns the number of durable
    /// rows removed.
    pub fn sweep(&self, now: i64) -> usize {
        self.memory
            .retain(|_, entry| now - entry.cached_at < CACHE_TTL_SECS);

        let Some(pool) = &self.pool else {
            return 0;
        };
        match get_conn(pool).and_then(|conn| metadata_cache::sweep_expired(&conn, now)) {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, "cache sweep failed");
                0
            }
        }
    }

    /// Whether a durable tier is attached.
    pub fn is_durable(&self) -> bool {
        self.pool.is_some()
    }
}
