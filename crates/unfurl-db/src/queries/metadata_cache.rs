//! Metadata cache queries.
//!
//! Reads and writes for the durable cache tier. Freshness is enforced at
//! read time: a row older than [`CACHE_TTL_SECS`] is deleted on lookup and
//! reported as a miss, so the table self-heals even without sweeps. All
//! operations take `now` as unix epoch seconds from the caller, which keeps
//! expiry testable without real clocks.

use rusqlite::{params, Connection};
use unfurl_common::{Error, Result};

use crate::models::CachedMetadata;

/// How long a cached row stays valid: 7 days, in seconds.
pub const CACHE_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Look up a fresh cache row for an exact URL.
///
/// Returns `None` on a miss. A stale row counts as a miss and is deleted
/// before returning.
pub fn get(conn: &Connection, url: &str, now: i64) -> Result<Option<CachedMetadata>> {
    let row = match conn.query_row(
        "SELECT url, title, description, image_url, site_name, cached_at
         FROM metadata_cache WHERE url = ?1",
        params![url],
        |row| {
            Ok(CachedMetadata {
                url: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                image_url: row.get(3)?,
                site_name: row.get(4)?,
                cached_at: row.get(5)?,
            })
        },
    ) {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(Error::database(e.to_string())),
    };

    if now - row.cached_at >= CACHE_TTL_SECS {
        delete(conn, url)?;
        return Ok(None);
    }

    Ok(Some(row))
}

/// Insert or replace the cache row for a URL.
pub fn put(conn: &Connection, entry: &CachedMetadata) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata_cache
         (url, title, description, image_url, site_name, cached_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.url,
            entry.title,
            entry.description,
            entry.image_url,
            entry.site_name,
            entry.cached_at,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Delete the cache row for a URL. Returns whether a row existed.
pub fn delete(conn: &Connection, url: &str) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM metadata_cache WHERE url = ?1", params![url])
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(affected > 0)
}

/// Delete every row older than the TTL. Returns the number removed.
pub fn sweep_expired(conn: &Connection, now: i64) -> Result<usize> {
    let affected = conn
        .execute(
            "DELETE FROM metadata_cache WHERE cached_at <= ?1",
            params![now - CACHE_TTL_SECS],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{init_memory_pool, PooledConnection};

    const NOW: i64 = 1_700_000_000;

    fn setup_test_db() -> PooledConnection {
        let pool = init_memory_pool().unwrap();
        pool.get().unwrap()
    }

    fn entry(url: &str, cached_at: i64) -> CachedMetadata {
        CachedMetadata {
            url: url.to_string(),
            title: Some("Hello".to_string()),
            description: None,
            image_url: Some("https://example.com/media/img.jpg".to_string()),
            site_name: Some("Example".to_string()),
            cached_at,
        }
    }

    #[test]
    fn test_put_and_get() {
        let conn = setup_test_db();
        put(&conn, &entry("https://example.com/a", NOW)).unwrap();

        let row = get(&conn, "https://example.com/a", NOW).unwrap().unwrap();
        assert_eq!(row.title.as_deref(), Some("Hello"));
        assert_eq!(row.cached_at, NOW);
    }

    #[test]
    fn test_get_nonexistent() {
        let conn = setup_test_db();
        assert!(get(&conn, "https://example.com/missing", NOW)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_exact_url_match_only() {
        let conn = setup_test_db();
        put(&conn, &entry("https://example.com/a", NOW)).unwrap();

        // Same page, different string: a different cache key.
        assert!(get(&conn, "https://example.com/a?x=1", NOW)
            .unwrap()
            .is_none());
        assert!(get(&conn, "https://example.com/A", NOW).unwrap().is_none());
    }

    #[test]
    fn test_stale_row_deleted_on_read() {
        let conn = setup_test_db();
        put(&conn, &entry("https://example.com/a", NOW - CACHE_TTL_SECS - 1)).unwrap();

        assert!(get(&conn, "https://example.com/a", NOW).unwrap().is_none());

        // The stale row is gone, not just hidden.
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM metadata_cache", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_row_at_exact_ttl_is_stale() {
        let conn = setup_test_db();
        put(&conn, &entry("https://example.com/a", NOW - CACHE_TTL_SECS)).unwrap();
        assert!(get(&conn, "https://example.com/a", NOW).unwrap().is_none());
    }

    #[test]
    fn test_row_just_under_ttl_is_fresh() {
        let conn = setup_test_db();
        put(&conn, &entry("https://example.com/a", NOW - CACHE_TTL_SECS + 1)).unwrap();
        assert!(get(&conn, "https://example.com/a", NOW).unwrap().is_some());
    }

    #[test]
    fn test_put_replaces_existing() {
        let conn = setup_test_db();
        put(&conn, &entry("https://example.com/a", NOW - 100)).unwrap();

        let mut updated = entry("https://example.com/a", NOW);
        updated.title = Some("Updated".to_string());
        put(&conn, &updated).unwrap();

        let row = get(&conn, "https://example.com/a", NOW).unwrap().unwrap();
        assert_eq!(row.title.as_deref(), Some("Updated"));
        assert_eq!(row.cached_at, NOW);
    }

    #[test]
    fn test_sweep_expired() {
        let conn = setup_test_db();
        put(&conn, &entry("https://example.com/old", NOW - CACHE_TTL_SECS - 10)).unwrap();
        put(&conn, &entry("https://example.com/older", NOW - CACHE_TTL_SECS * 2)).unwrap();
        put(&conn, &entry("https://example.com/fresh", NOW - 60)).unwrap();

        let removed = sweep_expired(&conn, NOW).unwrap();
        assert_eq!(removed, 2);

        assert!(get(&conn, "https://example.com/fresh", NOW).unwrap().is_some());
        assert!(get(&conn, "https://example.com/old", NOW).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let conn = setup_test_db();
        put(&conn, &entry("https://example.com/a", NOW)).unwrap();

        assert!(delete(&conn, "https://example.com/a").unwrap());
        assert!(!delete(&conn, "https://example.com/a").unwrap());
    }
}
