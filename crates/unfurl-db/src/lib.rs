//! Unfurl-DB: durable metadata cache tier.
//!
//! SQLite-backed storage for resolved link metadata, using rusqlite with
//! r2d2 connection pooling. Rows live for 7 days; expiry is enforced on
//! read and by an explicit sweep.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching the database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use unfurl_db::models::CachedMetadata;
//! use unfurl_db::pool::{get_conn, init_pool};
//! use unfurl_db::queries::metadata_cache;
//!
//! let pool = init_pool("/var/lib/unfurl/cache.sqlite").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let hit = metadata_cache::get(&conn, "https://example.com/a", 1_700_000_000).unwrap();
//! assert!(hit.is_none());
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;

pub use models::CachedMetadata;
pub use pool::{get_conn, init_pool, DbPool};
pub use queries::metadata_cache::CACHE_TTL_SECS;
