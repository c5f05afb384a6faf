//! Database query operations.

pub mod metadata_cache;
