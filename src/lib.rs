//! Unfurl - link metadata resolution engine
//!
//! Given a URL, and optionally an opaque archive payload that accompanied
//! it, produce the structured metadata a client renders as a link preview
//! card. This library crate exposes the cache and resolver for integration
//! testing; the binary adds the CLI on top.

pub mod cache;
pub mod resolver;
