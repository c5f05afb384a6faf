//! Unfurl-Archive: keyed-archive payload decoding and field extraction.
//!
//! Platforms hand the resolver an opaque, remotely-supplied payload
//! alongside some links: a keyed-archive object graph in either its binary
//! or JSON-bridged encoding. This crate turns those bytes into a typed,
//! reference-normalized [`ObjectGraph`] and pulls the preview metadata
//! fields out of it.
//!
//! Both stages are total over untrusted input: decoding returns a
//! [`DecodeError`] and extraction returns `None`; neither ever panics.
//!
//! # Example
//!
//! ```
//! use unfurl_archive::{decode, extract_record};
//!
//! let payload = br#"{
//!     "$objects": [
//!         "$null",
//!         {"title": {"CF$UID": 2}, "siteName": {"CF$UID": 3}},
//!         "Hello",
//!         "Example"
//!     ],
//!     "$top": {"root": {"CF$UID": 1}}
//! }"#;
//!
//! let graph = decode(payload).unwrap();
//! let record = extract_record(&graph, "https://example.com/a").unwrap();
//! assert_eq!(record.title.as_deref(), Some("Hello"));
//! assert_eq!(record.site_name.as_deref(), Some("Example"));
//! ```

pub mod error;
pub mod extract;
pub mod graph;
pub mod reader;

pub use error::DecodeError;
pub use extract::extract_record;
pub use graph::{Node, ObjectGraph, Scalar};
pub use reader::decode;
