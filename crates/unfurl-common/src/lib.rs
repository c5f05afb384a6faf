//! Unfurl-Common: Shared types and error handling.
//!
//! This crate provides the pieces shared by every other unfurl crate:
//!
//! - **MetadataRecord**: the resolved link preview record
//! - **SocialInfo**: optional author/engagement fields on a record
//! - **Error Handling**: common error type and result alias
//!
//! # Examples
//!
//! ```
//! use unfurl_common::{MetadataRecord, Error, Result};
//!
//! let mut record = MetadataRecord::new("https://example.com/a");
//! assert!(!record.has_data());
//!
//! record.title = Some("Hello".to_string());
//! assert!(record.has_data());
//!
//! fn example() -> Result<()> {
//!     Err(Error::database("disk I/O error"))
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{MetadataRecord, SocialInfo};
