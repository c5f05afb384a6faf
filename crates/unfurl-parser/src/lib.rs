//! Unfurl-Parser: HTML metadata parsing, social title parsing, and image
//! candidate scoring.
//!
//! Everything in this crate is pure and total: functions take strings in
//! and produce records or `Option`s out, with no I/O and no panics on
//! arbitrary input. Fetching lives in the resolver, not here.

pub mod html;
pub mod image;
pub mod social;

pub use html::parse as parse_html;
pub use image::best_candidate;
pub use social::{parse_social_title, SocialTitle};
