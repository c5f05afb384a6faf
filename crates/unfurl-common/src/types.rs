//! Resolved link preview record types.
//!
//! A [`MetadataRecord`] is produced exactly once per resolution attempt,
//! either synchronously from a cached payload decode or asynchronously from
//! a completed page fetch, and is immutable afterwards.

use serde::{Deserialize, Serialize};

/// Structured preview metadata for a single link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// The URL this record was resolved for (cache key).
    pub canonical_url: String,
    /// Page or content title.
    pub title: Option<String>,
    /// Short description / summary text.
    pub description: Option<String>,
    /// Best content image URL, if one was identified.
    pub image_url: Option<String>,
    /// Publisher / site display name.
    pub site_name: Option<String>,
    /// Author and engagement fields for social-platform links.
    pub social: Option<SocialInfo>,
}

/// Author and engagement fields extracted from social-platform sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialInfo {
    /// Author display name (e.g. "Jane Doe").
    pub author_name: Option<String>,
    /// Author handle including the `@` prefix (e.g. "@jane").
    pub handle: Option<String>,
    /// Like count as displayed, suffix preserved (e.g. "11K").
    pub like_count: Option<String>,
    /// Reply count as displayed, suffix preserved (e.g. "2K").
    pub reply_count: Option<String>,
    /// Author avatar image URL.
    pub avatar_url: Option<String>,
}

impl MetadataRecord {
    /// Create an empty record for the given URL.
    pub fn new<S: Into<String>>(canonical_url: S) -> Self {
        Self {
            canonical_url: canonical_url.into(),
            title: None,
            description: None,
            image_url: None,
            site_name: None,
            social: None,
        }
    }

    /// Whether this record carries anything worth rendering.
    ///
    /// True iff at least one of title, description, or image URL is present.
    /// Site name and social fields alone do not count.
    pub fn has_data(&self) -> bool {
        self.title.is_some() || self.description.is_some() || self.image_url.is_some()
    }

    /// Mutable access to the social fields, creating them on first use.
    pub fn social_mut(&mut self) -> &mut SocialInfo {
        self.social.get_or_insert_with(SocialInfo::default)
    }
}

impl SocialInfo {
    /// Whether every field is absent.
    pub fn is_empty(&self) -> bool {
        self.author_name.is_none()
            && self.handle.is_none()
            && self.like_count.is_none()
            && self.reply_count.is_none()
            && self.avatar_url.is_none()
    }
}
