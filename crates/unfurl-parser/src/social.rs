//! Social-media title parsing.
//!
//! Social platforms pack structured engagement data into their page titles,
//! e.g. `Jane Doe (@jane)\n11K likes · 2K replies`. This parser recovers
//! the author, handle, and engagement counts from that shape. Counts stay
//! as display strings ("11K", "1.2M"); nothing here turns them into
//! numbers.

use std::sync::LazyLock;

use regex::Regex;

static HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((@[A-Za-z0-9_]+)\)").expect("handle regex"));

static LIKES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([\d][\d.,]*[KMB]?)\s+likes?\b").expect("likes regex"));

static REPLIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([\d][\d.,]*[KMB]?)\s+repl").expect("replies regex"));

/// Fields recovered from a social page title. Any subset may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialTitle {
    pub author_name: Option<String>,
    pub handle: Option<String>,
    pub like_count: Option<String>,
    pub reply_count: Option<String>,
}

impl SocialTitle {
    pub fn is_empty(&self) -> bool {
        self.author_name.is_none()
            && self.handle.is_none()
            && self.like_count.is_none()
            && self.reply_count.is_none()
    }
}

/// Parse a page title in the social-platform shape.
///
/// Never fails: fields that do not match are simply left unset, so a title
/// that is not in this shape at all yields an empty result. The first line
/// carries author and handle, the second carries engagement counts.
pub fn parse_social_title(title: &str) -> SocialTitle {
    let mut result = SocialTitle::default();

    let mut lines = title.lines();
    let first = lines.next().unwrap_or("");
    let second = lines.next().unwrap_or("");

    if let Some(caps) = HANDLE.captures(first) {
        result.handle = caps.get(1).map(|m| m.as_str().to_string());
        if let Some(m) = caps.get(0) {
            let author = first[..m.start()].trim();
            if !author.is_empty() {
                result.author_name = Some(author.to_string());
            }
        }
    }

    if let Some(caps) = LIKES.captures(second) {
        result.like_count = caps.get(1).map(|m| m.as_str().to_string());
    }
    if let Some(caps) = REPLIES.captures(second) {
        result.reply_count = caps.get(1).map(|m| m.as_str().to_string());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_social_title() {
        let parsed = parse_social_title("Jane Doe (@jane)\n11K likes · 2K replies");
        assert_eq!(parsed.author_name.as_deref(), Some("Jane Doe"));
        assert_eq!(parsed.handle.as_deref(), Some("@jane"));
        assert_eq!(parsed.like_count.as_deref(), Some("11K"));
        assert_eq!(parsed.reply_count.as_deref(), Some("2K"));
    }

    #[test]
    fn test_handle_only() {
        let parsed = parse_social_title("(@solo_handle)");
        assert_eq!(parsed.handle.as_deref(), Some("@solo_handle"));
        assert!(parsed.author_name.is_none());
        assert!(parsed.like_count.is_none());
    }

    #[test]
    fn test_decimal_and_comma_counts() {
        let parsed = parse_social_title("A (@a)\n1.2M Likes · 12,345 Replies");
        assert_eq!(parsed.like_count.as_deref(), Some("1.2M"));
        assert_eq!(parsed.reply_count.as_deref(), Some("12,345"));
    }

    #[test]
    fn test_singular_like() {
        let parsed = parse_social_title("A (@a)\n1 like · 1 reply");
        assert_eq!(parsed.like_count.as_deref(), Some("1"));
        assert_eq!(parsed.reply_count.as_deref(), Some("1"));
    }

    #[test]
    fn test_ordinary_title_yields_empty() {
        let parsed = parse_social_title("Breaking News: Something Happened");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_likes_without_handle_line() {
        // Counts only match on the second line.
        let parsed = parse_social_title("500 likes in one line");
        assert!(parsed.like_count.is_none());
    }

    #[test]
    fn test_parenthetical_without_at_sign_ignored() {
        let parsed = parse_social_title("Jane Doe (verified)\n11K likes");
        assert!(parsed.handle.is_none());
        assert!(parsed.author_name.is_none());
        assert_eq!(parsed.like_count.as_deref(), Some("11K"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_social_title("").is_empty());
    }
}
