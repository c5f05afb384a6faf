//! HTML metadata extraction.
//!
//! Publisher HTML is attacker-controlled and rarely well-formed, so this
//! parser never builds a DOM. It scans every `<meta>` tag, matching the
//! `property`/`name` attribute and the `content` attribute independently of
//! order and quoting, collects the OpenGraph and Twitter Card field sets
//! plus the generic fallbacks, and merges them with per-field priority:
//! OpenGraph, else Twitter, else (title only) the `<title>` tag text.

use std::sync::LazyLock;

use regex::Regex;
use unfurl_common::MetadataRecord;

use crate::image;

static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\s[^>]*>").expect("meta tag regex"));

/// One attribute with its value, in any quoting style. Matching
/// sequentially with this consumes each quoted value whole, so text inside
/// a value can never be mistaken for a later attribute name.
static META_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z][a-z0-9:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("meta attribute regex")
});

static TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title tag regex"));

/// Collected field sets before priority merging. First non-empty
/// occurrence per field wins.
#[derive(Debug, Default)]
struct MetaFields {
    og_title: Option<String>,
    og_description: Option<String>,
    og_site_name: Option<String>,
    tw_title: Option<String>,
    tw_description: Option<String>,
    tw_site: Option<String>,
    generic_description: Option<String>,
    /// Image candidates in priority order (OpenGraph before Twitter).
    og_images: Vec<String>,
    tw_images: Vec<String>,
}

/// Parse fetched HTML into a preview record for `url`.
///
/// The result may be empty (`has_data() == false`); callers must not cache
/// an empty record.
pub fn parse(html: &str, url: &str) -> MetadataRecord {
    let mut fields = MetaFields::default();

    for tag in META_TAG.find_iter(html) {
        let (Some(key), Some(content)) = key_and_content(tag.as_str()) else {
            continue;
        };
        collect(&mut fields, &key.to_ascii_lowercase(), content);
    }

    let title_tag = TITLE_TAG
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|s| !s.is_empty());

    let mut record = MetadataRecord::new(url);
    record.title = fields.og_title.or(fields.tw_title).or(title_tag);
    record.description = fields
        .og_description
        .or(fields.tw_description)
        .or(fields.generic_description);
    record.site_name = fields.og_site_name.or(fields.tw_site);

    let candidates: Vec<String> = fields
        .og_images
        .into_iter()
        .chain(fields.tw_images)
        .filter(|url| !url.contains("profile_images") && !url.contains("_normal"))
        .collect();
    record.image_url = image::best_candidate(candidates.iter().map(String::as_str));

    record
}

fn collect(fields: &mut MetaFields, key: &str, content: String) {
    let slot = match key {
        "og:title" => &mut fields.og_title,
        "og:description" => &mut fields.og_description,
        "og:site_name" => &mut fields.og_site_name,
        "twitter:title" => &mut fields.tw_title,
        "twitter:description" => &mut fields.tw_description,
        "twitter:site" | "twitter:creator" => &mut fields.tw_site,
        "description" => &mut fields.generic_description,
        "og:image" | "og:image:url" | "og:image:secure_url" => {
            fields.og_images.push(content);
            return;
        }
        "twitter:image" | "twitter:image:src" => {
            fields.tw_images.push(content);
            return;
        }
        _ => return,
    };
    if slot.is_none() {
        *slot = Some(content);
    }
}

/// Walk a tag's attributes pairwise and pull out the key
/// (`property`/`name`) and `content` values, first non-empty occurrence of
/// each.
fn key_and_content(tag: &str) -> (Option<String>, Option<String>) {
    let mut key = None;
    let mut content = None;

    for caps in META_ATTR.captures_iter(tag) {
        let Some(attr) = caps.get(1) else { continue };
        let raw = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
            .unwrap_or("");
        let value = clean_text(raw);
        if value.is_empty() {
            continue;
        }
        match attr.as_str().to_ascii_lowercase().as_str() {
            "property" | "name" if key.is_none() => key = Some(value),
            "content" if content.is_none() => content = Some(value),
            _ => {}
        }
    }

    (key, content)
}

/// Decode the supported HTML entities and trim surrounding whitespace.
fn clean_text(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_og_basic_fields() {
        let html = r#"<html><head>
            <meta property="og:title" content="Hello">
            <meta property="og:description" content="A story">
            <meta property="og:site_name" content="Example">
            <meta property="og:image" content="https://example.com/img.jpg">
        </head></html>"#;
        let record = parse(html, "https://example.com/a");

        assert_eq!(record.title.as_deref(), Some("Hello"));
        assert_eq!(record.description.as_deref(), Some("A story"));
        assert_eq!(record.site_name.as_deref(), Some("Example"));
        assert_eq!(record.image_url.as_deref(), Some("https://example.com/img.jpg"));
        assert!(record.has_data());
    }

    #[test]
    fn test_entity_decoding() {
        let html = r#"<meta property="og:title" content="Foo &amp; Bar">"#;
        let record = parse(html, "https://example.com");
        assert_eq!(record.title.as_deref(), Some("Foo & Bar"));
    }

    #[test]
    fn test_all_supported_entities() {
        let html =
            r#"<meta property="og:title" content="&lt;b&gt; &quot;x&quot; &#39;y&apos; &amp;z">"#;
        let record = parse(html, "https://example.com");
        assert_eq!(record.title.as_deref(), Some(r#"<b> "x" 'y' &z"#));
    }

    #[test]
    fn test_og_beats_twitter() {
        let html = r#"
            <meta name="twitter:title" content="From Twitter">
            <meta property="og:title" content="From OpenGraph">
        "#;
        let record = parse(html, "https://example.com");
        assert_eq!(record.title.as_deref(), Some("From OpenGraph"));
    }

    #[test]
    fn test_twitter_fallback() {
        let html = r#"
            <meta name="twitter:title" content="Tweet Title">
            <meta name="twitter:description" content="Tweet text">
        "#;
        let record = parse(html, "https://example.com");
        assert_eq!(record.title.as_deref(), Some("Tweet Title"));
        assert_eq!(record.description.as_deref(), Some("Tweet text"));
    }

    #[test]
    fn test_title_tag_fallback() {
        let html = "<html><head><title>Page Title</title></head></html>";
        let record = parse(html, "https://example.com");
        assert_eq!(record.title.as_deref(), Some("Page Title"));
    }

    #[test]
    fn test_generic_description_fallback() {
        let html = r#"<meta name="description" content="Generic description">"#;
        let record = parse(html, "https://example.com");
        assert_eq!(record.description.as_deref(), Some("Generic description"));
    }

    #[test]
    fn test_attribute_order_and_quoting() {
        let html = concat!(
            r#"<meta content="Reversed" property="og:title">"#,
            r#"<meta property='og:description' content='Single quoted'>"#,
            "<meta property=og:site_name content=Unquoted>",
        );
        let record = parse(html, "https://example.com");
        assert_eq!(record.title.as_deref(), Some("Reversed"));
        assert_eq!(record.description.as_deref(), Some("Single quoted"));
        assert_eq!(record.site_name.as_deref(), Some("Unquoted"));
    }

    #[test]
    fn test_attribute_names_inside_values_ignored() {
        // A content value mentioning name= or property= must not be taken
        // as the tag's key, whichever attribute comes first.
        let html = concat!(
            r#"<meta content="see name=foo" property="og:title">"#,
            r#"<meta content="property=bar wins" name="og:description">"#,
        );
        let record = parse(html, "https://example.com");
        assert_eq!(record.title.as_deref(), Some("see name=foo"));
        assert_eq!(record.description.as_deref(), Some("property=bar wins"));
    }

    #[test]
    fn test_first_nonempty_occurrence_wins() {
        let html = r#"
            <meta property="og:title" content="">
            <meta property="og:title" content="First Real">
            <meta property="og:title" content="Second">
        "#;
        let record = parse(html, "https://example.com");
        assert_eq!(record.title.as_deref(), Some("First Real"));
    }

    #[test]
    fn test_profile_image_candidates_rejected() {
        let html = r#"
            <meta property="og:title" content="Post">
            <meta property="og:image" content="https://pbs.twimg.com/profile_images/1/me.jpg">
            <meta name="twitter:image" content="https://cdn.example.com/avatar_normal.png">
        "#;
        let record = parse(html, "https://example.com");
        assert!(record.image_url.is_none());
    }

    #[test]
    fn test_secure_url_variant_collected() {
        let html = r#"<meta property="og:image:secure_url" content="https://example.com/pic.png">"#;
        let record = parse(html, "https://example.com");
        assert_eq!(record.image_url.as_deref(), Some("https://example.com/pic.png"));
    }

    #[test]
    fn test_unparsable_html_yields_empty_record() {
        let record = parse("<<<<>>>> not html at all &&& <meta", "https://example.com");
        assert!(!record.has_data());
    }

    #[test]
    fn test_empty_result_is_flagged_empty() {
        let html = r#"<meta name="twitter:site" content="@example">"#;
        let record = parse(html, "https://example.com");
        // Site name alone is not renderable data.
        assert!(!record.has_data());
    }
}
