//! Metadata field extraction from a decoded object graph.
//!
//! The archive format guarantees no stable index for the metadata node, so
//! extraction scans dict nodes in graph order for the first one carrying
//! both a `title` and a `siteName` key, then resolves the named fields
//! through reference indirection. Every lookup is total: a missing or
//! malformed field leaves its record slot empty.

use unfurl_common::MetadataRecord;

use crate::graph::{Node, ObjectGraph, Scalar};

/// Keys that may carry the string inside a nested URL node.
const URL_KEYS: &[&str] = &["URL", "url", "NS.relative", "relative"];

/// How deep `resolve_url_string` will chase nested URL nodes.
const MAX_URL_DEPTH: usize = 4;

/// Extract a preview record from a decoded graph.
///
/// Returns `None` when no dict carries both `title` and `siteName`, or when
/// the resolved title is empty: a record without a title is never built.
pub fn extract_record(graph: &ObjectGraph, canonical_url: &str) -> Option<MetadataRecord> {
    let (_, fields) = graph
        .dicts()
        .find(|(_, map)| map.contains_key("title") && map.contains_key("siteName"))?;

    let title = fields
        .get("title")
        .and_then(|&index| graph.resolve_text(index))
        .map(str::trim)
        .filter(|s| !s.is_empty())?;

    let mut record = MetadataRecord::new(canonical_url);
    record.title = Some(title.to_string());
    record.description = resolve_trimmed(graph, fields.get("summary"));
    record.site_name = resolve_trimmed(graph, fields.get("siteName"));
    record.image_url = fields
        .get("image")
        .and_then(|&index| resolve_url_string(graph, index, 0));

    if let Some(avatar) = fields
        .get("icon")
        .and_then(|&index| resolve_url_string(graph, index, 0))
    {
        record.social_mut().avatar_url = Some(avatar);
    }

    Some(record)
}

fn resolve_trimmed(graph: &ObjectGraph, index: Option<&usize>) -> Option<String> {
    index
        .and_then(|&i| graph.resolve_text(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Resolve a field to a URL string through nested indirection.
///
/// URL-valued fields point at a nested metadata node which in turn points
/// at the URL node holding the actual string; a direct string is also
/// accepted. Shared by the `image` and `icon` fields.
fn resolve_url_string(graph: &ObjectGraph, index: usize, depth: usize) -> Option<String> {
    if depth > MAX_URL_DEPTH {
        return None;
    }
    match graph.resolve(index)? {
        Node::Scalar(Scalar::Text(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Node::Dict(map) => URL_KEYS.iter().find_map(|key| {
            map.get(*key)
                .and_then(|&next| resolve_url_string(graph, next, depth + 1))
        }),
        _ => None,
    }
}
