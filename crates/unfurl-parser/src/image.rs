//! Image candidate scoring.
//!
//! Neither source format reliably flags "this is the content image": both
//! the archive payload and scraped HTML expose a flat pool of URL strings
//! mixing icons, avatars, tracking pixels, and actual content media. This
//! module ranks that pool with an additive heuristic and picks the best
//! candidate, kept deliberately separate from structured field extraction.

use std::sync::LazyLock;

use regex::Regex;

/// Candidates at or below this length are ignored.
const MIN_CANDIDATE_LEN: usize = 20;

/// A candidate is accepted only if its score is strictly above this.
const ACCEPT_THRESHOLD: i32 = -20;

/// Hostname fragments known to serve substantive content media.
const CONTENT_CDN_HOSTS: &[&str] = &[
    "pbs.twimg.com",
    "cdninstagram",
    "fbcdn",
    "i.ytimg.com",
    "img.youtube.com",
    "tiktokcdn",
    "i.redd.it",
    "preview.redd.it",
    "i.imgur.com",
];

/// Path segments that usually hold content media rather than site chrome.
const MEDIA_PATH_SEGMENTS: &[&str] =
    &["/media/", "/image/", "/images/", "/photo/", "/video/", "/thumb"];

/// Extensions recognized as images.
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".heic"];

/// Size hints like `640x480` or `_1200x` embedded in the URL.
static SIZE_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2,4}x\d").expect("size hint regex"));

/// Pick the best content-image URL out of a candidate pool.
///
/// Candidates must look like absolute http(s) URLs longer than
/// 20 characters; anything else is skipped. The highest-scoring candidate
/// wins, ties break by first-seen order, and nothing is returned unless the
/// winner scores above the acceptance threshold.
pub fn best_candidate<'a, I>(pool: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&str, i32)> = None;
    for candidate in pool {
        if !is_candidate(candidate) {
            continue;
        }
        let Some(score) = score(candidate) else {
            continue;
        };
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    match best {
        Some((url, score)) if score > ACCEPT_THRESHOLD => Some(url.to_string()),
        _ => None,
    }
}

/// Whether a string qualifies for scoring at all.
pub fn is_candidate(url: &str) -> bool {
    url.len() > MIN_CANDIDATE_LEN && (url.starts_with("http://") || url.starts_with("https://"))
}

/// Score a single URL, or `None` when it is rejected outright.
///
/// Favicon URLs are never content images regardless of what else they
/// match, so they are rejected rather than merely penalized.
pub fn score(url: &str) -> Option<i32> {
    let lower = url.to_ascii_lowercase();
    let (host, path) = split_host_path(&lower);
    let path_no_query = path.split(['?', '#']).next().unwrap_or(path);

    if lower.contains("favicon") || path_no_query.ends_with(".ico") {
        return None;
    }

    let mut score = 0i32;

    if path.contains("/icon") || path.contains("logo") {
        score -= 50;
    }
    if lower.contains("profile_image") || lower.contains("profile_pic") {
        score -= 30;
    }
    if lower.contains("/rsrc.php/") || lower.contains("static.") {
        score -= 40;
    }
    if CONTENT_CDN_HOSTS.iter().any(|cdn| host.contains(cdn)) {
        score += 25;
    }
    if MEDIA_PATH_SEGMENTS.iter().any(|seg| path.contains(seg)) {
        score += 20;
    }
    if is_platform_content(host, path) {
        score += 50;
    }
    if lower.contains("maxresdefault") || lower.contains("hqdefault") {
        score += 30;
    }
    if lower.contains("_large") || lower.contains("large.") {
        score += 20;
    }
    if SIZE_HINT.is_match(&lower) {
        score += 15;
    }
    if IMAGE_EXTENSIONS
        .iter()
        .any(|ext| path_no_query.ends_with(ext))
    {
        score += 10;
    }

    Some(score)
}

/// High-confidence platform content patterns: URL shapes that only ever
/// point at the actual post media on the big social platforms.
fn is_platform_content(host: &str, path: &str) -> bool {
    if host.contains("pbs.twimg.com") && path.starts_with("/media") {
        return true;
    }
    if host.contains("scontent") && host.contains("cdninstagram") {
        return true;
    }
    if (host.contains("i.ytimg.com") || host.contains("img.youtube.com"))
        && path.contains("/vi/")
    {
        return true;
    }
    if host.contains("tiktokcdn") {
        return true;
    }
    false
}

/// Split a lowercased absolute URL into (host, path-and-after).
fn split_host_path(url: &str) -> (&str, &str) {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    match rest.find('/') {
        Some(slash) => {
            let (host, path) = rest.split_at(slash);
            (host.split(['?', '#']).next().unwrap_or(host), path)
        }
        None => (rest.split(['?', '#']).next().unwrap_or(rest), ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favicon_rejected_outright() {
        assert!(score("https://example.com/favicon.ico").is_none());
        assert!(score("https://example.com/assets/favicon-32x32.png").is_none());
        assert!(score("https://example.com/media/something.ico").is_none());
    }

    #[test]
    fn test_favicon_never_selected() {
        // Even as the only candidate, a favicon must never win.
        let pool = vec!["https://example.com/media/favicon.ico"];
        assert_eq!(best_candidate(pool.iter().copied()), None);
    }

    #[test]
    fn test_content_path_beats_profile_image() {
        let profile = "https://pbs.twimg.com/profile_images/12345/me_400x400.jpg";
        let content = "https://pbs.twimg.com/media/ABCDEF123_large.jpg";
        let best = best_candidate([profile, content]).unwrap();
        assert_eq!(best, content);

        // Order must not matter.
        let best = best_candidate([content, profile]).unwrap();
        assert_eq!(best, content);
    }

    #[test]
    fn test_short_and_relative_urls_skipped() {
        assert!(!is_candidate("https://a.co/i.jpg"));
        assert!(!is_candidate("/relative/path/image_large.jpg"));
        assert!(is_candidate("https://example.com/media/a.jpg"));
    }

    #[test]
    fn test_icon_and_logo_penalized() {
        let icon = score("https://example.com/icons/app-icon.png").unwrap();
        let logo = score("https://example.com/assets/logo.png").unwrap();
        let photo = score("https://example.com/photo/vacation.png").unwrap();
        assert!(icon < photo);
        assert!(logo < photo);
    }

    #[test]
    fn test_low_scores_not_accepted() {
        // A lone site-chrome asset scores below the acceptance threshold.
        let pool = vec!["https://static.example.com/rsrc.php/v3/chrome.png"];
        assert_eq!(best_candidate(pool.iter().copied()), None);
    }

    #[test]
    fn test_youtube_thumbnail_pattern() {
        let thumb = score("https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg").unwrap();
        // CDN host + platform pattern + maxresdefault + extension.
        assert!(thumb >= 25 + 50 + 30 + 10);
    }

    #[test]
    fn test_size_hint_bonus() {
        let with_hint = score("https://example.com/img/photo_640x480.jpg").unwrap();
        let without = score("https://example.com/img/photo_x.jpg").unwrap();
        assert_eq!(with_hint - without, 15);
    }

    #[test]
    fn test_tie_breaks_first_seen() {
        let a = "https://example.com/media/first_640x480.jpg";
        let b = "https://example.com/media/other_640x480.jpg";
        assert_eq!(best_candidate([a, b]).unwrap(), a);
    }

    #[test]
    fn test_plain_extension_accepted() {
        let pool = vec!["https://example.com/img.jpg__long_enough"];
        // Not an image extension at the end; still above threshold at 0.
        assert!(best_candidate(pool.iter().copied()).is_some());
    }

    #[test]
    fn test_instagram_content_combination() {
        let url = "https://scontent-lga3-1.cdninstagram.com/v/t51.2885-15/post.jpg";
        assert!(score(url).unwrap() >= 75);
    }
}
