//! Client identity selection for outbound fetches.
//!
//! Social platforms serve their OpenGraph markup to link-preview crawlers
//! and an app-shell page to browsers, while most other sites do the
//! opposite and block unknown crawlers. Fetches therefore present a
//! crawler identity to the known social hosts and a desktop-browser
//! identity everywhere else.

use reqwest::Url;

const GENERIC_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const CRAWLER_UA: &str =
    "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)";

/// Hosts that gate their metadata behind a crawler identity. Subdomains
/// match too.
const SOCIAL_HOSTS: &[&str] = &["twitter.com", "x.com", "instagram.com", "tiktok.com"];

/// The identity a fetch presents to the remote server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientIdentity {
    /// A desktop browser.
    Generic,
    /// A link-preview crawler.
    SocialCrawler,
}

impl ClientIdentity {
    /// Pick the identity for a URL. Unparsable URLs get the generic one.
    pub fn for_url(url: &str) -> Self {
        let is_social = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(is_social_host))
            .unwrap_or(false);
        if is_social {
            Self::SocialCrawler
        } else {
            Self::Generic
        }
    }

    /// The User-Agent string for this identity.
    pub fn user_agent(self) -> &'static str {
        match self {
            Self::Generic => GENERIC_UA,
            Self::SocialCrawler => CRAWLER_UA,
        }
    }
}

fn is_social_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    SOCIAL_HOSTS
        .iter()
        .any(|social| host == *social || host.ends_with(&format!(".{}", social)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_social_hosts_get_crawler_identity() {
        for url in [
            "https://twitter.com/jane/status/1",
            "https://x.com/jane/status/1",
            "https://www.instagram.com/p/abc/",
            "https://mobile.twitter.com/jane",
            "https://www.tiktok.com/@jane/video/1",
        ] {
            assert_eq!(ClientIdentity::for_url(url), ClientIdentity::SocialCrawler);
        }
    }

    #[test]
    fn test_other_hosts_get_generic_identity() {
        for url in [
            "https://example.com/article",
            "https://news.ycombinator.com/item?id=1",
            // Suffix tricks must not match.
            "https://nottwitter.com/a",
            "https://x.com.evil.example/a",
        ] {
            assert_eq!(ClientIdentity::for_url(url), ClientIdentity::Generic);
        }
    }

    #[test]
    fn test_unparsable_url_defaults_generic() {
        assert_eq!(ClientIdentity::for_url("not a url"), ClientIdentity::Generic);
    }

    #[test]
    fn test_user_agents_differ() {
        assert_ne!(
            ClientIdentity::Generic.user_agent(),
            ClientIdentity::SocialCrawler.user_agent()
        );
        assert!(ClientIdentity::SocialCrawler
            .user_agent()
            .starts_with("facebookexternalhit"));
    }
}
