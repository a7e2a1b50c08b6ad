//! Passive link rewriter: re-uploads CDN-hosted file links as attachments.

use std::sync::OnceLock;

use regex::Regex;

use crate::fetch::ResourceFetcher;
use crate::model::Attachment;

pub const MSG_LINKS_HEADER: &str = "📎 **Converted Discord file links:**";
pub const MSG_LINKS_FAILED: &str = "❌ Failed to convert one or more file links.";

fn file_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"https://(?:cdn\.discordapp\.com|media\.discordapp\.net)/attachments/\d+/\d+/\S+",
        )
        .expect("static regex")
    })
}

/// Extract hosted-file links from free text, query strings stripped.
pub fn extract_file_links(text: &str) -> Vec<String> {
    file_link_regex()
        .find_iter(text)
        .map(|m| m.as_str().split('?').next().unwrap_or(m.as_str()).to_string())
        .collect()
}

/// Outcome of scanning one message.
#[derive(Debug, PartialEq)]
pub enum RewriteOutcome {
    /// No hosted-file links in the message; it is not ours to answer.
    NotApplicable,
    /// At least one link fetched; bundle them in a single reply.
    Bundle(Vec<Attachment>),
    /// Every matched link failed to fetch.
    AllFailed,
}

/// Fetch each matched link and collect the successes. Partial failure is
/// silent; only total failure is reported.
pub async fn rewrite_links(text: &str, fetcher: &dyn ResourceFetcher) -> RewriteOutcome {
    let links = extract_file_links(text);
    if links.is_empty() {
        return RewriteOutcome::NotApplicable;
    }

    let mut attachments = Vec::new();
    for link in &links {
        match fetcher.fetch(link).await {
            Ok(attachment) => attachments.push(attachment),
            Err(e) => tracing::warn!("Failed to fetch file link {}: {}", link, e),
        }
    }

    if attachments.is_empty() {
        RewriteOutcome::AllFailed
    } else {
        RewriteOutcome::Bundle(attachments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use async_trait::async_trait;

    struct FakeFetcher {
        failing: Vec<String>,
    }

    #[async_trait]
    impl ResourceFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<Attachment> {
            if self.failing.iter().any(|f| url.contains(f.as_str())) {
                Err(Error::unavailable(url.to_string()))
            } else {
                Ok(Attachment {
                    filename: crate::fetch::filename_from_url(url),
                    bytes: vec![0],
                })
            }
        }
    }

    #[test]
    fn extracts_both_cdn_domains() {
        let text = "look https://cdn.discordapp.com/attachments/1/2/a.png and \
                    https://media.discordapp.net/attachments/3/4/b.mp4 here";
        let links = extract_file_links(text);
        assert_eq!(
            links,
            vec![
                "https://cdn.discordapp.com/attachments/1/2/a.png",
                "https://media.discordapp.net/attachments/3/4/b.mp4",
            ]
        );
    }

    #[test]
    fn strips_query_strings() {
        let text = "https://cdn.discordapp.com/attachments/1/2/a.png?ex=1&hm=2";
        assert_eq!(
            extract_file_links(text),
            vec!["https://cdn.discordapp.com/attachments/1/2/a.png"]
        );
    }

    #[test]
    fn ignores_other_urls() {
        assert!(extract_file_links("see https://example.com/attachments/1/2/a.png").is_empty());
        assert!(extract_file_links("plain text").is_empty());
    }

    #[tokio::test]
    async fn partial_failure_bundles_survivors() {
        let fetcher = FakeFetcher {
            failing: vec!["broken".to_string()],
        };
        let text = "https://cdn.discordapp.com/attachments/1/2/a.png \
                    https://cdn.discordapp.com/attachments/1/2/broken.png \
                    https://media.discordapp.net/attachments/3/4/b.mp4";

        match rewrite_links(text, &fetcher).await {
            RewriteOutcome::Bundle(attachments) => {
                assert_eq!(attachments.len(), 2);
                assert_eq!(attachments[0].filename, "a.png");
                assert_eq!(attachments[1].filename, "b.mp4");
            }
            other => panic!("expected bundle, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn total_failure_is_reported() {
        let fetcher = FakeFetcher {
            failing: vec!["attachments".to_string()],
        };
        let text = "https://cdn.discordapp.com/attachments/1/2/a.png";
        assert_eq!(rewrite_links(text, &fetcher).await, RewriteOutcome::AllFailed);
    }

    #[tokio::test]
    async fn no_links_is_not_applicable() {
        let fetcher = FakeFetcher { failing: vec![] };
        assert_eq!(
            rewrite_links("hello there", &fetcher).await,
            RewriteOutcome::NotApplicable
        );
    }
}
