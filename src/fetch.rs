//! Resource fetcher: downloads a remote URL into a named attachment.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::model::{Attachment, UserRef};

/// Seam for fetching remote resources, so command handling can be tested
/// without network access.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch `url` in a single attempt and wrap the bytes as an attachment
    /// named after the URL's final path segment.
    async fn fetch(&self, url: &str) -> Result<Attachment>;
}

/// Reqwest-backed fetcher used in production.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Attachment> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::unavailable(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::unavailable(format!(
                "{}: HTTP {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::unavailable(format!("{}: {}", url, e)))?;

        Ok(Attachment {
            filename: filename_from_url(url),
            bytes: bytes.to_vec(),
        })
    }
}

/// Infer a filename from the URL's last path segment, query string stripped.
/// Never returns an empty name.
pub fn filename_from_url(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    let segment = without_query.rsplit('/').next().unwrap_or("");
    if segment.is_empty() {
        "file.bin".to_string()
    } else {
        segment.to_string()
    }
}

/// Filename for a downloaded avatar: gif iff the source URL is animated.
pub fn avatar_filename(user: &UserRef, url: &str) -> String {
    format!("{}_avatar.{}", user.username, image_ext_for(url))
}

/// Filename for a downloaded banner.
pub fn banner_filename(user: &UserRef, url: &str) -> String {
    format!("{}_banner.{}", user.username, image_ext_for(url))
}

fn image_ext_for(url: &str) -> &'static str {
    if url.contains(".gif") {
        "gif"
    } else {
        "png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserRef {
        UserRef {
            id: 1,
            username: "kakarot".to_string(),
            global_name: None,
            discriminator: None,
            avatar: None,
            banner: None,
            about_me: None,
            bot: false,
        }
    }

    #[test]
    fn filename_strips_query_parameters() {
        assert_eq!(
            filename_from_url(
                "https://cdn.discordapp.com/attachments/1/2/pic.png?ex=66&is=77"
            ),
            "pic.png"
        );
    }

    #[test]
    fn filename_takes_last_segment() {
        assert_eq!(
            filename_from_url("https://media.discordapp.net/attachments/1/2/clip.mp4"),
            "clip.mp4"
        );
    }

    #[test]
    fn filename_never_empty() {
        assert_eq!(filename_from_url("https://example.com/"), "file.bin");
    }

    #[test]
    fn avatar_filename_png_by_default() {
        assert_eq!(
            avatar_filename(&user(), "https://cdn.discordapp.com/avatars/1/abc.png?size=4096"),
            "kakarot_avatar.png"
        );
    }

    #[test]
    fn avatar_filename_gif_for_animated() {
        assert_eq!(
            avatar_filename(&user(), "https://cdn.discordapp.com/avatars/1/a_abc.gif?size=4096"),
            "kakarot_avatar.gif"
        );
    }

    #[test]
    fn banner_filename_matches_pattern() {
        assert_eq!(
            banner_filename(&user(), "https://cdn.discordapp.com/banners/1/abc.png"),
            "kakarot_banner.png"
        );
    }
}
