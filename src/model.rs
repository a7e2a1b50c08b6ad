//! Core domain types: users, memberships, invocations, attachments.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Discord epoch in milliseconds (2015-01-01T00:00:00Z).
const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// Maximum image size requested from the CDN.
const MAX_IMAGE_SIZE: u32 = 4096;

/// Identity of a target user, sourced from the platform and never persisted.
///
/// Lightweight gateway user objects do not carry `banner` or `about_me`;
/// those fields are only populated after a forced full fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: u64,
    pub username: String,
    pub global_name: Option<String>,
    pub discriminator: Option<u16>,
    pub avatar: Option<String>,
    pub banner: Option<String>,
    pub about_me: Option<String>,
    pub bot: bool,
}

impl UserRef {
    /// Display tag: `name#NNNN` for legacy discriminators, bare username
    /// for the new username system.
    pub fn tag(&self) -> String {
        match self.discriminator {
            Some(d) => format!("{}#{:04}", self.username, d),
            None => self.username.clone(),
        }
    }

    /// Account creation time, derived from the snowflake id.
    pub fn created_at(&self) -> DateTime<Utc> {
        let ms = (self.id >> 22) as i64 + DISCORD_EPOCH_MS;
        Utc.timestamp_millis_opt(ms)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Max-resolution avatar URL. Animated hashes render as gif.
    /// Users without a custom avatar get the default embed avatar.
    pub fn avatar_url(&self) -> String {
        match &self.avatar {
            Some(hash) => format!(
                "https://cdn.discordapp.com/avatars/{}/{}.{}?size={}",
                self.id,
                hash,
                image_ext(hash),
                MAX_IMAGE_SIZE
            ),
            None => format!(
                "https://cdn.discordapp.com/embed/avatars/{}.png",
                self.default_avatar_index()
            ),
        }
    }

    /// Max-resolution banner URL, when a banner hash is present.
    pub fn banner_url(&self) -> Option<String> {
        self.banner.as_ref().map(|hash| {
            format!(
                "https://cdn.discordapp.com/banners/{}/{}.{}?size={}",
                self.id,
                hash,
                image_ext(hash),
                MAX_IMAGE_SIZE
            )
        })
    }

    fn default_avatar_index(&self) -> u64 {
        match self.discriminator {
            Some(d) => u64::from(d) % 5,
            None => (self.id >> 22) % 6,
        }
    }
}

/// Extension for a CDN image hash: animated hashes carry an `a_` prefix.
fn image_ext(hash: &str) -> &'static str {
    if hash.starts_with("a_") {
        "gif"
    } else {
        "png"
    }
}

/// Guild-scoped membership details, attached to profile cards only when
/// the invocation originated inside a guild and the target is a member.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipRef {
    pub joined_at: Option<DateTime<Utc>>,
    pub nick: Option<String>,
    /// Role names, excluding the implicit everyone role.
    pub roles: Vec<String>,
}

/// How an invocation arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    /// Platform-native slash command with typed, pre-resolved options.
    Structured,
    /// Plain message starting with the literal prefix, parsed manually.
    TextPrefixed,
}

/// One inbound command request.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub kind: InvocationKind,
    /// Structured-option target, already resolved by the platform.
    pub explicit_target: Option<UserRef>,
    /// Mentioned users, in message order.
    pub mentions: Vec<UserRef>,
    /// Whitespace-delimited argument tokens after the command name.
    pub args: Vec<String>,
    pub invoker: UserRef,
    pub guild_id: Option<u64>,
}

/// A named byte payload, built per-request and discarded after the reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64) -> UserRef {
        UserRef {
            id,
            username: "vegeta".to_string(),
            global_name: None,
            discriminator: None,
            avatar: None,
            banner: None,
            about_me: None,
            bot: false,
        }
    }

    #[test]
    fn tag_with_legacy_discriminator() {
        let mut u = user(1);
        u.discriminator = Some(42);
        assert_eq!(u.tag(), "vegeta#0042");
    }

    #[test]
    fn tag_without_discriminator() {
        assert_eq!(user(1).tag(), "vegeta");
    }

    #[test]
    fn created_at_from_snowflake() {
        // Snowflake 0 maps to the Discord epoch.
        let u = user(0);
        assert_eq!(u.created_at().timestamp_millis(), DISCORD_EPOCH_MS);
    }

    #[test]
    fn avatar_url_static_hash() {
        let mut u = user(123);
        u.avatar = Some("abcdef".to_string());
        assert_eq!(
            u.avatar_url(),
            "https://cdn.discordapp.com/avatars/123/abcdef.png?size=4096"
        );
    }

    #[test]
    fn avatar_url_animated_hash_is_gif() {
        let mut u = user(123);
        u.avatar = Some("a_bcdef".to_string());
        assert!(u.avatar_url().ends_with(".gif?size=4096"));
    }

    #[test]
    fn avatar_url_default_when_no_hash() {
        let u = user(123);
        assert!(u
            .avatar_url()
            .starts_with("https://cdn.discordapp.com/embed/avatars/"));
    }

    #[test]
    fn banner_url_absent_without_hash() {
        assert!(user(5).banner_url().is_none());
    }

    #[test]
    fn banner_url_present_with_hash() {
        let mut u = user(5);
        u.banner = Some("a_feed".to_string());
        assert_eq!(
            u.banner_url().unwrap(),
            "https://cdn.discordapp.com/banners/5/a_feed.gif?size=4096"
        );
    }
}
