//! User and member lookups backed by the Discord API.
//!
//! Two lookup depths exist: the regular SDK lookup, which returns the
//! lightweight user record, and a forced full fetch against the REST API,
//! which is the only way to see profile-only fields (banner, about-me).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serenity::http::Http;
use serenity::model::id::{GuildId, UserId};
use serenity::model::user::User;

use crate::error::{Error, Result};
use crate::model::{MembershipRef, UserRef};

/// Lookup of users by identifier.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Regular lookup; the result will not carry banner or about-me.
    async fn find_user(&self, id: u64) -> Result<UserRef>;

    /// Forced full fetch, bypassing any cached partial record.
    async fn fetch_full_user(&self, id: u64) -> Result<UserRef>;
}

/// Best-effort lookup of guild membership.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn find_member(&self, guild_id: u64, user_id: u64) -> Result<MembershipRef>;
}

/// Convert a serenity user into the domain type.
pub fn user_ref_from(user: &User) -> UserRef {
    UserRef {
        id: user.id.get(),
        username: user.name.clone(),
        global_name: user.global_name.clone(),
        discriminator: user.discriminator.map(|d| d.get()),
        avatar: user.avatar.map(|h| h.to_string()),
        banner: user.banner.map(|h| h.to_string()),
        about_me: None,
        bot: user.bot,
    }
}

/// Raw user record from `GET /users/{id}`. Carries the profile fields the
/// gateway user object omits.
#[derive(Debug, Clone, Deserialize)]
pub struct FullUser {
    pub id: String,
    pub username: String,
    pub global_name: Option<String>,
    pub discriminator: Option<String>,
    pub avatar: Option<String>,
    pub banner: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl FullUser {
    pub fn into_user_ref(self) -> Result<UserRef> {
        let id = self
            .id
            .parse::<u64>()
            .map_err(|_| Error::Other(format!("Invalid user id: {}", self.id)))?;

        // "0" marks accounts migrated to the new username system.
        let discriminator = self
            .discriminator
            .as_deref()
            .and_then(|d| d.parse::<u16>().ok())
            .filter(|d| *d != 0);

        Ok(UserRef {
            id,
            username: self.username,
            global_name: self.global_name,
            discriminator,
            avatar: self.avatar,
            banner: self.banner,
            about_me: self.bio.filter(|b| !b.is_empty()),
            bot: self.bot,
        })
    }
}

/// REST client for forced full fetches.
#[derive(Clone)]
pub struct ProfileApi {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ProfileApi {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            base_url: "https://discord.com/api/v10".to_string(),
        }
    }

    pub async fn fetch_user(&self, id: u64) -> Result<FullUser> {
        let url = format!("{}/users/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::unavailable(format!(
                "user {}: HTTP {}",
                id,
                response.status()
            )));
        }

        Ok(response.json::<FullUser>().await?)
    }
}

/// Serenity-backed directory used by the event handler.
pub struct DiscordDirectory {
    http: Arc<Http>,
    profile: ProfileApi,
}

impl DiscordDirectory {
    pub fn new(http: Arc<Http>, profile: ProfileApi) -> Self {
        Self { http, profile }
    }
}

#[async_trait]
impl UserDirectory for DiscordDirectory {
    async fn find_user(&self, id: u64) -> Result<UserRef> {
        let user = self.http.get_user(UserId::new(id)).await?;
        Ok(user_ref_from(&user))
    }

    async fn fetch_full_user(&self, id: u64) -> Result<UserRef> {
        self.profile.fetch_user(id).await?.into_user_ref()
    }
}

#[async_trait]
impl MemberDirectory for DiscordDirectory {
    async fn find_member(&self, guild_id: u64, user_id: u64) -> Result<MembershipRef> {
        let guild = GuildId::new(guild_id);
        let member = guild.member(&self.http, UserId::new(user_id)).await?;
        let guild_roles = guild.roles(&self.http).await?;

        // Role ids without a matching guild role are dropped; the everyone
        // role never appears in the member's role list.
        let roles = member
            .roles
            .iter()
            .filter_map(|id| guild_roles.get(id).map(|r| r.name.clone()))
            .collect();

        Ok(MembershipRef {
            joined_at: member.joined_at.and_then(timestamp_to_chrono),
            nick: member.nick.clone(),
            roles,
        })
    }
}

fn timestamp_to_chrono(ts: serenity::model::Timestamp) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(ts.unix_timestamp(), 0).single()
}
