//! Profile formatter: builds info and about-me cards for a user.

use serenity::builder::CreateEmbed;
use serenity::model::Timestamp;

use crate::model::{MembershipRef, UserRef};

/// Embed accent color shared by all cards.
pub const CARD_COLOR: u32 = 0x00AE86;

/// Shown on the about-me card when the user has no biography.
pub const NO_ABOUT_ME: &str = "This user has no about me section.";

/// A structured reply body, kept SDK-free so formatting is testable.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: String,
    pub fields: Vec<CardField>,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Card {
    fn field(&mut self, name: &str, value: impl Into<String>, inline: bool) {
        self.fields.push(CardField {
            name: name.to_string(),
            value: value.into(),
            inline,
        });
    }

    pub fn into_embed(self) -> CreateEmbed {
        let mut embed = CreateEmbed::new()
            .title(self.title)
            .thumbnail(self.thumbnail)
            .color(self.color)
            .timestamp(Timestamp::now());
        if let Some(description) = self.description {
            embed = embed.description(description);
        }
        for f in self.fields {
            embed = embed.field(f.name, f.value, f.inline);
        }
        embed
    }
}

/// Discord's long date-time markup for a unix timestamp.
fn discord_timestamp(secs: i64) -> String {
    format!("<t:{}:F>", secs)
}

/// Build the user information card. Membership details are appended only
/// when the target resolves as a member of the originating guild.
pub fn user_info_card(user: &UserRef, membership: Option<&MembershipRef>) -> Card {
    let mut card = Card {
        title: format!("User Information - {}", user.tag()),
        description: None,
        thumbnail: user.avatar_url(),
        fields: Vec::new(),
        color: CARD_COLOR,
    };

    card.field("Username", user.username.clone(), true);
    card.field(
        "Discriminator",
        user.discriminator
            .map(|d| format!("{:04}", d))
            .unwrap_or_else(|| "None".to_string()),
        true,
    );
    card.field("User ID", user.id.to_string(), true);
    card.field(
        "Account Created",
        discord_timestamp(user.created_at().timestamp()),
        false,
    );
    card.field("Bot Account", if user.bot { "Yes" } else { "No" }, true);

    if let Some(member) = membership {
        if let Some(joined) = member.joined_at {
            card.field("Joined Server", discord_timestamp(joined.timestamp()), false);
        }
        let roles = if member.roles.is_empty() {
            "None".to_string()
        } else {
            member.roles.join(", ")
        };
        card.field("Roles", roles, false);

        if let Some(nick) = &member.nick {
            card.field("Nickname", nick.clone(), true);
        }
    }

    card
}

/// Build the about-me card: biography verbatim, or a fixed placeholder.
pub fn about_me_card(user: &UserRef) -> Card {
    Card {
        title: format!("About Me - {}", user.tag()),
        description: Some(
            user.about_me
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NO_ABOUT_ME.to_string()),
        ),
        thumbnail: user.avatar_url(),
        fields: Vec::new(),
        color: CARD_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn user() -> UserRef {
        UserRef {
            id: 77,
            username: "bulma".to_string(),
            global_name: Some("Bulma".to_string()),
            discriminator: None,
            avatar: Some("abc".to_string()),
            banner: None,
            about_me: None,
            bot: false,
        }
    }

    fn field<'a>(card: &'a Card, name: &str) -> &'a CardField {
        card.fields
            .iter()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("missing field {}", name))
    }

    #[test]
    fn info_card_has_core_fields() {
        let card = user_info_card(&user(), None);
        assert_eq!(card.title, "User Information - bulma");
        assert_eq!(field(&card, "Username").value, "bulma");
        assert_eq!(field(&card, "User ID").value, "77");
        assert_eq!(field(&card, "Bot Account").value, "No");
        assert!(field(&card, "Account Created").value.starts_with("<t:"));
        assert!(card.fields.iter().all(|f| f.name != "Roles"));
    }

    #[test]
    fn info_card_roles_none_when_empty() {
        let membership = MembershipRef {
            joined_at: Some(Utc.timestamp_opt(1_600_000_000, 0).unwrap()),
            nick: None,
            roles: Vec::new(),
        };
        let card = user_info_card(&user(), Some(&membership));
        assert_eq!(field(&card, "Roles").value, "None");
        assert_eq!(
            field(&card, "Joined Server").value,
            "<t:1600000000:F>"
        );
        assert!(card.fields.iter().all(|f| f.name != "Nickname"));
    }

    #[test]
    fn info_card_lists_roles_and_nickname() {
        let membership = MembershipRef {
            joined_at: None,
            nick: Some("Prince".to_string()),
            roles: vec!["Saiyan".to_string(), "Elite".to_string()],
        };
        let card = user_info_card(&user(), Some(&membership));
        assert_eq!(field(&card, "Roles").value, "Saiyan, Elite");
        assert_eq!(field(&card, "Nickname").value, "Prince");
    }

    #[test]
    fn about_me_card_uses_bio_verbatim() {
        let mut u = user();
        u.about_me = Some("Strongest in the universe.".to_string());
        let card = about_me_card(&u);
        assert_eq!(card.title, "About Me - bulma");
        assert_eq!(card.description.as_deref(), Some("Strongest in the universe."));
    }

    #[test]
    fn about_me_card_placeholder_when_absent() {
        let card = about_me_card(&user());
        assert_eq!(card.description.as_deref(), Some(NO_ABOUT_ME));
    }
}
