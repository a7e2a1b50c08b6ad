//! Command dispatcher: maps invocations to the four profile operations.

use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::application::CommandOptionType;

use crate::card::{about_me_card, user_info_card, Card};
use crate::discord::directory::{MemberDirectory, UserDirectory};
use crate::discord::resolver::resolve_target;
use crate::error::{Error, Result};
use crate::fetch::{avatar_filename, banner_filename, ResourceFetcher};
use crate::model::{Attachment, Invocation};

pub const MSG_AVATAR_FAILED: &str = "❌ Failed to get avatar.";
pub const MSG_BANNER_FAILED: &str =
    "❌ This user doesn't have a banner or failed to get banner.";
pub const MSG_ABOUT_FAILED: &str = "❌ Failed to get user's about me section.";
pub const MSG_USER_NOT_FOUND: &str = "❌ User not found.";
pub const MSG_GENERIC_ERROR: &str = "❌ An error occurred while processing the command.";

/// The bot's command surface; slash and prefix forms map one-to-one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Avatar,
    Banner,
    UserInfo,
    AboutMe,
}

impl BotCommand {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "avatar" => Some(Self::Avatar),
            "banner" => Some(Self::Banner),
            "userinfo" => Some(Self::UserInfo),
            "useraboutme" => Some(Self::AboutMe),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Banner => "banner",
            Self::UserInfo => "userinfo",
            Self::AboutMe => "useraboutme",
        }
    }
}

/// Slash-command definitions installed globally at startup.
pub fn command_definitions() -> Vec<CreateCommand> {
    let with_user_option = |name: &str, description: &str, option_description: &str| {
        CreateCommand::new(name).description(description).add_option(
            CreateCommandOption::new(CommandOptionType::User, "user", option_description)
                .required(false),
        )
    };

    vec![
        with_user_option("avatar", "Get a user's avatar", "The user to get avatar from"),
        with_user_option("banner", "Get a user's banner", "The user to get banner from"),
        with_user_option(
            "userinfo",
            "Get information about a user",
            "The user to get info about",
        ),
        with_user_option(
            "useraboutme",
            "Get a user's about me section",
            "The user to get about me from",
        ),
    ]
}

/// One reply body: plain text, a card, an attachment, or a mix.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub content: Option<String>,
    pub card: Option<Card>,
    pub attachments: Vec<Attachment>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn card(card: Card) -> Self {
        Self {
            card: Some(card),
            ..Default::default()
        }
    }
}

/// External collaborators a command needs; trait objects so tests can run
/// the full dispatch path with in-memory fakes.
pub struct CommandDeps<'a> {
    pub users: &'a dyn UserDirectory,
    pub members: &'a dyn MemberDirectory,
    pub fetcher: &'a dyn ResourceFetcher,
}

/// Resolve the target and run one command, converting every failure into a
/// user-visible reply. Nothing propagates past this point.
pub async fn dispatch(
    command: BotCommand,
    invocation: &Invocation,
    deps: &CommandDeps<'_>,
) -> Reply {
    tracing::debug!(
        "Dispatching {} ({:?} invocation from {})",
        command.name(),
        invocation.kind,
        invocation.invoker.username
    );

    let target = match resolve_target(invocation, deps.users).await {
        Ok(target) => target,
        Err(Error::UserNotFound(arg)) => {
            tracing::debug!("Target '{}' not found for {}", arg, command.name());
            return Reply::text(MSG_USER_NOT_FOUND);
        }
        Err(e) => {
            tracing::warn!("Resolution failed for {}: {}", command.name(), e);
            return Reply::text(MSG_GENERIC_ERROR);
        }
    };

    match run_command(command, &target, invocation.guild_id, deps).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!("Command {} failed: {}", command.name(), e);
            failure_reply(command, &e)
        }
    }
}

async fn run_command(
    command: BotCommand,
    target: &crate::model::UserRef,
    guild_id: Option<u64>,
    deps: &CommandDeps<'_>,
) -> Result<Reply> {
    match command {
        BotCommand::Avatar => {
            let url = target.avatar_url();
            let mut attachment = deps.fetcher.fetch(&url).await?;
            attachment.filename = avatar_filename(target, &url);
            Ok(Reply {
                content: Some(format!("**{}'s Avatar:**", target.tag())),
                card: None,
                attachments: vec![attachment],
            })
        }
        BotCommand::Banner => {
            // Banner is absent from cached partial records; force a full
            // fetch before deciding the user has none.
            let full = deps.users.fetch_full_user(target.id).await?;
            let url = full
                .banner_url()
                .ok_or_else(|| Error::unavailable(format!("user {} has no banner", full.id)))?;
            let mut attachment = deps.fetcher.fetch(&url).await?;
            attachment.filename = banner_filename(&full, &url);
            Ok(Reply {
                content: Some(format!("**{}'s Banner:**", full.tag())),
                card: None,
                attachments: vec![attachment],
            })
        }
        BotCommand::UserInfo => {
            // Membership is best-effort: absence is not an error.
            let membership = match guild_id {
                Some(guild) => deps.members.find_member(guild, target.id).await.ok(),
                None => None,
            };
            Ok(Reply::card(user_info_card(target, membership.as_ref())))
        }
        BotCommand::AboutMe => {
            let full = deps.users.fetch_full_user(target.id).await?;
            Ok(Reply::card(about_me_card(&full)))
        }
    }
}

/// Map a command failure to its fixed user-facing message.
fn failure_reply(command: BotCommand, error: &Error) -> Reply {
    let message = match (command, error) {
        (_, Error::UserNotFound(_)) => MSG_USER_NOT_FOUND,
        (BotCommand::Avatar, _) => MSG_AVATAR_FAILED,
        (BotCommand::Banner, _) => MSG_BANNER_FAILED,
        (BotCommand::AboutMe, _) => MSG_ABOUT_FAILED,
        (BotCommand::UserInfo, _) => MSG_GENERIC_ERROR,
    };
    Reply::text(message)
}
