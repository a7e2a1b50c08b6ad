//! Gateway event handler: slash commands, prefix commands, link rewriting.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serenity::async_trait;
use serenity::builder::{
    CreateAttachment, CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage,
    EditInteractionResponse,
};
use serenity::client::{Context, EventHandler};
use serenity::gateway::{ConnectionStage, ShardStageUpdateEvent};
use serenity::model::application::{Command, CommandInteraction, Interaction, ResolvedValue};
use serenity::model::channel::Message;
use serenity::model::event::ResumedEvent;
use serenity::model::gateway::Ready;

use crate::config::Settings;
use crate::fetch::HttpFetcher;
use crate::model::{Invocation, InvocationKind};
use crate::web::AppState;

use super::commands::{command_definitions, dispatch, BotCommand, CommandDeps, Reply};
use super::commands::MSG_GENERIC_ERROR;
use super::directory::{user_ref_from, DiscordDirectory, ProfileApi};
use super::links::{rewrite_links, RewriteOutcome, MSG_LINKS_FAILED, MSG_LINKS_HEADER};
use super::presence::{descriptor_at, run_presence_rotator, startup_status, to_activity};

/// How long to wait after a gateway resume before refreshing the presence.
const RESUME_STATUS_DELAY: Duration = Duration::from_secs(5);

pub struct Handler {
    settings: Settings,
    health: AppState,
    fetcher: HttpFetcher,
    profile: ProfileApi,
    rotator_started: AtomicBool,
    // Index of the status last applied by the rotator; the rotator writes,
    // the resume hook reads.
    last_status: Arc<AtomicUsize>,
}

impl Handler {
    pub fn new(settings: Settings, health: AppState, profile: ProfileApi) -> Self {
        Self {
            settings,
            health,
            fetcher: HttpFetcher::new(),
            profile,
            rotator_started: AtomicBool::new(false),
            last_status: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn directory(&self, ctx: &Context) -> DiscordDirectory {
        DiscordDirectory::new(ctx.http.clone(), self.profile.clone())
    }

    async fn handle_slash_command(&self, ctx: Context, command: CommandInteraction) {
        let Some(bot_command) = BotCommand::from_name(&command.data.name) else {
            return;
        };

        // The user option arrives pre-resolved by the platform.
        let explicit_target = command.data.options().into_iter().find_map(|opt| match opt.value {
            ResolvedValue::User(user, _) => Some(user_ref_from(user)),
            _ => None,
        });

        let invocation = Invocation {
            kind: InvocationKind::Structured,
            explicit_target,
            mentions: Vec::new(),
            args: Vec::new(),
            invoker: user_ref_from(&command.user),
            guild_id: command.guild_id.map(|g| g.get()),
        };

        // Acknowledge first: the external fetches may take a while.
        if let Err(e) = command.defer(&ctx.http).await {
            tracing::error!("Failed to defer {}: {}", command.data.name, e);
            let response = CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(MSG_GENERIC_ERROR)
                    .ephemeral(true),
            );
            if let Err(e) = command.create_response(&ctx.http, response).await {
                tracing::error!("Failed to send error response: {}", e);
            }
            return;
        }

        let directory = self.directory(&ctx);
        let deps = CommandDeps {
            users: &directory,
            members: &directory,
            fetcher: &self.fetcher,
        };
        let reply = dispatch(bot_command, &invocation, &deps).await;

        let mut edit = EditInteractionResponse::new();
        if let Some(content) = reply.content {
            edit = edit.content(content);
        }
        if let Some(card) = reply.card {
            edit = edit.embed(card.into_embed());
        }
        for attachment in reply.attachments {
            edit = edit.new_attachment(CreateAttachment::bytes(attachment.bytes, attachment.filename));
        }

        if let Err(e) = command.edit_response(&ctx.http, edit).await {
            tracing::error!("Failed to edit response for {}: {}", command.data.name, e);
        }
    }

    async fn handle_prefix_command(&self, ctx: &Context, msg: &Message) {
        let prefix = self.settings.discord.prefix.as_str();
        let Some(rest) = msg.content.strip_prefix(prefix) else {
            return;
        };

        let mut parts = rest.trim().split_whitespace();
        let Some(name) = parts.next() else {
            return;
        };
        let Some(bot_command) = BotCommand::from_name(&name.to_lowercase()) else {
            return;
        };
        let args: Vec<String> = parts.map(str::to_string).collect();

        let invocation = Invocation {
            kind: InvocationKind::TextPrefixed,
            explicit_target: None,
            mentions: msg.mentions.iter().map(user_ref_from).collect(),
            args,
            invoker: user_ref_from(&msg.author),
            guild_id: msg.guild_id.map(|g| g.get()),
        };

        let directory = self.directory(ctx);
        let deps = CommandDeps {
            users: &directory,
            members: &directory,
            fetcher: &self.fetcher,
        };
        let reply = dispatch(bot_command, &invocation, &deps).await;
        send_reply(ctx, msg, reply).await;
    }

    async fn handle_file_links(&self, ctx: &Context, msg: &Message) {
        match rewrite_links(&msg.content, &self.fetcher).await {
            RewriteOutcome::NotApplicable => {}
            RewriteOutcome::Bundle(attachments) => {
                let files: Vec<CreateAttachment> = attachments
                    .into_iter()
                    .map(|a| CreateAttachment::bytes(a.bytes, a.filename))
                    .collect();
                let builder = CreateMessage::new()
                    .content(MSG_LINKS_HEADER)
                    .reference_message(msg)
                    .add_files(files);
                if let Err(e) = msg.channel_id.send_message(&ctx.http, builder).await {
                    tracing::error!("Failed to send converted file links: {}", e);
                }
            }
            RewriteOutcome::AllFailed => {
                if let Err(e) = msg.reply(&ctx.http, MSG_LINKS_FAILED).await {
                    tracing::error!("Failed to send link failure reply: {}", e);
                }
            }
        }
    }
}

async fn send_reply(ctx: &Context, msg: &Message, reply: Reply) {
    let mut builder = CreateMessage::new().reference_message(msg);
    if let Some(content) = reply.content {
        builder = builder.content(content);
    }
    if let Some(card) = reply.card {
        builder = builder.embed(card.into_embed());
    }
    let files: Vec<CreateAttachment> = reply
        .attachments
        .into_iter()
        .map(|a| CreateAttachment::bytes(a.bytes, a.filename))
        .collect();
    if !files.is_empty() {
        builder = builder.add_files(files);
    }

    if let Err(e) = msg.channel_id.send_message(&ctx.http, builder).await {
        tracing::error!("Failed to send reply: {}", e);
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!("Bot is ready! Logged in as {}", ready.user.name);
        tracing::info!("Bot ID: {}", ready.user.id);
        tracing::info!("Serving {} servers", ready.guilds.len());

        self.health.set_bot_username(ready.user.name.clone()).await;

        ctx.set_activity(Some(to_activity(startup_status())));

        // Registration errors are logged, not fatal.
        tracing::info!("Registering slash commands...");
        match Command::set_global_commands(&ctx.http, command_definitions()).await {
            Ok(commands) => tracing::info!("Registered {} slash commands", commands.len()),
            Err(e) => tracing::error!("Error registering slash commands: {}", e),
        }

        // Ready fires again on reconnect; only one rotator may run.
        if !self.rotator_started.swap(true, Ordering::SeqCst) {
            let rotator_ctx = ctx.clone();
            let initial = Duration::from_secs(self.settings.discord.status_initial_delay_secs);
            let period = Duration::from_secs(self.settings.discord.status_interval_secs);
            tokio::spawn(run_presence_rotator(
                rotator_ctx,
                initial,
                period,
                self.last_status.clone(),
            ));
        }
    }

    async fn resume(&self, ctx: Context, _resumed: ResumedEvent) {
        tracing::warn!("Gateway connection resumed");
        let last_status = self.last_status.clone();
        tokio::spawn(async move {
            tokio::time::sleep(RESUME_STATUS_DELAY).await;
            let descriptor = descriptor_at(last_status.load(Ordering::Relaxed));
            tracing::info!(
                "Refreshing status after resume: {:?} {}",
                descriptor.kind,
                descriptor.text
            );
            ctx.set_activity(Some(to_activity(descriptor)));
        });
    }

    async fn shard_stage_update(&self, _ctx: Context, event: ShardStageUpdateEvent) {
        if matches!(event.new, ConnectionStage::Disconnected) {
            tracing::warn!("Shard {} disconnected from the gateway", event.shard_id);
        } else {
            tracing::debug!(
                "Shard {} stage: {} -> {}",
                event.shard_id,
                event.old,
                event.new
            );
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.handle_slash_command(ctx, command).await;
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        // Both checks run independently against every inbound message.
        self.handle_file_links(&ctx, &msg).await;
        self.handle_prefix_command(&ctx, &msg).await;
    }
}
