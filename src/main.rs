/*
LegacyMarshal: A squad coordination bot for Discord servers.
Copyright (C) 2025 The LegacyMarshal Contributors

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
mod commands;
mod config;
mod greeting;
mod ids;
mod reorder;
mod scheduler;
mod squads;
mod tasks;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context as _;
use chrono_tz::America::New_York;
use serenity::all::{
    Client, Context as SerenityContext, EventHandler, GatewayIntents, Guild, Ready, Role, RoleId,
};
use serenity::async_trait;
use shuttle_runtime::SecretStore;
use tracing::{error, info, trace};

use config::Config;
use reorder::discord::DiscordRoles;
use reorder::{Reconciler, RoleDirectory, RolePolicy};
use scheduler::run_scheduler;
use tasks::get_tasks;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared with every command invocation.
pub struct Data {
    pub prefix: String,
}

struct Bot {
    config: Config,
    reconciler: Arc<Reconciler>,
    scheduler_started: AtomicBool,
}

impl Bot {
    fn new(config: Config) -> Self {
        let policy = RolePolicy::new(ids::ROLE_ORDER.map(RoleId::new));
        Self {
            config,
            reconciler: Arc::new(Reconciler::new(policy)),
            scheduler_started: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn ready(&self, ctx: SerenityContext, ready: Ready) {
        let now = chrono::Utc::now().with_timezone(&New_York);
        info!(
            "Logged in as {} (ID: {}) at {}",
            ready.user.name,
            ready.user.id,
            now.format("%Y-%m-%d %H:%M:%S %Z")
        );

        let roles = DiscordRoles::new(&ctx, self.config.guild_id);
        self.reconciler.run_logged(&roles, false).await;

        // READY fires again after every reconnect.
        if !self.scheduler_started.swap(true, Ordering::SeqCst) {
            let tasks = get_tasks(&self.config, self.reconciler.clone());
            run_scheduler(ctx, tasks).await;
        }
    }

    async fn guild_create(&self, ctx: SerenityContext, guild: Guild, is_new: Option<bool>) {
        if is_new != Some(true) {
            return;
        }

        info!("Joined {} ({})", guild.name, guild.id);
        if let Err(e) = greeting::greet(&ctx, &guild, &self.config.prefix).await {
            error!("Could not greet {}: {:?}", guild.name, e);
        }
    }

    async fn guild_role_update(&self, ctx: SerenityContext, _old: Option<Role>, new: Role) {
        let roles = DiscordRoles::new(&ctx, self.config.guild_id);
        let wanted = self
            .reconciler
            .wants_forced_pass(roles.guild(), new.guild_id, new.id, new.position)
            .await;
        if !wanted {
            trace!("Ignoring update to role {} ({})", new.name, new.id);
            return;
        }

        info!("Tracked role {} was modified, forcing a reorder", new.name);
        self.reconciler.run_logged(&roles, true).await;
    }
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

#[shuttle_runtime::main]
async fn serenity(
    #[shuttle_runtime::Secrets] secrets: SecretStore,
) -> shuttle_serenity::ShuttleSerenity {
    let config = Config::from_lookup(|key| secrets.get(key).or_else(|| std::env::var(key).ok()))?;
    let token = config.token.clone();
    let prefix = config.prefix.clone();

    // Guild events for greetings and role updates, message content for prefix commands
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::get_commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: None,
                stripped_dynamic_prefix: Some(commands::strip_prefix),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |_ctx, _ready, _framework| Box::pin(async move { Ok(Data { prefix }) }))
        .build();

    let client = Client::builder(&token, intents)
        .framework(framework)
        .event_handler(Bot::new(config))
        .await
        .context("Could not create client")?;

    Ok(client.into())
}
