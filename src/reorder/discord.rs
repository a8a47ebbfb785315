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
use anyhow::Context as _;
use async_trait::async_trait;
use serde::Serialize;
use serenity::all::{Context, GuildId, Role, RoleId};
use serenity::http::{LightMethod, Request, Route};
use tracing::{debug, trace};

use super::{LiveRole, Placement, RoleDirectory};

/// Body entry of `PATCH /guilds/{guild.id}/roles`.
#[derive(Debug, Serialize)]
struct RolePosition {
    id: RoleId,
    position: u16,
}

impl From<Role> for LiveRole {
    fn from(role: Role) -> Self {
        LiveRole {
            id: role.id,
            name: role.name,
            position: role.position,
            permissions: role.permissions,
        }
    }
}

/// [`RoleDirectory`] backed by the gateway context.
pub struct DiscordRoles<'a> {
    ctx: &'a Context,
    guild: Option<GuildId>,
}

impl<'a> DiscordRoles<'a> {
    /// Uses `guild` when configured, otherwise the first server the bot is in.
    pub fn new(ctx: &'a Context, guild: Option<GuildId>) -> Self {
        let guild = guild.or_else(|| ctx.cache.guilds().first().copied());
        Self { ctx, guild }
    }
}

#[async_trait]
impl RoleDirectory for DiscordRoles<'_> {
    fn guild(&self) -> Option<GuildId> {
        self.guild
    }

    async fn bot_roles(&self, guild: GuildId) -> anyhow::Result<Option<Vec<RoleId>>> {
        let bot_id = self.ctx.cache.current_user().id;
        match guild.member(self.ctx, bot_id).await {
            Ok(member) => Ok(Some(member.roles)),
            Err(serenity::Error::Http(e)) if e.status_code().map(|s| s.as_u16()) == Some(404) => {
                debug!("Not a member of {}", guild);
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to fetch own member in {}", guild)),
        }
    }

    async fn fetch_roles(&self, guild: GuildId) -> anyhow::Result<Vec<LiveRole>> {
        trace!("Fetching roles of {}", guild);
        let roles = guild
            .roles(&self.ctx.http)
            .await
            .with_context(|| format!("Failed to fetch roles of {}", guild))?;

        Ok(roles.into_values().map(LiveRole::from).collect())
    }

    async fn apply(&self, guild: GuildId, placements: &[Placement]) -> anyhow::Result<Vec<LiveRole>> {
        let body: Vec<RolePosition> = placements
            .iter()
            .map(|placement| RolePosition {
                id: placement.role.id,
                position: placement.position,
            })
            .collect();
        debug!("Submitting role positions for {}: {:?}", guild, body);

        let request = Request::new(Route::GuildRoles { guild_id: guild }, LightMethod::Patch)
            .body(Some(serde_json::to_vec(&body).context("Failed to encode role positions")?));
        let roles: Vec<Role> = self
            .ctx
            .http
            .fire(request)
            .await
            .with_context(|| format!("Discord rejected the role reorder in {}", guild))?;

        Ok(roles.into_iter().map(LiveRole::from).collect())
    }
}
