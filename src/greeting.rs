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
use serenity::all::{
    ChannelId, ChannelType, Colour, Context, CreateEmbed, CreateMessage, Guild, Permissions,
};
use tracing::{debug, info, warn};

use crate::squads::SQUAD_GROUPS;

const TITLE: &str = "LegacyMarshal Deployed";

/// A text channel the greeting could go to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelCandidate {
    pub id: ChannelId,
    pub position: u16,
    pub can_send: bool,
}

/// Text and announcement channels both count, like the sidebar's text list.
pub fn is_text_channel(kind: ChannelType) -> bool {
    matches!(kind, ChannelType::Text | ChannelType::News)
}

/// Topmost channel, in sidebar order, that the bot may post in.
pub fn pick_channel(mut candidates: Vec<ChannelCandidate>) -> Option<ChannelId> {
    candidates.sort_by_key(|c| (c.position, c.id));
    candidates.into_iter().find(|c| c.can_send).map(|c| c.id)
}

pub fn greeting_text(prefix: &str) -> String {
    let usages: Vec<String> = SQUAD_GROUPS
        .iter()
        .map(|group| format!("`{}{}`", group.invoked_with(prefix), group.command))
        .collect();
    let commands = match usages.split_last() {
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{}, or {}", rest.join(", "), last),
        None => String::new(),
    };
    let example = SQUAD_GROUPS
        .first()
        .map(|group| format!(" (e.g., `{}{} 3`)", group.invoked_with(prefix), group.command))
        .unwrap_or_default();

    format!(
        "Greetings! I’m LegacyMarshal, your server’s squad coordinator. Use {} to rally \
         your squads! Add a number to specify players needed{}.",
        commands, example
    )
}

pub fn greeting_embed(prefix: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(TITLE)
        .description(greeting_text(prefix))
        .colour(Colour::DARK_GOLD)
}

/// Introduces the bot in the first channel it can write to. Called once,
/// when the bot is added to `guild`.
pub async fn greet(ctx: &Context, guild: &Guild, prefix: &str) -> anyhow::Result<()> {
    let bot_id = ctx.cache.current_user().id;
    let me = guild
        .member(ctx, bot_id)
        .await
        .with_context(|| format!("Failed to fetch own member in {}", guild.id))?;

    let candidates: Vec<ChannelCandidate> = guild
        .channels
        .values()
        .filter(|channel| is_text_channel(channel.kind))
        .map(|channel| ChannelCandidate {
            id: channel.id,
            position: channel.position,
            can_send: guild
                .user_permissions_in(channel, &me)
                .contains(Permissions::SEND_MESSAGES),
        })
        .collect();
    debug!("Greeting candidates in {}: {:?}", guild.id, candidates);

    let Some(channel_id) = pick_channel(candidates) else {
        warn!("No channel in {} accepts messages from the bot", guild.name);
        return Ok(());
    };

    channel_id
        .send_message(&ctx.http, CreateMessage::new().embed(greeting_embed(prefix)))
        .await
        .with_context(|| format!("Failed to send greeting in channel {}", channel_id))?;
    info!("Greeted {} in {}", guild.name, channel_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u64, position: u16, can_send: bool) -> ChannelCandidate {
        ChannelCandidate {
            id: ChannelId::new(id),
            position,
            can_send,
        }
    }

    #[test]
    fn picks_topmost_writable_channel() {
        let picked = pick_channel(vec![
            candidate(30, 2, true),
            candidate(10, 0, false),
            candidate(20, 1, true),
        ]);
        assert_eq!(picked, Some(ChannelId::new(20)));
    }

    #[test]
    fn announcement_channels_can_be_greeted() {
        assert!(is_text_channel(ChannelType::Text));
        assert!(is_text_channel(ChannelType::News));
        assert!(!is_text_channel(ChannelType::Voice));
        assert!(!is_text_channel(ChannelType::Category));
    }

    #[test]
    fn ties_break_on_id() {
        let picked = pick_channel(vec![candidate(8, 0, true), candidate(5, 0, true)]);
        assert_eq!(picked, Some(ChannelId::new(5)));
    }

    #[test]
    fn read_only_server_gets_no_greeting() {
        assert_eq!(pick_channel(vec![candidate(1, 0, false)]), None);
        assert_eq!(pick_channel(vec![]), None);
    }

    #[test]
    fn text_lists_every_command_with_its_prefix() {
        let text = greeting_text("!");
        assert!(text.contains(
            "Use `!ksquadup`, `!!sqclassic`, `!swtorsquadup`, or `!vsquadup` to rally your squads!"
        ));
        assert!(text.ends_with("players needed (e.g., `!ksquadup 3`)."));
    }
}
