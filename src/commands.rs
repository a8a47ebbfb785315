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
use std::future::Future;
use std::pin::Pin;

use serenity::all::{Context as SerenityContext, CreateAllowedMentions, Message};
use tracing::debug;

use crate::squads::{find_group, SquadCall, SQUAD_GROUPS};
use crate::{Context, Data, Error};

type PrefixFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<(&'a str, &'a str)>, Error>> + Send + 'a>>;

/// Rallies the interest group the command was registered for.
#[poise::command(prefix_command)]
async fn squadup(
    ctx: Context<'_>,
    #[description = "How many more players the squad needs"] players: Option<i64>,
) -> Result<(), Error> {
    let name = &ctx.command().name;
    let group = find_group(name).ok_or_else(|| format!("No squad group is registered as {}", name))?;

    let call = SquadCall::new(group, players);
    debug!("Squad call for {} in {}: {:?}", group.command, ctx.channel_id(), call);

    let reply = poise::CreateReply::default()
        .content(call.content.clone())
        .embed(call.embed())
        .allowed_mentions(CreateAllowedMentions::new().roles(group.role_ids()));
    ctx.send(reply).await?;

    Ok(())
}

/// Every group in [`SQUAD_GROUPS`] gets its own copy of [`squadup`], renamed
/// after the group, so that adding a group never needs a new handler.
pub fn get_commands() -> Vec<poise::Command<Data, Error>> {
    SQUAD_GROUPS
        .iter()
        .map(|group| {
            let mut command = squadup();
            command.name = group.command.to_string();
            command.qualified_name = group.command.to_string();
            command.identifying_name = group.command.to_string();
            command.aliases = group.aliases.iter().map(|alias| alias.to_string()).collect();
            command.description = Some(format!("Post a {}", group.title));
            command
        })
        .collect()
}

/// Splits a message into `(prefix, rest)`.
///
/// A group with its own prefix only claims messages that mention the group's
/// command, everything else falls back to `default_prefix`.
pub fn resolve_prefix<'a>(content: &'a str, default_prefix: &'a str) -> Option<(&'a str, &'a str)> {
    let lowered = content.to_lowercase();
    for group in SQUAD_GROUPS {
        let Some(prefix) = group.prefix else {
            continue;
        };
        if let Some(rest) = content.strip_prefix(prefix) {
            if lowered.contains(group.command) {
                return Some((prefix, rest));
            }
        }
    }

    content
        .strip_prefix(default_prefix)
        .map(|rest| (default_prefix, rest))
}

pub fn strip_prefix<'a>(
    _ctx: &'a SerenityContext,
    msg: &'a Message,
    data: &'a Data,
) -> PrefixFuture<'a> {
    Box::pin(async move { Ok(resolve_prefix(&msg.content, &data.prefix)) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prefix_resolves_squad_commands() {
        assert_eq!(resolve_prefix("!ksquadup 3", "!"), Some(("!", "ksquadup 3")));
        assert_eq!(resolve_prefix("!sqclassic", "!"), Some(("!", "sqclassic")));
    }

    #[test]
    fn double_bang_is_reserved_for_classic() {
        assert_eq!(resolve_prefix("!!sqclassic 2", "!"), Some(("!!", "sqclassic 2")));
        assert_eq!(resolve_prefix("!!SQClassic", "!"), Some(("!!", "SQClassic")));
        // Falls back to "!" and leaves a name no command answers to.
        assert_eq!(resolve_prefix("!!ksquadup", "!"), Some(("!", "!ksquadup")));
    }

    #[test]
    fn custom_prefix_is_honoured() {
        assert_eq!(resolve_prefix("?vsquadup", "?"), Some(("?", "vsquadup")));
        assert_eq!(resolve_prefix("!vsquadup", "?"), None);
    }

    #[test]
    fn plain_chatter_has_no_prefix() {
        assert_eq!(resolve_prefix("anyone up for kyber?", "!"), None);
    }

    #[test]
    fn one_command_per_group() {
        let commands = get_commands();
        assert_eq!(commands.len(), SQUAD_GROUPS.len());

        let classic = commands.iter().find(|c| c.name == "sqclassic").unwrap();
        assert_eq!(classic.aliases, vec!["classicsquad-up".to_string()]);
        assert!(classic.prefix_action.is_some());
    }
}
