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
use serenity::all::{Colour, CreateEmbed, RoleId, Timestamp};

use crate::ids::{
    CLASSIC_ROLE_ID, CLASSIC_VETERAN_ROLE_ID, KYBER_ROLE_ID, SWTOR_ROLE_ID, VANILLA_ROLE_ID,
};

const TROOPER_LEAD: &str = "Hey.. This sector isn’t going to take itself.";
const TROOPER_CALL: &str = "Form up. We’ve got troopers in need of assistance.";

/// An interest group that can be rallied with a squad up command.
#[derive(Debug)]
pub struct SquadGroup {
    pub command: &'static str,
    pub aliases: &'static [&'static str],
    pub title: &'static str,
    /// Narrative before the role mentions.
    pub lead: &'static str,
    /// Narrative after the role mentions.
    pub call: &'static str,
    pub roles: &'static [u64],
    pub colour: Colour,
    /// Replaces the configured prefix for this command when the message
    /// starts with it.
    pub prefix: Option<&'static str>,
}

pub const SQUAD_GROUPS: &[SquadGroup] = &[
    SquadGroup {
        command: "ksquadup",
        aliases: &["kybersquad-up"],
        title: "KYBER Squad Up!",
        lead: TROOPER_LEAD,
        call: TROOPER_CALL,
        roles: &[KYBER_ROLE_ID],
        colour: Colour::DARK_GREEN,
        prefix: None,
    },
    SquadGroup {
        command: "sqclassic",
        aliases: &["classicsquad-up"],
        title: "SW Battlefront Classic Squad Up!",
        lead: TROOPER_LEAD,
        call: TROOPER_CALL,
        roles: &[CLASSIC_ROLE_ID, CLASSIC_VETERAN_ROLE_ID],
        colour: Colour::DARK_GOLD,
        prefix: Some("!!"),
    },
    SquadGroup {
        command: "swtorsquadup",
        aliases: &["swtorsquad-up"],
        title: "SWTOR Squad Up!",
        lead: "Hey.. Contract is active.",
        call: "Crew is forming up. Lock and load, mercs.",
        roles: &[SWTOR_ROLE_ID],
        colour: Colour::DARK_BLUE,
        prefix: None,
    },
    SquadGroup {
        command: "vsquadup",
        aliases: &["vanillasquad-up"],
        title: "Vanilla Squad Up!",
        lead: TROOPER_LEAD,
        call: TROOPER_CALL,
        roles: &[VANILLA_ROLE_ID],
        colour: Colour::GOLD,
        prefix: None,
    },
];

/// Looks a group up by its command name or one of its aliases.
pub fn find_group(name: &str) -> Option<&'static SquadGroup> {
    SQUAD_GROUPS
        .iter()
        .find(|group| group.command == name || group.aliases.contains(&name))
}

impl SquadGroup {
    pub fn role_ids(&self) -> impl Iterator<Item = RoleId> + '_ {
        self.roles.iter().map(|&id| RoleId::new(id))
    }

    pub fn mentions(&self) -> String {
        self.role_ids()
            .map(|id| format!("<@&{}>", id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The prefix a user types for this command.
    pub fn invoked_with<'a>(&'a self, default_prefix: &'a str) -> &'a str {
        self.prefix.unwrap_or(default_prefix)
    }
}

/// A rendered squad up announcement, independent of how it gets sent.
#[derive(Debug, Clone, PartialEq)]
pub struct SquadCall {
    pub content: String,
    pub title: String,
    pub description: String,
    pub colour: Colour,
}

impl SquadCall {
    pub fn new(group: &SquadGroup, players: Option<i64>) -> Self {
        let mentions = group.mentions();
        let mut description = format!("{} {} {}", group.lead, mentions, group.call);
        if let Some(players) = players.filter(|&n| n != 0) {
            description.push_str(&format!("\n**Players Needed:** {}", players));
        }

        Self {
            content: mentions,
            title: group.title.to_string(),
            description,
            colour: group.colour,
        }
    }

    pub fn embed(&self) -> CreateEmbed {
        CreateEmbed::new()
            .title(&self.title)
            .description(&self.description)
            .colour(self.colour)
            .timestamp(Timestamp::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn players_line_is_appended_last() {
        let group = find_group("ksquadup").unwrap();
        let call = SquadCall::new(group, Some(5));

        assert!(call.description.ends_with("\n**Players Needed:** 5"));
        assert_eq!(call.title, "KYBER Squad Up!");
        assert_eq!(call.colour, Colour::DARK_GREEN);
    }

    #[test]
    fn players_line_is_absent_without_argument() {
        let group = find_group("vsquadup").unwrap();
        let call = SquadCall::new(group, None);

        assert!(!call.description.contains("Players Needed"));
        assert_eq!(
            call.description,
            "Hey.. This sector isn’t going to take itself. <@&1364262718487531581> \
             Form up. We’ve got troopers in need of assistance."
        );
    }

    #[test]
    fn zero_players_is_treated_as_unspecified() {
        let group = find_group("swtorsquadup").unwrap();
        assert!(!SquadCall::new(group, Some(0)).description.contains("Players"));
    }

    #[test]
    fn classic_mentions_both_roles() {
        let group = find_group("classicsquad-up").unwrap();
        let call = SquadCall::new(group, None);

        assert_eq!(group.command, "sqclassic");
        assert_eq!(call.content, "<@&1371897792695369778> <@&1371895939786080297>");
        assert!(call.description.contains(&call.content));
    }

    #[test]
    fn every_group_has_unique_names() {
        let mut names: Vec<&str> = SQUAD_GROUPS
            .iter()
            .flat_map(|g| std::iter::once(g.command).chain(g.aliases.iter().copied()))
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn unknown_group_is_none() {
        assert!(find_group("squadup").is_none());
    }
}
