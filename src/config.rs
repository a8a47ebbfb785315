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
use anyhow::{anyhow, Context as _};
use serenity::all::GuildId;
use tokio::time::Duration;

const DEFAULT_PREFIX: &str = "!";
const DEFAULT_REORDER_INTERVAL_HOURS: u64 = 12;

/// Settings read from `Secrets.toml`, falling back to the environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub token: String,
    pub prefix: String,
    /// Server whose roles get reordered. Defaults to the first server the bot is in.
    pub guild_id: Option<GuildId>,
    pub reorder_interval: Duration,
}

impl Config {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let token = lookup("DISCORD_TOKEN").context("'DISCORD_TOKEN' was not found")?;

        let prefix = lookup("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        if prefix.is_empty() {
            return Err(anyhow!("'COMMAND_PREFIX' must not be empty"));
        }

        let guild_id = lookup("GUILD_ID")
            .map(|id| id.trim().parse::<u64>())
            .transpose()
            .context("'GUILD_ID' must be a numeric ID")?
            .filter(|&id| id != 0)
            .map(GuildId::new);

        let hours = lookup("REORDER_INTERVAL_HOURS")
            .map(|hours| hours.trim().parse::<u64>())
            .transpose()
            .context("'REORDER_INTERVAL_HOURS' must be a whole number")?
            .unwrap_or(DEFAULT_REORDER_INTERVAL_HOURS);
        if hours == 0 {
            return Err(anyhow!("'REORDER_INTERVAL_HOURS' must be positive"));
        }

        Ok(Self {
            token,
            prefix,
            guild_id,
            reorder_interval: Duration::from_secs(hours * 60 * 60),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn defaults_apply_with_only_a_token() {
        let config = config(&[("DISCORD_TOKEN", "abc")]).unwrap();

        assert_eq!(config.token, "abc");
        assert_eq!(config.prefix, "!");
        assert_eq!(config.guild_id, None);
        assert_eq!(config.reorder_interval, Duration::from_secs(12 * 60 * 60));
    }

    #[test]
    fn missing_token_is_fatal() {
        let err = config(&[("COMMAND_PREFIX", "?")]).unwrap_err();
        assert!(err.to_string().contains("DISCORD_TOKEN"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config(&[
            ("DISCORD_TOKEN", "abc"),
            ("COMMAND_PREFIX", "?"),
            ("GUILD_ID", " 1364262000000000000 "),
            ("REORDER_INTERVAL_HOURS", "6"),
        ])
        .unwrap();

        assert_eq!(config.prefix, "?");
        assert_eq!(config.guild_id, Some(GuildId::new(1364262000000000000)));
        assert_eq!(config.reorder_interval, Duration::from_secs(6 * 60 * 60));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("REORDER_INTERVAL_HOURS", "0")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("REORDER_INTERVAL_HOURS", "soon")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("GUILD_ID", "home")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("COMMAND_PREFIX", "")]).is_err());
    }
}
