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
//! Keeps the tracked roles stacked in policy order beneath the bot's own role.
//!
//! A pass re-fetches the live roles, compares them against the
//! [`PositionCache`] of what the bot last wrote and, when something moved (or
//! the pass is forced), submits every target position in a single bulk
//! request.
pub mod discord;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serenity::all::{GuildId, Permissions, RoleId};
use tokio::sync::Mutex;
use tracing::{debug, error, info, trace, warn};

/// A role as the server currently has it.
#[derive(Clone, Debug, PartialEq)]
pub struct LiveRole {
    pub id: RoleId,
    pub name: String,
    pub position: u16,
    pub permissions: Permissions,
}

/// Role IDs in the order they should appear, topmost first.
#[derive(Clone, Debug)]
pub struct RolePolicy(Vec<RoleId>);

impl RolePolicy {
    pub fn new(ids: impl IntoIterator<Item = RoleId>) -> Self {
        Self(ids.into_iter().collect())
    }

    pub fn contains(&self, id: RoleId) -> bool {
        self.0.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = RoleId> + '_ {
        self.0.iter().copied()
    }

    /// Positions of every tracked role present in `roles`.
    pub fn current_positions(&self, roles: &[LiveRole]) -> HashMap<RoleId, u16> {
        roles
            .iter()
            .filter(|role| self.contains(role.id))
            .map(|role| (role.id, role.position))
            .collect()
    }
}

/// Positions last written by the bot. Never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionCache {
    positions: HashMap<RoleId, u16>,
}

impl PositionCache {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, id: RoleId) -> Option<u16> {
        self.positions.get(&id).copied()
    }

    pub fn replace(&mut self, positions: HashMap<RoleId, u16>) {
        self.positions = positions;
    }

    /// Whether `current` differs from what was last written.
    pub fn is_stale(&self, current: &HashMap<RoleId, u16>) -> bool {
        self.is_empty() || self.positions != *current
    }
}

/// One entry of the bulk update.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub role: LiveRole,
    pub position: u16,
}

/// Why a pass did not write anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Skip {
    NoGuild,
    NotMember,
    MissingPermission,
    HierarchyTooLow { bot_top: u16, needed: usize },
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::NoGuild => write!(f, "no server available"),
            Skip::NotMember => write!(f, "bot is not a member of the server"),
            Skip::MissingPermission => write!(f, "bot lacks the Manage Roles permission"),
            Skip::HierarchyTooLow { bot_top, needed } => write!(
                f,
                "bot's top role sits at position {} but {} roles must fit beneath it",
                bot_top, needed
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied { moved: usize },
    UpToDate,
    NothingTracked,
    Skipped(Skip),
}

/// The bot's place in a server's role hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Standing {
    pub top_position: u16,
    pub can_manage_roles: bool,
}

impl Standing {
    /// Works out the bot's standing from its role IDs. The `@everyone` role
    /// shares its ID with the guild and applies to every member.
    pub fn new(guild: GuildId, member_roles: &[RoleId], roles: &[LiveRole]) -> Self {
        let everyone = RoleId::new(guild.get());
        let held = roles
            .iter()
            .filter(|role| role.id == everyone || member_roles.contains(&role.id));

        let mut standing = Standing {
            top_position: 0,
            can_manage_roles: false,
        };
        for role in held {
            standing.top_position = standing.top_position.max(role.position);
            standing.can_manage_roles |= role
                .permissions
                .intersects(Permissions::MANAGE_ROLES | Permissions::ADMINISTRATOR);
        }
        standing
    }
}

/// Assigns positions top-down from just below `bot_top`, skipping policy
/// entries the server does not have. Nothing is placed if the last role
/// would land below position 1.
pub fn plan(policy: &RolePolicy, roles: &[LiveRole], bot_top: u16) -> Result<Vec<Placement>, Skip> {
    let by_id: HashMap<RoleId, &LiveRole> = roles.iter().map(|role| (role.id, role)).collect();
    let present: Vec<&LiveRole> = policy.iter().filter_map(|id| by_id.get(&id).copied()).collect();

    if i32::from(bot_top) - (present.len() as i32) < 1 {
        return Err(Skip::HierarchyTooLow {
            bot_top,
            needed: present.len(),
        });
    }

    Ok(present
        .into_iter()
        .zip((1..bot_top).rev())
        .map(|(role, position)| Placement {
            role: role.clone(),
            position,
        })
        .collect())
}

/// Access to a server's roles. Implemented over Discord in [`discord`].
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// The server to reorder, if any.
    fn guild(&self) -> Option<GuildId>;

    /// The bot's role IDs in `guild`, or `None` if it is not a member.
    async fn bot_roles(&self, guild: GuildId) -> anyhow::Result<Option<Vec<RoleId>>>;

    /// Fetches the live role list, bypassing any local cache.
    async fn fetch_roles(&self, guild: GuildId) -> anyhow::Result<Vec<LiveRole>>;

    /// Submits every placement as one request and returns the roles as the
    /// server reports them afterwards.
    async fn apply(&self, guild: GuildId, placements: &[Placement]) -> anyhow::Result<Vec<LiveRole>>;
}

/// Runs one reconciliation pass. `cache` is only modified after a successful
/// write.
pub async fn reconcile(
    directory: &dyn RoleDirectory,
    policy: &RolePolicy,
    cache: &mut PositionCache,
    force: bool,
) -> anyhow::Result<Outcome> {
    let Some(guild) = directory.guild() else {
        return Ok(Outcome::Skipped(Skip::NoGuild));
    };
    trace!("Reconciling roles in {} (force: {})", guild, force);

    let Some(member_roles) = directory.bot_roles(guild).await? else {
        return Ok(Outcome::Skipped(Skip::NotMember));
    };

    let roles = directory.fetch_roles(guild).await?;
    let standing = Standing::new(guild, &member_roles, &roles);
    debug!("Standing in {}: {:?}", guild, standing);
    if !standing.can_manage_roles {
        return Ok(Outcome::Skipped(Skip::MissingPermission));
    }

    let current = policy.current_positions(&roles);
    if !force && !cache.is_stale(&current) {
        return Ok(Outcome::UpToDate);
    }
    if current.is_empty() {
        return Ok(Outcome::NothingTracked);
    }

    let placements = match plan(policy, &roles, standing.top_position) {
        Ok(placements) => placements,
        Err(skip) => return Ok(Outcome::Skipped(skip)),
    };
    for placement in &placements {
        debug!(
            "{} ({}): {} -> {}",
            placement.role.name, placement.role.id, placement.role.position, placement.position
        );
    }

    let updated = directory.apply(guild, &placements).await?;
    cache.replace(policy.current_positions(&updated));

    Ok(Outcome::Applied {
        moved: placements.len(),
    })
}

pub fn log_outcome(outcome: Outcome) {
    match outcome {
        Outcome::Applied { moved } => info!("Reordered {} roles", moved),
        Outcome::UpToDate => debug!("Role order is up to date"),
        Outcome::NothingTracked => debug!("None of the tracked roles exist"),
        Outcome::Skipped(skip) => warn!("Skipping role reorder: {}", skip),
    }
}

/// Owns the [`PositionCache`] for the lifetime of the process and lets only
/// one pass run at a time; triggers that arrive mid-pass wait their turn.
pub struct Reconciler {
    policy: RolePolicy,
    cache: Mutex<PositionCache>,
}

impl Reconciler {
    pub fn new(policy: RolePolicy) -> Self {
        Self {
            policy,
            cache: Mutex::new(PositionCache::default()),
        }
    }

    pub fn tracks(&self, id: RoleId) -> bool {
        self.policy.contains(id)
    }

    /// Position last written for `id`. Waits for a running pass to finish.
    pub async fn recorded_position(&self, id: RoleId) -> Option<u16> {
        self.cache.lock().await.get(id)
    }

    /// Whether an update to role `id` in `guild`, now at `position`, should
    /// force a pass over `target`.
    ///
    /// Updates from any other server are ignored. An update that lands where
    /// the bot last put the role is the echo of its own write and is ignored
    /// too, which also drops changes that leave the position alone (name,
    /// colour, permissions). Those never affect the order.
    pub async fn wants_forced_pass(
        &self,
        target: Option<GuildId>,
        guild: GuildId,
        id: RoleId,
        position: u16,
    ) -> bool {
        target == Some(guild)
            && self.tracks(id)
            && self.recorded_position(id).await != Some(position)
    }

    pub async fn run(&self, directory: &dyn RoleDirectory, force: bool) -> anyhow::Result<Outcome> {
        let mut cache = self.cache.lock().await;
        reconcile(directory, &self.policy, &mut cache, force).await
    }

    /// Runs a pass and logs how it went. Never fails: the next trigger retries.
    pub async fn run_logged(&self, directory: &dyn RoleDirectory, force: bool) {
        match self.run(directory, force).await {
            Ok(outcome) => log_outcome(outcome),
            Err(e) => error!("Role reorder failed: {:?}", e),
        }
    }
}
