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
use std::sync::Arc;

use serenity::all::{Context, GuildId};
use serenity::async_trait;
use tokio::time::Duration;

use super::Task;
use crate::reorder::discord::DiscordRoles;
use crate::reorder::{log_outcome, Reconciler, RoleDirectory};

/// Re-checks the role order on a fixed interval.
pub struct RoleReorder {
    reconciler: Arc<Reconciler>,
    guild: Option<GuildId>,
    every: Duration,
}

impl RoleReorder {
    pub fn new(reconciler: Arc<Reconciler>, guild: Option<GuildId>, every: Duration) -> Self {
        Self {
            reconciler,
            guild,
            every,
        }
    }

    /// One non-forced pass. Failures go back to the scheduler, which logs them.
    async fn reorder(&self, directory: &dyn RoleDirectory) -> anyhow::Result<()> {
        let outcome = self.reconciler.run(directory, false).await?;
        log_outcome(outcome);
        Ok(())
    }
}

#[async_trait]
impl Task for RoleReorder {
    fn name(&self) -> &str {
        "Role Reorder"
    }

    fn run_in(&self) -> Duration {
        self.every
    }

    async fn run(&self, ctx: Context) -> anyhow::Result<()> {
        let roles = DiscordRoles::new(&ctx, self.guild);
        self.reorder(&roles).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serenity::all::RoleId;

    use crate::reorder::{LiveRole, Placement, RolePolicy};

    /// A server whose API is down.
    struct Unreachable;

    #[async_trait]
    impl RoleDirectory for Unreachable {
        fn guild(&self) -> Option<GuildId> {
            Some(GuildId::new(100))
        }

        async fn bot_roles(&self, _guild: GuildId) -> anyhow::Result<Option<Vec<RoleId>>> {
            anyhow::bail!("503 Service Unavailable")
        }

        async fn fetch_roles(&self, _guild: GuildId) -> anyhow::Result<Vec<LiveRole>> {
            anyhow::bail!("503 Service Unavailable")
        }

        async fn apply(&self, _guild: GuildId, _placements: &[Placement]) -> anyhow::Result<Vec<LiveRole>> {
            anyhow::bail!("503 Service Unavailable")
        }
    }

    #[test]
    fn runs_on_the_configured_interval() {
        let reconciler = Arc::new(Reconciler::new(RolePolicy::new([RoleId::new(1)])));
        let task = RoleReorder::new(reconciler, None, Duration::from_secs(12 * 60 * 60));

        assert_eq!(task.name(), "Role Reorder");
        assert_eq!(task.run_in(), Duration::from_secs(43_200));
    }

    #[tokio::test]
    async fn platform_errors_reach_the_scheduler() {
        let reconciler = Arc::new(Reconciler::new(RolePolicy::new([RoleId::new(1)])));
        let task = RoleReorder::new(reconciler, None, Duration::from_secs(60));

        let err = task.reorder(&Unreachable).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
