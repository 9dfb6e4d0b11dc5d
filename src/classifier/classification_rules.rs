use super::Category;
use super::CategorySet;
use crate::constants::CHANNEL_ELECTED_LEADER;
use crate::constants::CHANNEL_FAILOVER_END;
use crate::constants::CHANNEL_FAILOVER_END_FOR_TIMEOUT;
use crate::constants::CHANNEL_FIX_SLAVE_CONFIG;
use crate::constants::CHANNEL_OBJECTIVE_DOWN_CLEARED;
use crate::constants::CHANNEL_SENTINEL_ADDED;
use crate::constants::CHANNEL_SUBJECTIVE_DOWN_CLEARED;
use crate::constants::CHANNEL_SWITCH_MASTER;
use crate::constants::SENTINEL_INSTANCE_PREFIX;

/// Immutable rule table for one watched master.
///
/// The master-specific payload fragments are formatted once at construction.
/// The trailing space after the master name is part of every fragment, so
/// `mymaster` never matches events about `mymaster2`.
#[derive(Debug, Clone)]
pub struct ClassificationRules {
    master_id: String,
    /// `+elected-leader` payload prefix: `master <id> `
    elected_leader_prefix: String,
    /// `+switch-master` payload prefix: `<id> `
    switch_master_prefix: String,
    /// `fix-slave-config` payload fragment: `@ <id> `
    fix_slave_marker: String,
}

impl ClassificationRules {
    pub fn new(master_id: impl Into<String>) -> Self {
        let master_id = master_id.into();
        Self {
            elected_leader_prefix: format!("master {master_id} "),
            switch_master_prefix: format!("{master_id} "),
            fix_slave_marker: format!("@ {master_id} "),
            master_id,
        }
    }

    pub fn master_id(&self) -> &str {
        &self.master_id
    }

    /// Evaluates both category rules independently.
    pub fn classify(
        &self,
        channel: &str,
        payload: &str,
    ) -> CategorySet {
        let mut categories = CategorySet::empty();
        if self.is_topology_change(channel, payload) {
            categories.insert(Category::RefreshTopology);
        }
        if Self::is_watchdog_change(channel, payload) {
            categories.insert(Category::ReconnectWatchdogs);
        }
        categories
    }

    fn is_topology_change(
        &self,
        channel: &str,
        payload: &str,
    ) -> bool {
        match channel {
            CHANNEL_ELECTED_LEADER => payload.starts_with(&self.elected_leader_prefix),
            CHANNEL_SWITCH_MASTER => payload.starts_with(&self.switch_master_prefix),
            CHANNEL_FIX_SLAVE_CONFIG => payload.contains(&self.fix_slave_marker),
            CHANNEL_FAILOVER_END | CHANNEL_FAILOVER_END_FOR_TIMEOUT => true,
            _ => false,
        }
    }

    fn is_watchdog_change(
        channel: &str,
        payload: &str,
    ) -> bool {
        match channel {
            CHANNEL_SENTINEL_ADDED => true,
            CHANNEL_OBJECTIVE_DOWN_CLEARED | CHANNEL_SUBJECTIVE_DOWN_CLEARED => {
                payload.starts_with(SENTINEL_INSTANCE_PREFIX)
            }
            _ => false,
        }
    }
}
