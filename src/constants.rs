// -
// Sentinel event channels

/// A Sentinel won the election to run a failover for a master
pub(crate) const CHANNEL_ELECTED_LEADER: &str = "+elected-leader";
/// Master address changed after a completed failover
pub(crate) const CHANNEL_SWITCH_MASTER: &str = "+switch-master";
/// Sentinel is reconfiguring a replica to follow the new master
pub(crate) const CHANNEL_FIX_SLAVE_CONFIG: &str = "fix-slave-config";
pub(crate) const CHANNEL_FAILOVER_END: &str = "failover-end";
pub(crate) const CHANNEL_FAILOVER_END_FOR_TIMEOUT: &str = "failover-end-for-timeout";

/// A new Sentinel joined the monitoring group
pub(crate) const CHANNEL_SENTINEL_ADDED: &str = "+sentinel";
pub(crate) const CHANNEL_OBJECTIVE_DOWN_CLEARED: &str = "-odown";
pub(crate) const CHANNEL_SUBJECTIVE_DOWN_CLEARED: &str = "-sdown";

/// Instance-type prefix of payloads describing another Sentinel
pub(crate) const SENTINEL_INSTANCE_PREFIX: &str = "sentinel ";

// -
// Subscription

/// Pattern subscription covering every channel
pub const SUBSCRIBE_ALL_PATTERN: &str = "*";

// -
// Defaults

pub(crate) const DEFAULT_DEBOUNCE_WINDOW_MS: u64 = 5_000;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Environment variable prefix for configuration overrides
pub(crate) const CONFIG_ENV_PREFIX: &str = "SENTINEL_WATCH";
