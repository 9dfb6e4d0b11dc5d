use std::env;
use std::time::Duration;

use ::config::Config;
use ::config::ConfigError;
use ::config::Environment;
use ::config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::CONFIG_ENV_PREFIX;
use crate::constants::DEFAULT_CONNECT_TIMEOUT_MS;
use crate::constants::DEFAULT_DEBOUNCE_WINDOW_MS;
use crate::Endpoint;
use crate::Error;
use crate::Result;

/// Environment variable naming a config file when none is passed explicitly
pub const CONFIG_PATH_ENV: &str = "SENTINEL_WATCH_CONFIG";

/// What `bootstrap` does when it could not connect to any Sentinel.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapFailurePolicy {
    /// Return the aggregated error when every attempt failed and no
    /// connection is live
    #[default]
    SurfaceWhenAllFail,
    /// Only log the aggregated error
    LogOnly,
}

/// Watcher settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WatcherConfig {
    /// Logical name of the watched master, as known to the Sentinels
    pub master_id: String,

    /// Sentinel nodes to subscribe to
    pub sentinels: Vec<Endpoint>,

    /// Debounce window per event category in milliseconds
    /// Default: 5000
    #[serde(default = "default_debounce_window_ms")]
    pub debounce_window_ms: u64,

    /// Upper bound of a single connect attempt in milliseconds
    /// Default: 10000
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default)]
    pub failure_policy: BootstrapFailurePolicy,
}

impl WatcherConfig {
    pub fn new(
        master_id: impl Into<String>,
        sentinels: Vec<Endpoint>,
    ) -> Self {
        Self {
            master_id: master_id.into(),
            sentinels,
            debounce_window_ms: default_debounce_window_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            failure_policy: BootstrapFailurePolicy::default(),
        }
    }

    /// Load configuration from defaults, an optional TOML file and
    /// `SENTINEL_WATCH__*` environment variables, then validate it.
    ///
    /// # Arguments
    /// * `path` - Config file; falls back to `SENTINEL_WATCH_CONFIG` when `None`
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("debounce_window_ms", default_debounce_window_ms())?
            .set_default("connect_timeout_ms", default_connect_timeout_ms())?
            .set_default("failure_policy", "surface_when_all_fail")?;

        let env_path = env::var(CONFIG_PATH_ENV).ok();
        if let Some(path) = path.or(env_path.as_deref()) {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(CONFIG_ENV_PREFIX)
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.master_id.trim().is_empty() {
            return Err(invalid("master_id must not be empty"));
        }
        if self.sentinels.is_empty() {
            return Err(invalid("at least one sentinel endpoint is required"));
        }
        if self.debounce_window_ms == 0 {
            return Err(invalid("debounce_window_ms must be greater than 0"));
        }
        if self.connect_timeout_ms == 0 {
            return Err(invalid("connect_timeout_ms must be greater than 0"));
        }
        Ok(())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_window_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn invalid(message: &str) -> Error {
    Error::Config(ConfigError::Message(message.to_string()))
}

fn default_debounce_window_ms() -> u64 {
    DEFAULT_DEBOUNCE_WINDOW_MS
}
fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}
