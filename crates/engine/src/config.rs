use std::time::Duration;

/// Default period between autosaves.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Default upper bound on waiting for a position fix.
pub const DEFAULT_LOCATION_TIMEOUT_SECS: u64 = 30;

/// Engine timing configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How often an in-progress session is flushed to the store.
    pub autosave_interval: Duration,
    /// How long a scan may wait for the location provider.
    pub location_timeout: Duration,
}

impl EngineConfig {
    /// Load from environment variables, falling back to defaults for
    /// missing or unparsable values.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `AUTOSAVE_INTERVAL_SECS` | `30`    |
    /// | `LOCATION_TIMEOUT_SECS`  | `30`    |
    pub fn from_env() -> Self {
        Self {
            autosave_interval: Duration::from_secs(secs_from_env(
                "AUTOSAVE_INTERVAL_SECS",
                DEFAULT_AUTOSAVE_INTERVAL_SECS,
            )),
            location_timeout: Duration::from_secs(secs_from_env(
                "LOCATION_TIMEOUT_SECS",
                DEFAULT_LOCATION_TIMEOUT_SECS,
            )),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autosave_interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            location_timeout: Duration::from_secs(DEFAULT_LOCATION_TIMEOUT_SECS),
        }
    }
}

fn secs_from_env(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|&secs| secs > 0)
        .unwrap_or(default)
}
