#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! Runtime configuration, fixed once at process start.

use crate::error::ConfigError;
use crate::probes::Sampling;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV_VAR: &str = "MENAGERIE_CONFIG";

/// Upper bound for the driver tick (safety limit)
const MAX_TICK_SECS: u64 = 3600;

/// Knobs for the placeholder behaviors each animal performs.
///
/// Every behavior is bounded by one of these values so the harness is safe
/// to leave running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorConfig {
    /// Iterations of the CPU-bound spin loop
    pub spin_iterations: u64,

    /// Size of each transient allocation
    pub churn_bytes: usize,

    /// Size of each chunk kept in the larder
    pub hoard_chunk_bytes: usize,

    /// Larder capacity; oldest chunks are evicted beyond it
    pub hoard_cap_bytes: usize,

    /// Detached helper threads spawned per scatter
    pub scatter_tasks: usize,

    /// How long each detached helper lives
    pub scatter_lifetime: Duration,

    /// How long the den is held by the competing helper
    pub den_hold: Duration,

    /// How long a rendezvous blocks before the partner signals
    pub rendezvous_wait: Duration,
}

impl BehaviorConfig {
    /// Near-zero costs, for tests that only care about dispatch.
    #[must_use]
    pub const fn quiet() -> Self {
        Self {
            spin_iterations: 1_000,
            churn_bytes: 64,
            hoard_chunk_bytes: 64,
            hoard_cap_bytes: 256,
            scatter_tasks: 2,
            scatter_lifetime: Duration::from_millis(5),
            den_hold: Duration::from_millis(2),
            rendezvous_wait: Duration::from_millis(2),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            spin_iterations: 100_000_000,
            churn_bytes: 16_777_216,
            hoard_chunk_bytes: 1_048_576,
            hoard_cap_bytes: 268_435_456,
            scatter_tasks: 10,
            scatter_lifetime: Duration::from_secs(30),
            den_hold: Duration::from_millis(200),
            rendezvous_wait: Duration::from_millis(500),
        }
    }
}

/// Process-wide settings for the harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Address of the introspection endpoint
    bind_address: SocketAddr,

    /// Pause between driver cycles
    tick_interval: Duration,

    /// Worker threads for the background runtime
    parallelism: usize,

    /// Record one in every N lock contentions (0 disables)
    mutex_profile_fraction: u32,

    /// Record blocking events at least this long (0 disables)
    block_profile_rate_nanos: u64,

    behavior: BehaviorConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 6060)),
            tick_interval: Duration::from_secs(1),
            parallelism: 1,
            mutex_profile_fraction: 1,
            block_profile_rate_nanos: 1,
            behavior: BehaviorConfig::default(),
        }
    }
}

/// On-disk shape: every field optional, durations in milliseconds.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    bind_address: Option<String>,
    tick_interval_ms: Option<u64>,
    parallelism: Option<usize>,
    mutex_profile_fraction: Option<u32>,
    block_profile_rate_nanos: Option<u64>,
    behavior: BehaviorFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BehaviorFile {
    spin_iterations: Option<u64>,
    churn_bytes: Option<usize>,
    hoard_chunk_bytes: Option<usize>,
    hoard_cap_bytes: Option<usize>,
    scatter_tasks: Option<usize>,
    scatter_lifetime_ms: Option<u64>,
    den_hold_ms: Option<u64>,
    rendezvous_wait_ms: Option<u64>,
}

impl BehaviorFile {
    fn apply(self, base: BehaviorConfig) -> BehaviorConfig {
        BehaviorConfig {
            spin_iterations: self.spin_iterations.unwrap_or(base.spin_iterations),
            churn_bytes: self.churn_bytes.unwrap_or(base.churn_bytes),
            hoard_chunk_bytes: self.hoard_chunk_bytes.unwrap_or(base.hoard_chunk_bytes),
            hoard_cap_bytes: self.hoard_cap_bytes.unwrap_or(base.hoard_cap_bytes),
            scatter_tasks: self.scatter_tasks.unwrap_or(base.scatter_tasks),
            scatter_lifetime: self
                .scatter_lifetime_ms
                .map_or(base.scatter_lifetime, Duration::from_millis),
            den_hold: self.den_hold_ms.map_or(base.den_hold, Duration::from_millis),
            rendezvous_wait: self
                .rendezvous_wait_ms
                .map_or(base.rendezvous_wait, Duration::from_millis),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the file named by `MENAGERIE_CONFIG`, or
    /// defaults when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::load(path.as_deref())
    }

    /// Load configuration from an optional TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::file_read_failed(path, e.to_string()))?;
                tracing::info!(path = %path.display(), "loading runtime configuration");
                Self::from_toml_str(&text)
            }
        }
    }

    /// Parse TOML overrides on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed, has unknown keys, or yields an
    /// invalid configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| ConfigError::toml_parse_failed(e.to_string()))?;
        let base = Self::default();

        let bind_address = file
            .bind_address
            .map_or(Ok(base.bind_address), |raw| Self::parse_bind_address(&raw))?;

        let config = Self {
            bind_address,
            tick_interval: file
                .tick_interval_ms
                .map_or(base.tick_interval, Duration::from_millis),
            parallelism: file.parallelism.unwrap_or(base.parallelism),
            mutex_profile_fraction: file
                .mutex_profile_fraction
                .unwrap_or(base.mutex_profile_fraction),
            block_profile_rate_nanos: file
                .block_profile_rate_nanos
                .unwrap_or(base.block_profile_rate_nanos),
            behavior: file.behavior.apply(base.behavior),
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the tick interval.
    ///
    /// # Errors
    ///
    /// Returns error if the interval is zero or longer than an hour.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Result<Self, ConfigError> {
        Self::validate_tick_interval(tick_interval)?;
        self.tick_interval = tick_interval;
        Ok(self)
    }

    /// Replace the behavior knobs.
    ///
    /// # Errors
    ///
    /// Returns error if the hoard cap cannot hold a single chunk.
    pub fn with_behavior(mut self, behavior: BehaviorConfig) -> Result<Self, ConfigError> {
        Self::validate_behavior(&behavior)?;
        self.behavior = behavior;
        Ok(self)
    }

    #[must_use]
    pub const fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    #[must_use]
    pub const fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Sampling policy for the probes
    #[must_use]
    pub const fn sampling(&self) -> Sampling {
        Sampling::new(self.mutex_profile_fraction, self.block_profile_rate_nanos)
    }

    #[must_use]
    pub const fn behavior(&self) -> &BehaviorConfig {
        &self.behavior
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Self::validate_tick_interval(self.tick_interval)?;
        if self.parallelism == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        Self::validate_behavior(&self.behavior)
    }

    fn validate_tick_interval(tick: Duration) -> Result<(), ConfigError> {
        if tick.is_zero() || tick > Duration::from_secs(MAX_TICK_SECS) {
            Err(ConfigError::TickInterval {
                got_ms: tick.as_millis(),
                max_secs: MAX_TICK_SECS,
            })
        } else {
            Ok(())
        }
    }

    const fn validate_behavior(behavior: &BehaviorConfig) -> Result<(), ConfigError> {
        if behavior.hoard_cap_bytes < behavior.hoard_chunk_bytes {
            Err(ConfigError::HoardCap {
                cap: behavior.hoard_cap_bytes,
                chunk: behavior.hoard_chunk_bytes,
            })
        } else {
            Ok(())
        }
    }

    fn parse_bind_address(raw: &str) -> Result<SocketAddr, ConfigError> {
        raw.parse::<SocketAddr>()
            .map_err(|_| ConfigError::BindAddress(raw.to_string()))
    }
}
