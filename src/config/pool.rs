//! Pool sizing and executor configuration structures.

use std::env;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable prefix read by [`ExecutorConfig::from_env`].
pub const ENV_PREFIX: &str = "WORKER_POOL_";

/// Resolved, immutable sizing of a worker pool.
///
/// The defaults encode a heuristic for mixed CPU/IO-bound workloads: a small
/// resident core, room to roughly double the parallelism under load, and a
/// queue sized proportionally to the worker ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSizing {
    /// Minimum resident worker count.
    pub core_size: usize,
    /// Ceiling on worker count.
    pub max_size: usize,
    /// Bound on the pending-task buffer.
    pub queue_capacity: usize,
    /// Idle time after which workers above `core_size` retire.
    pub keepalive: Duration,
}

impl PoolSizing {
    /// Lower bound of the default core size.
    pub const MIN_CORE_SIZE: usize = 2;
    /// Upper bound of the default core size.
    pub const MAX_DEFAULT_CORE_SIZE: usize = 4;
    /// Queue slots reserved per potential worker.
    pub const QUEUE_SLOTS_PER_WORKER: usize = 20_000;
    /// Default idle time before surplus workers retire.
    pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(60);

    /// Compute the default sizing for the given hardware parallelism.
    ///
    /// A parallelism of zero is treated as one.
    #[must_use]
    pub fn for_parallelism(parallelism: usize) -> Self {
        let parallelism = parallelism.max(1);
        let core_size = (parallelism + 1).clamp(Self::MIN_CORE_SIZE, Self::MAX_DEFAULT_CORE_SIZE);
        let max_size = 2 * parallelism + 1;

        Self {
            core_size,
            max_size,
            queue_capacity: max_size.saturating_mul(Self::QUEUE_SLOTS_PER_WORKER),
            keepalive: Self::DEFAULT_KEEPALIVE,
        }
    }

    /// Compute the default sizing from the number of logical CPUs.
    #[must_use]
    pub fn detect() -> Self {
        Self::for_parallelism(num_cpus::get())
    }

    /// Validate sizing invariants.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        if self.core_size < Self::MIN_CORE_SIZE {
            return Err(format!("core_size must be at least {}", Self::MIN_CORE_SIZE));
        }
        if self.max_size < self.core_size {
            return Err(format!(
                "max_size ({}) must be greater than or equal to core_size ({})",
                self.max_size, self.core_size
            ));
        }
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be greater than 0".into());
        }
        if self.keepalive.is_zero() {
            return Err("keepalive must be greater than 0".into());
        }
        Ok(())
    }
}

impl Default for PoolSizing {
    fn default() -> Self {
        Self::detect()
    }
}

/// Optional overrides for the worker pool, as loaded by the wiring layer.
///
/// Every sizing field left as `None` falls back to [`PoolSizing::detect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Whether the pool should be constructed at all.
    pub enabled: bool,
    /// Override for the resident worker count.
    pub core_size: Option<usize>,
    /// Override for the worker ceiling.
    pub max_size: Option<usize>,
    /// Override for the pending-task bound.
    pub queue_capacity: Option<usize>,
    /// Override for the surplus worker idle time, in seconds.
    pub keepalive_secs: Option<u64>,
    /// Prefix for worker thread names.
    pub thread_name_prefix: Option<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            core_size: None,
            max_size: None,
            queue_capacity: None,
            keepalive_secs: None,
            thread_name_prefix: None,
        }
    }
}

impl ExecutorConfig {
    /// Validate the explicitly set overrides.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid override.
    pub fn validate(&self) -> Result<(), String> {
        if self.core_size == Some(0) {
            return Err("core_size must be greater than 0".into());
        }
        if self.max_size == Some(0) {
            return Err("max_size must be greater than 0".into());
        }
        if self.queue_capacity == Some(0) {
            return Err("queue_capacity must be greater than 0".into());
        }
        if self.keepalive_secs == Some(0) {
            return Err("keepalive_secs must be greater than 0".into());
        }
        if let (Some(core), Some(max)) = (self.core_size, self.max_size) {
            if core > max {
                return Err(format!("core_size ({core}) must not exceed max_size ({max})"));
            }
        }
        if matches!(self.thread_name_prefix.as_deref(), Some(prefix) if prefix.contains('\0')) {
            return Err("thread_name_prefix must not contain null bytes".into());
        }
        Ok(())
    }

    /// Resolve the overrides against the default sizing for `parallelism`.
    ///
    /// An omitted `core_size` is clamped to an overridden `max_size`, and an
    /// omitted `queue_capacity` is derived from the effective `max_size`.
    ///
    /// # Errors
    ///
    /// Returns an error if the overrides or the resulting sizing are invalid.
    pub fn resolve(&self, parallelism: usize) -> Result<PoolSizing, String> {
        self.validate()?;

        let defaults = PoolSizing::for_parallelism(parallelism);
        let max_size = self.max_size.unwrap_or(defaults.max_size);
        let core_size = self.core_size.unwrap_or_else(|| defaults.core_size.min(max_size));
        let queue_capacity = self
            .queue_capacity
            .unwrap_or_else(|| max_size.saturating_mul(PoolSizing::QUEUE_SLOTS_PER_WORKER));
        let keepalive = self
            .keepalive_secs
            .map_or(defaults.keepalive, Duration::from_secs);

        let sizing = PoolSizing {
            core_size,
            max_size,
            queue_capacity,
            keepalive,
        };
        sizing.validate()?;
        Ok(sizing)
    }

    /// Parse executor configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or invalid overrides.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first
    /// if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the `.env` file exists but cannot be read or
    /// parsed, or if a recognized variable cannot be parsed.
    pub fn from_env() -> Result<Self, String> {
        check_dotenv(dotenvy::dotenv().map(drop))?;
        Self::from_vars(env::vars())
    }

    /// Like [`from_env`](Self::from_env), but loads the given `.env` file
    /// instead of searching the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if a recognized variable cannot be parsed.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, String> {
        check_dotenv(dotenvy::from_path(path.as_ref()))?;
        Self::from_vars(env::vars())
    }

    /// Build configuration from `WORKER_POOL_*` key/value pairs.
    ///
    /// Unrecognized keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a recognized value cannot be parsed or the result
    /// fails validation.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut cfg = Self::default();

        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();

            match name {
                "ENABLED" => cfg.enabled = parse_bool(name, value)?,
                "CORE_SIZE" => cfg.core_size = Some(parse_number(name, value)?),
                "MAX_SIZE" => cfg.max_size = Some(parse_number(name, value)?),
                "QUEUE_CAPACITY" => cfg.queue_capacity = Some(parse_number(name, value)?),
                "KEEPALIVE_SECS" => cfg.keepalive_secs = Some(parse_number(name, value)?),
                "THREAD_PREFIX" => cfg.thread_name_prefix = Some(value.to_owned()),
                _ => {}
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

/// Only a missing `.env` file is tolerated.
fn check_dotenv(result: Result<(), dotenvy::Error>) -> Result<(), String> {
    match result {
        Ok(()) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("failed to load .env file: {e}")),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(format!("{ENV_PREFIX}{name}: expected a boolean, got `{value}`")),
    }
}

fn parse_number<T>(name: &str, value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| format!("{ENV_PREFIX}{name}: invalid number `{value}`: {e}"))
}
