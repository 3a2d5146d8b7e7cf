//! Search configuration
//!
//! Defaults target the public registry; every value can be overridden from
//! the environment.

use std::sync::LazyLock;
use std::time::Duration;

use thiserror::Error;
use url::Url;

static DEFAULT_BASE_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://www.rzp.cz").expect("literal origin parses"));
const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Detail fetches in flight per search call
pub const DEFAULT_DEEP_WORKERS: usize = 6;
const DEFAULT_USER_AGENT: &str = "rzp-aggregator/0.1";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

/// Configuration for one aggregator instance
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Registry origin, e.g. `https://www.rzp.cz`. Endpoint paths are
    /// absolute, so any path on this URL would be replaced.
    pub base_url: Url,
    /// Deadline applied by the client to every single request
    pub request_timeout: Duration,
    /// Upper bound of concurrent detail fetches in Deep Search
    pub deep_workers: usize,
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.clone(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            deep_workers: DEFAULT_DEEP_WORKERS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl SearchConfig {
    /// Build from `RZP_BASE_URL`, `RZP_TIMEOUT_SECS`, `RZP_DEEP_WORKERS` and
    /// `RZP_USER_AGENT`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("RZP_BASE_URL") {
            let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                var: "RZP_BASE_URL",
                reason: e.to_string(),
            })?;
            if url.path() != "/" {
                return Err(ConfigError::InvalidValue {
                    var: "RZP_BASE_URL",
                    reason: format!("'{}' must be an origin without a path", raw),
                });
            }
            config.base_url = url;
        }

        if let Some(raw) = lookup("RZP_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "RZP_TIMEOUT_SECS",
                reason: format!("'{}' is not a number of seconds", raw),
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("RZP_DEEP_WORKERS") {
            let workers: usize = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "RZP_DEEP_WORKERS",
                reason: format!("'{}' is not a worker count", raw),
            })?;
            config = config.with_deep_workers(workers)?;
        }

        if let Some(raw) = lookup("RZP_USER_AGENT") {
            config.user_agent = raw;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_deep_workers(mut self, workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::InvalidValue {
                var: "RZP_DEEP_WORKERS",
                reason: "at least one worker is required".to_string(),
            });
        }
        self.deep_workers = workers;
        Ok(self)
    }
}
