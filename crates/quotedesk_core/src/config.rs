//! Runtime configuration for QuoteDesk callers.
//!
//! # Responsibility
//! - Resolve storage/logging/duplicate-policy settings from the environment.
//! - Surface bad or missing settings as typed errors instead of panics.
//!
//! # Invariants
//! - Env lookup is injectable so resolution stays testable without touching
//!   process-global state.
//! - A resolved config always carries a valid `DuplicatePolicy`.

use crate::similarity::{DuplicatePolicy, DEFAULT_IDENTICAL_THRESHOLD, DEFAULT_SIMILAR_THRESHOLD};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "QUOTEDESK_DB_PATH";
pub const ENV_LOG_DIR: &str = "QUOTEDESK_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "QUOTEDESK_LOG_LEVEL";
pub const ENV_SIMILAR_THRESHOLD: &str = "QUOTEDESK_SIMILAR_THRESHOLD";
pub const ENV_IDENTICAL_THRESHOLD: &str = "QUOTEDESK_IDENTICAL_THRESHOLD";
pub const ENV_ENRICH_WORKERS: &str = "QUOTEDESK_ENRICH_WORKERS";

/// Worker count used by bulk enrichment when not configured.
pub const DEFAULT_ENRICH_WORKERS: usize = 4;
const MAX_ENRICH_WORKERS: usize = 32;

/// Configuration resolution error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Required setting is absent or blank.
    Missing(&'static str),
    /// Setting is present but cannot be used.
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required setting `{key}`"),
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for `{key}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Fully resolved application settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Absolute log directory; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Log level accepted by `init_logging`.
    pub log_level: String,
    /// Similar/identical thresholds for duplicate checks.
    pub duplicate_policy: DuplicatePolicy,
    /// Bounded worker count for bulk enrichment.
    pub enrichment_workers: usize,
}

impl AppConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration using a caller-provided lookup.
    ///
    /// # Errors
    /// - `QUOTEDESK_DB_PATH` is missing or blank.
    /// - `QUOTEDESK_LOG_DIR` is set but not absolute.
    /// - Thresholds or worker count do not parse or are out of range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = get(ENV_DB_PATH)
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing(ENV_DB_PATH))?;

        let log_dir = match get(ENV_LOG_DIR) {
            Some(value) => {
                let path = PathBuf::from(&value);
                if !path.is_absolute() {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_LOG_DIR,
                        value,
                        reason: "log directory must be an absolute path",
                    });
                }
                Some(path)
            }
            None => None,
        };

        let log_level =
            get(ENV_LOG_LEVEL).unwrap_or_else(|| crate::logging::default_log_level().to_string());

        let similar = parse_threshold(ENV_SIMILAR_THRESHOLD, get(ENV_SIMILAR_THRESHOLD))?
            .unwrap_or(DEFAULT_SIMILAR_THRESHOLD);
        let identical = parse_threshold(ENV_IDENTICAL_THRESHOLD, get(ENV_IDENTICAL_THRESHOLD))?
            .unwrap_or(DEFAULT_IDENTICAL_THRESHOLD);
        let duplicate_policy =
            DuplicatePolicy::new(similar, identical).map_err(name_threshold_env_key)?;

        let enrichment_workers = match get(ENV_ENRICH_WORKERS) {
            Some(value) => parse_workers(value)?,
            None => DEFAULT_ENRICH_WORKERS,
        };

        Ok(Self {
            db_path,
            log_dir,
            log_level,
            duplicate_policy,
            enrichment_workers,
        })
    }
}

fn parse_threshold(key: &'static str, raw: Option<String>) -> Result<Option<f64>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: raw,
            reason: "expected a decimal number",
        })
}

/// Reports policy errors under the environment variable the value came from.
fn name_threshold_env_key(err: ConfigError) -> ConfigError {
    match err {
        ConfigError::InvalidValue { key, value, reason } => ConfigError::InvalidValue {
            key: match key {
                "similar_threshold" => ENV_SIMILAR_THRESHOLD,
                "identical_threshold" => ENV_IDENTICAL_THRESHOLD,
                other => other,
            },
            value,
            reason,
        },
        other => other,
    }
}

fn parse_workers(raw: String) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(value) if (1..=MAX_ENRICH_WORKERS).contains(&value) => Ok(value),
        _ => Err(ConfigError::InvalidValue {
            key: ENV_ENRICH_WORKERS,
            value: raw,
            reason: "expected an integer between 1 and 32",
        }),
    }
}
