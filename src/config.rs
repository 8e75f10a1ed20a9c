//! # Query Configuration
//!
//! Layered configuration for the query engine: built-in defaults, then an optional
//! TOML file, then `RELQUERY_*` environment variables.

use crate::error::{QueryError, Result};
use crate::query_builder::NullOrdering;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the optional configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/relquery.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Null placement for ORDER BY keys that do not specify one
    pub default_null_ordering: NullOrdering,
    /// Largest LIMIT a query may request
    pub max_page_size: u32,
    /// Flush staged writes before every read or update
    pub auto_flush: bool,
    /// Emit a warning whenever a cross (theta) join is executed
    pub log_theta_joins: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_null_ordering: NullOrdering::Last,
            max_page_size: 1000,
            auto_flush: true,
            log_theta_joins: true,
        }
    }
}

impl QueryConfig {
    /// Load from `RELQUERY_CONFIG_PATH` (or [`DEFAULT_CONFIG_PATH`]) plus environment overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var("RELQUERY_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(Some(&path))
    }

    /// Load with an explicit file; a missing file falls back to defaults
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("default_null_ordering", "last")?
            .set_default("max_page_size", i64::from(defaults.max_page_size))?
            .set_default("auto_flush", defaults.auto_flush)?
            .set_default("log_theta_joins", defaults.log_theta_joins)?;

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading query configuration file");
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let config: Self = builder
            .add_source(config::Environment::with_prefix("RELQUERY").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Simple environment override of the defaults, without file lookup
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ordering) = lookup("RELQUERY_DEFAULT_NULL_ORDERING") {
            config.default_null_ordering = match ordering.to_ascii_lowercase().as_str() {
                "first" => NullOrdering::First,
                "last" => NullOrdering::Last,
                other => {
                    return Err(QueryError::ConfigurationError(format!(
                        "Invalid default_null_ordering: {other}"
                    )))
                }
            };
        }

        if let Some(max_page_size) = lookup("RELQUERY_MAX_PAGE_SIZE") {
            config.max_page_size = max_page_size.parse().map_err(|e| {
                QueryError::ConfigurationError(format!("Invalid max_page_size: {e}"))
            })?;
        }

        if let Some(auto_flush) = lookup("RELQUERY_AUTO_FLUSH") {
            config.auto_flush = auto_flush.parse().map_err(|e| {
                QueryError::ConfigurationError(format!("Invalid auto_flush: {e}"))
            })?;
        }

        if let Some(log_theta_joins) = lookup("RELQUERY_LOG_THETA_JOINS") {
            config.log_theta_joins = log_theta_joins.parse().map_err(|e| {
                QueryError::ConfigurationError(format!("Invalid log_theta_joins: {e}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(QueryError::ConfigurationError(
                "max_page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
