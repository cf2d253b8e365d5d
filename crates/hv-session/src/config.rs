//! Session configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use hv_query::{DEFAULT_AGGREGATE_CACHE_CAPACITY, DEFAULT_FILTER_CACHE_CAPACITY};

use crate::error::{Result, SessionError};

/// Default trailing delay for secondary consumers.
pub const DEFAULT_SECONDARY_DELAY_MS: u64 = 100;

/// Cache sizes and scheduling delays of a session.
///
/// Every field is optional in TOML; missing fields take their defaults.
///
/// ```toml
/// filter_cache_capacity = 50
/// aggregate_cache_capacity = 20
/// secondary_delay_ms = 100
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of memoized filtered subsets.
    pub filter_cache_capacity: usize,

    /// Number of memoized aggregates of each kind.
    pub aggregate_cache_capacity: usize,

    /// Delay before secondary consumers receive a publication.
    ///
    /// Publications arriving within the delay restart it.
    pub secondary_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            filter_cache_capacity: DEFAULT_FILTER_CACHE_CAPACITY,
            aggregate_cache_capacity: DEFAULT_AGGREGATE_CACHE_CAPACITY,
            secondary_delay_ms: DEFAULT_SECONDARY_DELAY_MS,
        }
    }
}

impl SessionConfig {
    /// Loads a configuration file and validates it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SessionError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: SessionConfig =
            toml::from_str(&content).map_err(|e| SessionError::ConfigParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        config.validate()?;
        tracing::info!(path = %path.display(), ?config, "Loaded session config");
        Ok(config)
    }

    /// Rejects zero cache capacities.
    pub fn validate(&self) -> Result<()> {
        if self.filter_cache_capacity == 0 {
            return Err(SessionError::InvalidConfig {
                field: "filter_cache_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.aggregate_cache_capacity == 0 {
            return Err(SessionError::InvalidConfig {
                field: "aggregate_cache_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn secondary_delay(&self) -> Duration {
        Duration::from_millis(self.secondary_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.filter_cache_capacity, 50);
        assert_eq!(config.aggregate_cache_capacity, 20);
        assert_eq!(config.secondary_delay(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SessionConfig = toml::from_str("secondary_delay_ms = 250").unwrap();
        assert_eq!(config.secondary_delay_ms, 250);
        assert_eq!(config.filter_cache_capacity, 50);
    }

    #[test]
    fn test_round_trip() {
        let config = SessionConfig {
            filter_cache_capacity: 8,
            ..SessionConfig::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: SessionConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = SessionConfig {
            aggregate_cache_capacity: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SessionError::InvalidConfig {
                field: "aggregate_cache_capacity",
                ..
            })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "filter_cache_capacity = 3").unwrap();
        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.filter_cache_capacity, 3);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "filter_cache_capacity = \"many\"").unwrap();
        assert!(matches!(
            SessionConfig::load(bad.path()),
            Err(SessionError::ConfigParse { .. })
        ));

        assert!(matches!(
            SessionConfig::load(Path::new("/no/such/config.toml")),
            Err(SessionError::ConfigRead { .. })
        ));
    }
}
