//! Analytics configuration
//!
//! Controls where and how often analytics are submitted. What is submitted
//! is decided by the user's stored consent preferences, not by this file.
//!
//! # Defaults
//!
//! - `endpoint`: unset, the reporter's built-in collection endpoint
//! - `interval`: 1 day
//! - `timeout`: 30 seconds
//! - `storage_dir`: `~/.hass/.storage`

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Analytics configuration
///
/// # Example
///
/// ```toml
/// [analytics]
/// interval = "1d"
/// timeout = "30s"
/// storage_dir = "/config/.storage"
/// inventory = "/config/inventory.json"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Collection endpoint URL override
    pub endpoint: Option<String>,

    /// Reporting interval
    /// Default: 1 day
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Deadline for a single submission
    /// Default: 30 seconds
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Directory holding persisted records (preferences, installation id)
    pub storage_dir: PathBuf,

    /// Host inventory document (integrations, states, users)
    pub inventory: Option<PathBuf>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            interval: Duration::from_secs(24 * 60 * 60), // 1 day
            timeout: Duration::from_secs(30),
            storage_dir: default_storage_dir(),
            inventory: None,
        }
    }
}

/// Default storage directory under the user's home.
pub fn default_storage_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".hass")
        .join(".storage")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalyticsConfig::default();
        assert!(config.endpoint.is_none());
        assert_eq!(config.interval, Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.storage_dir.ends_with(".hass/.storage"));
        assert!(config.inventory.is_none());
    }

    #[test]
    fn test_deserialize_empty() {
        let config: AnalyticsConfig = toml::from_str("").unwrap();
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
endpoint = "http://127.0.0.1:8080/"
interval = "12h"
timeout = "5s"
storage_dir = "/config/.storage"
inventory = "/config/inventory.json"
"#;
        let config: AnalyticsConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://127.0.0.1:8080/"));
        assert_eq!(config.interval, Duration::from_secs(12 * 60 * 60));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.storage_dir, PathBuf::from("/config/.storage"));
        assert_eq!(
            config.inventory,
            Some(PathBuf::from("/config/inventory.json"))
        );
    }

    #[test]
    fn test_deserialize_interval_variants() {
        for (s, expected) in [
            ("1d", Duration::from_secs(24 * 60 * 60)),
            ("6h", Duration::from_secs(6 * 60 * 60)),
            ("90m", Duration::from_secs(90 * 60)),
        ] {
            let toml = format!("interval = \"{}\"", s);
            let config: AnalyticsConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config.interval, expected, "Failed for {}", s);
        }
    }
}
