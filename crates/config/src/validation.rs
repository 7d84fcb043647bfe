//! Configuration validation
//!
//! Validates the analytics section:
//! - Endpoint override, if set, is an http(s) URL
//! - Interval and timeout are non-zero
//! - A submission cannot outlive the interval it belongs to

use crate::Config;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_analytics(config)?;
    Ok(())
}

fn validate_analytics(config: &Config) -> Result<()> {
    let analytics = &config.analytics;

    if let Some(endpoint) = &analytics.endpoint {
        let trimmed = endpoint.trim();
        let has_host = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'));
        if !has_host {
            return Err(ConfigError::invalid_value(
                "analytics",
                "endpoint",
                format!("'{}' is not an http(s) URL", endpoint),
            ));
        }
    }

    if analytics.interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "analytics",
            "interval",
            "must be greater than zero",
        ));
    }

    if analytics.timeout.is_zero() {
        return Err(ConfigError::invalid_value(
            "analytics",
            "timeout",
            "must be greater than zero",
        ));
    }

    if analytics.timeout > analytics.interval {
        return Err(ConfigError::invalid_value(
            "analytics",
            "timeout",
            "must not exceed the reporting interval",
        ));
    }

    Ok(())
}
