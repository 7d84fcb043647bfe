//! Analytics endpoint and storage constants.
//!
//! Centralized static configuration for the collection endpoint and the
//! persisted preference record.

use std::time::Duration;

/// Collection endpoint for analytics payloads
pub const ANALYTICS_ENDPOINT_URL: &str = "https://updater.home-assistant.io/";

/// Upper bound for a single submission
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default reporting cadence
pub const REPORT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Storage key of the preference record
pub const STORAGE_KEY: &str = "core.analytics";

/// Schema version of the preference record
pub const STORAGE_VERSION: u32 = 1;

/// Domain whose states count as automations
pub const AUTOMATION_DOMAIN: &str = "automation";

/// User agent sent with every submission
#[inline]
pub fn user_agent(version: &str) -> String {
    format!("hass/{}", version)
}
