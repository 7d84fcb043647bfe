//! Analytics reporter - decides, collects and submits.
//!
//! One call to [`AnalyticsReporter::submit`] is one best-effort attempt:
//! read the active preferences, build a payload, POST it under a bounded
//! timeout and log the outcome. Network failures never escape; the next
//! scheduled attempt is the only recovery.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::collector::Collector;
use crate::endpoint::{ANALYTICS_ENDPOINT_URL, REPORT_INTERVAL, SUBMIT_TIMEOUT};
use crate::error::{StorageError, TransportError};
use crate::payload::AnalyticsPayload;
use crate::preferences::PreferenceSet;
use crate::store::PreferenceStore;
use crate::transport::Transport;

/// Configuration for the analytics reporter.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Collection endpoint URL
    pub endpoint: String,

    /// Deadline for one submission (default: 30s)
    pub timeout: Duration,

    /// How often the scheduler submits (default: daily)
    pub interval: Duration,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            endpoint: ANALYTICS_ENDPOINT_URL.to_string(),
            timeout: SUBMIT_TIMEOUT,
            interval: REPORT_INTERVAL,
        }
    }
}

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Base category not enabled; nothing built, nothing sent
    Skipped,
    /// Endpoint answered 200
    Submitted,
    /// Endpoint answered with another status
    Rejected { status: u16 },
    /// No answer within the deadline
    TimedOut,
    /// Connection or request failure
    Failed(String),
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }

    /// Whether a request was put on the wire
    pub fn attempted(&self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

impl std::fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped => f.write_str("skipped (base analytics not enabled)"),
            Self::Submitted => f.write_str("submitted"),
            Self::Rejected { status } => write!(f, "rejected with HTTP {}", status),
            Self::TimedOut => f.write_str("timed out"),
            Self::Failed(detail) => write!(f, "failed: {}", detail),
        }
    }
}

/// Sends the user-consented analytics snapshot.
pub struct AnalyticsReporter {
    config: ReporterConfig,
    preferences: PreferenceStore,
    collector: Collector,
    transport: Arc<dyn Transport>,
}

impl AnalyticsReporter {
    pub fn new(
        config: ReporterConfig,
        preferences: PreferenceStore,
        collector: Collector,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            preferences,
            collector,
            transport,
        }
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Load persisted preferences into the active set (call at startup)
    pub async fn load_preferences(&self) -> PreferenceSet {
        self.preferences.load().await
    }

    /// Replace and persist preferences. Storage failures propagate.
    pub async fn save_preferences(&self, prefs: PreferenceSet) -> Result<(), StorageError> {
        self.preferences.save(prefs).await
    }

    /// The active preferences
    pub async fn preferences(&self) -> PreferenceSet {
        self.preferences.current().await
    }

    /// The payload a submission would send right now, without sending it
    pub async fn preview(&self) -> Option<AnalyticsPayload> {
        let prefs = self.preferences.current().await;
        self.collector.collect(&prefs).await
    }

    /// Submit analytics once.
    ///
    /// Never fails: every outcome is logged and returned for inspection.
    pub async fn submit(&self) -> SubmitOutcome {
        let prefs = self.preferences.current().await;

        let Some(payload) = self.collector.collect(&prefs).await else {
            debug!(preferences = %prefs, "Nothing to submit");
            return SubmitOutcome::Skipped;
        };

        let outcome = self.send(&payload).await;
        self.log_outcome(&outcome, &payload);
        outcome
    }

    async fn send(&self, payload: &AnalyticsPayload) -> SubmitOutcome {
        let request = self.transport.post_json(&self.config.endpoint, payload);

        match tokio::time::timeout(self.config.timeout, request).await {
            Err(_) | Ok(Err(TransportError::Timeout)) => SubmitOutcome::TimedOut,
            Ok(Err(e)) => SubmitOutcome::Failed(e.to_string()),
            Ok(Ok(200)) => SubmitOutcome::Submitted,
            Ok(Ok(status)) => SubmitOutcome::Rejected { status },
        }
    }

    fn log_outcome(&self, outcome: &SubmitOutcome, payload: &AnalyticsPayload) {
        let endpoint = self.config.endpoint.as_str();

        match outcome {
            SubmitOutcome::Submitted => {
                let contents = serde_json::to_string(payload).unwrap_or_default();
                info!(
                    endpoint,
                    "Submitted analytics. Information submitted includes {}", contents
                );
            }
            SubmitOutcome::Rejected { status } => {
                warn!(endpoint, status, "Sending analytics failed with status code {}", status);
            }
            SubmitOutcome::TimedOut => {
                error!(
                    endpoint,
                    timeout_secs = self.config.timeout.as_secs(),
                    "Timeout sending analytics to {}",
                    endpoint
                );
            }
            SubmitOutcome::Failed(detail) => {
                error!(
                    endpoint,
                    error = %detail,
                    "Error sending analytics to {}: {}",
                    endpoint,
                    detail
                );
            }
            SubmitOutcome::Skipped => {}
        }
    }
}
