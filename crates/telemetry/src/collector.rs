//! Analytics payload collector.
//!
//! Builds a point-in-time payload from the host collaborators, restricted
//! to the categories the user enabled. Nothing is queried for a category
//! that is off.

use crate::endpoint::AUTOMATION_DOMAIN;
use crate::host::Host;
use crate::integrations::{IntegrationSummary, list_integrations};
use crate::payload::AnalyticsPayload;
use crate::preferences::{PreferenceSet, ReportingCategory};

/// Assembles payloads for one installation.
#[derive(Debug, Clone)]
pub struct Collector {
    /// Anonymous installation id, supplied by the host
    install_id: String,

    /// Platform version reported in every payload
    version: String,

    host: Host,
}

impl Collector {
    /// Create a collector for an installation.
    ///
    /// The install id is owned by the host; the collector never
    /// regenerates it.
    pub fn new(install_id: impl Into<String>, version: impl Into<String>, host: Host) -> Self {
        Self {
            install_id: install_id.into(),
            version: version.into(),
            host,
        }
    }

    pub fn install_id(&self) -> &str {
        &self.install_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Collect a payload, or `None` when the base category is not enabled.
    pub async fn collect(&self, prefs: &PreferenceSet) -> Option<AnalyticsPayload> {
        if !prefs.allows_submission() {
            return None;
        }

        let system = self.host.system.system_info().await;
        let mut payload =
            AnalyticsPayload::new(&self.install_id, &self.version, system.installation_type);

        let wants_integrations = prefs.contains(ReportingCategory::Integrations);
        let wants_statistics = prefs.contains(ReportingCategory::Statistics);

        // Catalog contents cannot change mid-collection, one walk serves both
        let summary: Option<IntegrationSummary> = (wants_integrations || wants_statistics)
            .then(|| list_integrations(self.host.integrations.as_ref()));

        if let Some(summary) = summary.as_ref().filter(|_| wants_integrations) {
            payload.components = Some(summary.built_in.clone());
            payload.custom_integrations = Some(summary.has_custom());
        }

        if let Some(summary) = summary.as_ref().filter(|_| wants_statistics) {
            let users = self.host.users.users().await;
            let active_users = users.iter().filter(|u| !u.is_system_generated).count();

            payload.state_count = Some(self.host.states.count_states(None) as u64);
            payload.automation_count =
                Some(self.host.states.count_states(Some(AUTOMATION_DOMAIN)) as u64);
            // Built-in only; custom integrations are reported as a flag at most
            payload.integration_count = Some(summary.built_in.len() as u64);
            payload.user_count = Some(active_users as u64);
        }

        Some(payload)
    }
}
