//! Analytics payload.
//!
//! Defines the exact JSON object posted to the collection endpoint. Optional
//! fields are omitted entirely when their category is not enabled, so the
//! body only ever contains what the user agreed to share.

use serde::{Deserialize, Serialize};

/// One submission body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsPayload {
    /// Anonymous installation identifier, generated once by the host
    pub huuid: String,

    /// Platform version
    pub version: String,

    /// Installation type reported by the host
    pub installation_type: String,

    /// Built-in integration identifiers (integrations category)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub components: Option<Vec<String>>,

    /// Any user-installed integration is loaded (integrations category)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub custom_integrations: Option<bool>,

    /// Total entity states (statistics category)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state_count: Option<u64>,

    /// Automation states (statistics category)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub automation_count: Option<u64>,

    /// Loaded integrations (statistics category)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub integration_count: Option<u64>,

    /// Users not created by the system (statistics category)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_count: Option<u64>,
}

impl AnalyticsPayload {
    /// Base payload with only the required fields
    pub fn new(
        huuid: impl Into<String>,
        version: impl Into<String>,
        installation_type: impl Into<String>,
    ) -> Self {
        Self {
            huuid: huuid.into(),
            version: version.into(),
            installation_type: installation_type.into(),
            components: None,
            custom_integrations: None,
            state_count: None,
            automation_count: None,
            integration_count: None,
            user_count: None,
        }
    }

    /// Number of fields that will be serialized
    pub fn field_count(&self) -> usize {
        let optional = [
            self.components.is_some(),
            self.custom_integrations.is_some(),
            self.state_count.is_some(),
            self.automation_count.is_some(),
            self.integration_count.is_some(),
            self.user_count.is_some(),
        ];
        3 + optional.iter().filter(|present| **present).count()
    }
}
