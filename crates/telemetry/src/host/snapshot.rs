//! Static host inventory.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    CatalogEntry, Integration, IntegrationCatalog, StateRegistry, SystemInfo,
    SystemInfoProvider, User, UserRegistry,
};

/// A fixed picture of a running installation.
///
/// # Example
///
/// ```json
/// {
///   "system": { "installation_type": "Home Assistant Container" },
///   "integrations": {
///     "hue": { "status": "loaded", "domain": "hue", "is_built_in": true },
///     "hacs": { "status": "loaded", "domain": "hacs", "is_built_in": false },
///     "zwave": { "status": "loading" }
///   },
///   "states": ["light.kitchen", "automation.wake_up"],
///   "users": [{ "id": "u1", "name": "Owner" }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub system: SystemInfo,

    #[serde(default)]
    pub integrations: BTreeMap<String, CatalogEntry>,

    /// Entity ids of every current state (`<domain>.<object_id>`)
    #[serde(default)]
    pub states: Vec<String>,

    #[serde(default)]
    pub users: Vec<User>,
}

impl HostSnapshot {
    /// Empty installation of the given type
    pub fn new(installation_type: impl Into<String>) -> Self {
        Self {
            system: SystemInfo {
                installation_type: installation_type.into(),
                os_name: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
                docker: false,
            },
            integrations: BTreeMap::new(),
            states: Vec::new(),
            users: Vec::new(),
        }
    }

    /// Parse an inventory document
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Register a loaded integration
    pub fn with_integration(mut self, domain: &str, is_built_in: bool) -> Self {
        self.integrations.insert(
            domain.to_string(),
            CatalogEntry::Loaded(Integration {
                domain: domain.to_string(),
                is_built_in,
            }),
        );
        self
    }

    /// Register a registry slot that is not a loaded integration
    pub fn with_entry(mut self, key: &str, entry: CatalogEntry) -> Self {
        self.integrations.insert(key.to_string(), entry);
        self
    }

    pub fn with_state(mut self, entity_id: &str) -> Self {
        self.states.push(entity_id.to_string());
        self
    }

    pub fn with_user(mut self, id: &str, is_system_generated: bool) -> Self {
        self.users.push(User {
            id: id.to_string(),
            name: id.to_string(),
            is_system_generated,
            is_active: true,
        });
        self
    }
}

#[async_trait]
impl SystemInfoProvider for HostSnapshot {
    async fn system_info(&self) -> SystemInfo {
        self.system.clone()
    }
}

impl IntegrationCatalog for HostSnapshot {
    fn entries(&self) -> Vec<(String, CatalogEntry)> {
        self.integrations
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl StateRegistry for HostSnapshot {
    fn count_states(&self, domain: Option<&str>) -> usize {
        match domain {
            None => self.states.len(),
            Some(domain) => self
                .states
                .iter()
                .filter(|id| id.split_once('.').is_some_and(|(d, _)| d == domain))
                .count(),
        }
    }
}

#[async_trait]
impl UserRegistry for HostSnapshot {
    async fn users(&self) -> Vec<User> {
        self.users.clone()
    }
}
