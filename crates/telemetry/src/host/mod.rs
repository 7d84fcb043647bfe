//! Interfaces to the host platform.
//!
//! The reporter never owns integrations, states or users; it queries them
//! through these traits. Concrete implementations live with the host.
//! [`HostSnapshot`] is a static inventory that implements every trait and
//! backs the CLI and the tests.

mod snapshot;
mod system;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use snapshot::HostSnapshot;
pub use system::{DetectedSystemInfo, InstallationType, SystemProbe};

/// Facts about the machine the platform runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Human-readable installation type (e.g. "Home Assistant Container")
    pub installation_type: String,

    /// Operating system family (linux, darwin, windows)
    #[serde(default)]
    pub os_name: String,

    /// CPU architecture (aarch64, x86_64)
    #[serde(default)]
    pub arch: String,

    /// Running inside a container
    #[serde(default)]
    pub docker: bool,
}

/// A loaded integration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    /// Integration identifier, e.g. "hue"
    pub domain: String,

    /// Shipped with the platform (as opposed to user-installed)
    pub is_built_in: bool,
}

/// One slot in the integration registry.
///
/// The registry also tracks integrations that are still resolving or
/// that failed to resolve; only `Loaded` entries are real records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum CatalogEntry {
    Loaded(Integration),
    Loading,
    Missing,
}

/// A platform user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Created by the platform itself (supervisor, cloud, etc.)
    #[serde(default)]
    pub is_system_generated: bool,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Supplies installation type and other host facts.
#[async_trait]
pub trait SystemInfoProvider: Send + Sync {
    async fn system_info(&self) -> SystemInfo;
}

/// Enumerates the integration registry.
pub trait IntegrationCatalog: Send + Sync {
    /// All registry entries as `(key, entry)`, in registry iteration order
    fn entries(&self) -> Vec<(String, CatalogEntry)>;
}

/// Counts entity states.
pub trait StateRegistry: Send + Sync {
    /// Number of states, optionally restricted to one domain
    fn count_states(&self, domain: Option<&str>) -> usize;
}

/// Lists platform users.
#[async_trait]
pub trait UserRegistry: Send + Sync {
    async fn users(&self) -> Vec<User>;
}

/// The collaborators the collector queries.
#[derive(Clone)]
pub struct Host {
    pub system: Arc<dyn SystemInfoProvider>,
    pub integrations: Arc<dyn IntegrationCatalog>,
    pub states: Arc<dyn StateRegistry>,
    pub users: Arc<dyn UserRegistry>,
}

impl Host {
    /// Use one object for every collaborator
    pub fn from_shared<T>(host: Arc<T>) -> Self
    where
        T: SystemInfoProvider + IntegrationCatalog + StateRegistry + UserRegistry + 'static,
    {
        Self {
            system: host.clone(),
            integrations: host.clone(),
            states: host.clone(),
            users: host,
        }
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_entry_tagged_json() {
        let entry: CatalogEntry =
            serde_json::from_str(r#"{"status": "loaded", "domain": "hue", "is_built_in": true}"#)
                .unwrap();
        assert_eq!(
            entry,
            CatalogEntry::Loaded(Integration {
                domain: "hue".to_string(),
                is_built_in: true,
            })
        );

        let pending: CatalogEntry = serde_json::from_str(r#"{"status": "loading"}"#).unwrap();
        assert_eq!(pending, CatalogEntry::Loading);
    }

    #[test]
    fn test_user_defaults() {
        let user: User = serde_json::from_str(r#"{"id": "u1"}"#).unwrap();
        assert!(!user.is_system_generated);
        assert!(user.is_active);
    }
}
