//! Integration catalog summary.

use crate::host::{CatalogEntry, IntegrationCatalog};

/// What the payload needs to know about loaded integrations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrationSummary {
    /// Identifiers of built-in integrations, in registry order
    pub built_in: Vec<String>,

    /// Number of loaded user-installed integrations
    pub custom_count: usize,
}

impl IntegrationSummary {
    /// At least one user-installed integration is loaded
    pub fn has_custom(&self) -> bool {
        self.custom_count > 0
    }
}

/// Walk the registry once and split loaded integrations.
///
/// Slots that are not loaded integration records are skipped. Custom
/// integration identifiers are never collected.
pub fn list_integrations(catalog: &dyn IntegrationCatalog) -> IntegrationSummary {
    let mut summary = IntegrationSummary::default();

    for (_, entry) in catalog.entries() {
        let CatalogEntry::Loaded(integration) = entry else {
            continue;
        };
        if integration.is_built_in {
            summary.built_in.push(integration.domain);
        } else {
            summary.custom_count += 1;
        }
    }

    summary
}
