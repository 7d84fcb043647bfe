//! Host-side wiring for the analytics reporter.
//!
//! The reporter consumes collaborators; this module supplies them for the
//! CLI: the real machine's system info, an inventory snapshot for
//! integrations, states and users, the installation id, and file-backed
//! record storage.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, info};

use hass_config::AnalyticsConfig;
use hass_telemetry::{
    AnalyticsReporter, Collector, DetectedSystemInfo, Host, HostSnapshot, HttpTransport,
    JsonFileStore, PreferenceStore, RecordStore, ReporterConfig, StorageError,
};

/// Record key of the installation id
pub const UUID_STORAGE_KEY: &str = "core.uuid";

const UUID_STORAGE_VERSION: u32 = 1;

/// Platform version reported in payloads
pub const PLATFORM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load the installation id, generating and persisting one on first run.
///
/// The id is a random UUIDv4 in simple (32 hex chars) form. It is created
/// once and reused for every later submission.
pub async fn load_or_create_install_id(store: &dyn RecordStore) -> Result<String, StorageError> {
    let existing = match store.load(UUID_STORAGE_KEY, UUID_STORAGE_VERSION).await {
        Ok(data) => data,
        Err(StorageError::Decode { .. }) => None,
        Err(e) => return Err(e),
    };

    if let Some(id) = existing
        .as_ref()
        .and_then(|d| d.get("uuid"))
        .and_then(|v| v.as_str())
        .filter(|id| is_valid_install_id(id))
    {
        return Ok(id.to_string());
    }

    let id = uuid::Uuid::new_v4().simple().to_string();
    store
        .save(UUID_STORAGE_KEY, UUID_STORAGE_VERSION, json!({ "uuid": id }))
        .await?;
    info!("Generated new installation id");
    Ok(id)
}

fn is_valid_install_id(id: &str) -> bool {
    id.len() == 32 && id.chars().all(|c| c.is_ascii_hexdigit())
}

/// Read the inventory document, or an empty installation if none is configured.
pub fn load_inventory(path: Option<&Path>) -> Result<HostSnapshot> {
    let Some(path) = path else {
        debug!("No inventory configured, reporting an empty installation");
        return Ok(HostSnapshot::new(String::new()));
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read inventory '{}'", path.display()))?;
    HostSnapshot::from_json(&contents)
        .with_context(|| format!("failed to parse inventory '{}'", path.display()))
}

/// Collaborators for this machine: detected system info plus the inventory.
pub fn build_host(inventory: HostSnapshot) -> Host {
    let inventory = Arc::new(inventory);
    Host {
        system: Arc::new(DetectedSystemInfo::detect()),
        integrations: inventory.clone(),
        states: inventory.clone(),
        users: inventory,
    }
}

/// Reporter settings; without an override the built-in endpoint is used.
pub fn reporter_config(config: &AnalyticsConfig) -> ReporterConfig {
    let defaults = ReporterConfig::default();
    ReporterConfig {
        endpoint: config.endpoint.clone().unwrap_or(defaults.endpoint),
        timeout: config.timeout,
        interval: config.interval,
    }
}

/// Build a reporter from configuration and load the stored preferences.
pub async fn build_reporter(config: &AnalyticsConfig) -> Result<Arc<AnalyticsReporter>> {
    let store: Arc<dyn RecordStore> = Arc::new(JsonFileStore::new(&config.storage_dir));

    let install_id = load_or_create_install_id(store.as_ref())
        .await
        .context("failed to load installation id")?;
    let inventory = load_inventory(config.inventory.as_deref())?;

    let collector = Collector::new(install_id, PLATFORM_VERSION, build_host(inventory));
    let reporter = AnalyticsReporter::new(
        reporter_config(config),
        PreferenceStore::new(store),
        collector,
        Arc::new(HttpTransport::new(PLATFORM_VERSION)),
    );
    reporter.load_preferences().await;

    Ok(Arc::new(reporter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hass_telemetry::MemoryStore;
    use hass_telemetry::endpoint::ANALYTICS_ENDPOINT_URL;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_install_id_generated_once() {
        let store = MemoryStore::new();

        let first = load_or_create_install_id(&store).await.unwrap();
        let second = load_or_create_install_id(&store).await.unwrap();

        assert_eq!(first, second);
        assert!(is_valid_install_id(&first));
    }

    #[tokio::test]
    async fn test_install_id_reused_from_storage() {
        let store = MemoryStore::new();
        let id = "aa96d5506919a7a9f2b7ebe70b7e9c5e";
        store.insert(UUID_STORAGE_KEY, 1, json!({ "uuid": id }));

        assert_eq!(load_or_create_install_id(&store).await.unwrap(), id);
    }

    #[tokio::test]
    async fn test_invalid_install_id_replaced() {
        let store = MemoryStore::new();
        store.insert(UUID_STORAGE_KEY, 1, json!({ "uuid": "not-an-id" }));

        let id = load_or_create_install_id(&store).await.unwrap();
        assert_ne!(id, "not-an-id");
        assert_eq!(store.get(UUID_STORAGE_KEY), Some(json!({ "uuid": id })));
    }

    #[tokio::test]
    async fn test_install_id_save_failure_propagates() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);

        assert!(load_or_create_install_id(&store).await.is_err());
    }

    #[test]
    fn test_load_inventory_none_is_empty() {
        let inventory = load_inventory(None).unwrap();
        assert!(inventory.integrations.is_empty());
        assert!(inventory.states.is_empty());
    }

    #[test]
    fn test_load_inventory_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.json");
        std::fs::write(
            &path,
            r#"{"system": {"installation_type": "Home Assistant Core"}, "states": ["light.a"]}"#,
        )
        .unwrap();

        let inventory = load_inventory(Some(&path)).unwrap();
        assert_eq!(inventory.states, vec!["light.a"]);
    }

    #[test]
    fn test_load_inventory_missing_file() {
        let err = load_inventory(Some(Path::new("/no/such/inventory.json"))).unwrap_err();
        assert!(err.to_string().contains("inventory"));
    }

    #[test]
    fn test_reporter_config_endpoint_fallback() {
        let config = AnalyticsConfig::default();
        assert_eq!(reporter_config(&config).endpoint, ANALYTICS_ENDPOINT_URL);

        let config = AnalyticsConfig {
            endpoint: Some("http://127.0.0.1:8123/collect".to_string()),
            timeout: std::time::Duration::from_secs(5),
            ..Default::default()
        };
        let settings = reporter_config(&config);
        assert_eq!(settings.endpoint, "http://127.0.0.1:8123/collect");
        assert_eq!(settings.timeout, std::time::Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_build_reporter_loads_preferences() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        store
            .save("core.analytics", 1, json!(["base", "statistics"]))
            .await
            .unwrap();

        let config = AnalyticsConfig {
            storage_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let reporter = build_reporter(&config).await.unwrap();

        assert!(reporter.preferences().await.allows_submission());
        let payload = reporter.preview().await.unwrap();
        assert_eq!(payload.version, PLATFORM_VERSION);
        assert_eq!(payload.state_count, Some(0));
        assert!(store.path_for(UUID_STORAGE_KEY).exists());
    }
}
