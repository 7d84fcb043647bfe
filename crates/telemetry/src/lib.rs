//! Hass analytics - opt-in, transparent, fire-and-forget installation analytics.
//!
//! This crate reports a small snapshot of an installation to the collection
//! endpoint. Key principles:
//!
//! - **Opt-in**: nothing is sent unless the user enabled the `base` category
//! - **Transparent**: every successful submission logs exactly what was sent
//! - **Non-blocking**: a single bounded request; failures become log lines
//! - **Anonymous**: the installation id is an opaque host-generated value
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ PreferenceStore │────▶│  Collector   │────▶│   Reporter   │
//! │ (consent set)   │     │  (payload)   │     │ (HTTP POST)  │
//! └─────────────────┘     └──────────────┘     └──────────────┘
//!         │                      │                     │
//!         │ Persists to:         │ Reads from:         │ Sends to:
//!         │ - .storage/          │ - SystemInfo        │ - updater endpoint
//!         │   core.analytics     │ - IntegrationCatalog│   (30s timeout)
//!         │                      │ - StateRegistry     │
//!         ▼                      │ - UserRegistry      ▼
//! ┌─────────────────┐            ▼              ┌──────────────┐
//! │   RecordStore   │                           │  Scheduler   │
//! │ (json envelope) │                           │   (daily)    │
//! └─────────────────┘                           └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hass_telemetry::{
//!     AnalyticsReporter, Collector, Host, HostSnapshot, HttpTransport, JsonFileStore,
//!     PreferenceStore, ReporterConfig, scheduler,
//! };
//!
//! # async fn example() {
//! let store = Arc::new(JsonFileStore::new(".storage"));
//! let host = Host::from_shared(Arc::new(HostSnapshot::new("Home Assistant Core")));
//! let collector = Collector::new("0123456789abcdef0123456789abcdef", "2021.4.0", host);
//!
//! let config = ReporterConfig::default();
//! let interval = config.interval;
//! let reporter = Arc::new(AnalyticsReporter::new(
//!     config,
//!     PreferenceStore::new(store),
//!     collector,
//!     Arc::new(HttpTransport::new("2021.4.0")),
//! ));
//! reporter.load_preferences().await;
//!
//! // Submits now, then once per day
//! let handle = scheduler::spawn(reporter, interval);
//! let _ = handle.submit_now();
//! # }
//! ```

pub mod collector;
pub mod endpoint;
pub mod error;
pub mod host;
pub mod integrations;
pub mod payload;
pub mod preferences;
pub mod reporter;
pub mod scheduler;
pub mod store;
pub mod test_utils;
pub mod transport;

#[cfg(test)]
mod scheduler_test;

pub use collector::Collector;
pub use error::{AnalyticsError, StorageError, TransportError};
pub use host::{
    CatalogEntry, DetectedSystemInfo, Host, HostSnapshot, Integration, IntegrationCatalog,
    StateRegistry, SystemInfo, SystemInfoProvider, User, UserRegistry,
};
pub use integrations::{IntegrationSummary, list_integrations};
pub use payload::AnalyticsPayload;
pub use preferences::{PreferenceSet, ReportingCategory};
pub use reporter::{AnalyticsReporter, ReporterConfig, SubmitOutcome};
pub use scheduler::{Scheduler, SchedulerHandle};
pub use store::{JsonFileStore, MemoryStore, PreferenceStore, RecordStore};
pub use transport::{HttpTransport, Transport};
