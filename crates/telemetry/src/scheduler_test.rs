//! Tests for the analytics Scheduler

use std::sync::Arc;
use std::time::Duration;

use crate::collector::Collector;
use crate::error::AnalyticsError;
use crate::preferences::ReportingCategory::*;
use crate::reporter::{AnalyticsReporter, ReporterConfig};
use crate::scheduler::Scheduler;
use crate::store::{MemoryStore, PreferenceStore};
use crate::test_utils::{CountingHost, Reply, ScriptedTransport, example_host};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

async fn reporter(transport: Arc<ScriptedTransport>) -> Arc<AnalyticsReporter> {
    let reporter = AnalyticsReporter::new(
        ReporterConfig::default(),
        PreferenceStore::new(Arc::new(MemoryStore::new())),
        Collector::new("abc123", "2021.4.0", CountingHost::new(example_host()).host()),
        transport,
    );
    reporter
        .save_preferences([Base].into_iter().collect())
        .await
        .unwrap();
    Arc::new(reporter)
}

#[tokio::test]
async fn test_submits_on_start_then_on_demand() {
    let transport = ScriptedTransport::always(Reply::Status(200));
    let (scheduler, handle) = Scheduler::new(reporter(transport.clone()).await, DAY);

    handle.submit_now().unwrap();
    handle.shutdown().unwrap();

    tokio::time::timeout(Duration::from_secs(5), scheduler.run())
        .await
        .expect("scheduler should stop on shutdown");

    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_startup_submission_precedes_queued_shutdown() {
    let transport = ScriptedTransport::always(Reply::Status(200));
    let (scheduler, handle) = Scheduler::new(reporter(transport.clone()).await, DAY);

    handle.shutdown().unwrap();

    tokio::time::timeout(Duration::from_secs(5), scheduler.run())
        .await
        .expect("scheduler should stop on shutdown");

    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_submits_once_per_interval() {
    let transport = ScriptedTransport::always(Reply::Status(200));
    let handle = crate::scheduler::spawn(reporter(transport.clone()).await, DAY);

    // Startup submission
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(transport.calls(), 1);

    tokio::time::sleep(DAY).await;
    assert_eq!(transport.calls(), 2);

    tokio::time::sleep(DAY).await;
    assert_eq!(transport.calls(), 3);

    handle.shutdown().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_failed_submission_waits_for_next_tick() {
    let transport = ScriptedTransport::scripted(vec![Reply::Status(500)], Reply::Status(200));
    let handle = crate::scheduler::spawn(reporter(transport.clone()).await, DAY);

    tokio::time::sleep(Duration::from_secs(60 * 60)).await;
    assert_eq!(transport.calls(), 1);

    tokio::time::sleep(DAY).await;
    assert_eq!(transport.calls(), 2);

    handle.shutdown().unwrap();
}

#[tokio::test]
async fn test_stops_when_handles_dropped() {
    let transport = ScriptedTransport::always(Reply::Status(200));
    let (scheduler, handle) = Scheduler::new(reporter(transport).await, DAY);
    drop(handle);

    tokio::time::timeout(Duration::from_secs(5), scheduler.run())
        .await
        .expect("scheduler should stop when every handle is dropped");
}

#[tokio::test]
async fn test_handle_never_blocks() {
    let transport = ScriptedTransport::always(Reply::Status(200));
    let (_scheduler, handle) = Scheduler::new(reporter(transport).await, DAY);

    // Scheduler not running, so the channel fills up
    let mut results = Vec::new();
    for _ in 0..32 {
        results.push(handle.submit_now());
    }

    assert!(results.iter().any(|r| r.is_ok()));
    assert!(matches!(results.last(), Some(Err(AnalyticsError::ChannelFull))));
}
