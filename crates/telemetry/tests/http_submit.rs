//! End-to-end submission over real HTTP
//!
//! Runs the reporter with `HttpTransport` against a local axum server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::Value;
use tokio::net::TcpListener;

use hass_telemetry::test_utils::example_host;
use hass_telemetry::{
    AnalyticsReporter, Collector, Host, HttpTransport, MemoryStore, PreferenceStore,
    ReporterConfig, ReportingCategory, SubmitOutcome,
};

#[derive(Clone, Default)]
struct Received {
    bodies: Arc<Mutex<Vec<Value>>>,
    user_agents: Arc<Mutex<Vec<String>>>,
}

async fn accept(
    State(received): State<Received>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    received.user_agents.lock().unwrap().push(agent);
    received.bodies.lock().unwrap().push(body);
    StatusCode::OK
}

async fn reject() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

async fn stall() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(10)).await;
    StatusCode::OK
}

async fn start_server(received: Received) -> String {
    let app = Router::new()
        .route("/", post(accept))
        .route("/reject", post(reject))
        .route("/stall", post(stall))
        .with_state(received);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("failed to get addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}", addr)
}

async fn reporter(endpoint: String, timeout: Duration) -> AnalyticsReporter {
    let reporter = AnalyticsReporter::new(
        ReporterConfig {
            endpoint,
            timeout,
            ..Default::default()
        },
        PreferenceStore::new(Arc::new(MemoryStore::new())),
        Collector::new(
            "0123456789abcdef0123456789abcdef",
            "2021.4.0",
            Host::from_shared(Arc::new(example_host())),
        ),
        Arc::new(HttpTransport::new("2021.4.0")),
    );

    reporter
        .save_preferences(
            [
                ReportingCategory::Base,
                ReportingCategory::Integrations,
                ReportingCategory::Statistics,
            ]
            .into_iter()
            .collect(),
        )
        .await
        .expect("memory store never fails");
    reporter
}

#[tokio::test]
async fn test_submit_posts_json_body() {
    let received = Received::default();
    let base = start_server(received.clone()).await;
    let reporter = reporter(format!("{}/", base), Duration::from_secs(30)).await;

    let outcome = reporter.submit().await;
    assert_eq!(outcome, SubmitOutcome::Submitted);

    let bodies = received.bodies.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert_eq!(body["huuid"], "0123456789abcdef0123456789abcdef");
    assert_eq!(body["version"], "2021.4.0");
    assert_eq!(body["installation_type"], "Home Assistant OS");
    assert_eq!(body["components"], serde_json::json!(["hue", "mqtt", "sonos"]));
    assert_eq!(body["custom_integrations"], true);
    assert_eq!(body["state_count"], 5);
    assert_eq!(body["automation_count"], 2);
    assert_eq!(body["integration_count"], 3);
    assert_eq!(body["user_count"], 3);
    assert_eq!(body.as_object().map(|o| o.len()), Some(9));

    let agents = received.user_agents.lock().unwrap().clone();
    assert_eq!(agents, vec!["hass/2021.4.0".to_string()]);
}

#[tokio::test]
async fn test_non_200_is_rejected() {
    let base = start_server(Received::default()).await;
    let reporter = reporter(format!("{}/reject", base), Duration::from_secs(30)).await;

    assert_eq!(
        reporter.submit().await,
        SubmitOutcome::Rejected { status: 503 }
    );
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let base = start_server(Received::default()).await;
    let reporter = reporter(format!("{}/stall", base), Duration::from_millis(200)).await;

    let started = std::time::Instant::now();
    let outcome = reporter.submit().await;

    assert_eq!(outcome, SubmitOutcome::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_connection_refused_is_contained() {
    // Reserve a port, then close it so nothing is listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let reporter = reporter(format!("http://{}/", addr), Duration::from_secs(30)).await;

    assert!(matches!(reporter.submit().await, SubmitOutcome::Failed(_)));
}
