//! Test doubles for the reporter's collaborators
//!
//! `ScriptedTransport` replays canned responses and records every payload
//! it was asked to send. `CountingHost` wraps a [`HostSnapshot`] and counts
//! how often each collaborator is queried.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::TransportError;
use crate::host::{
    CatalogEntry, Host, HostSnapshot, IntegrationCatalog, StateRegistry, SystemInfo,
    SystemInfoProvider, User, UserRegistry,
};
use crate::payload::AnalyticsPayload;
use crate::transport::Transport;

/// What a [`ScriptedTransport`] does for one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with this HTTP status
    Status(u16),
    /// Never respond (sleeps far past any sane deadline)
    Hang,
    /// Fail with a connection error
    ConnectError(String),
    /// Fail with a client-side timeout
    ClientTimeout,
}

/// Transport that replays scripted replies.
///
/// Once the script runs out every request gets the fallback reply.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    sent: Mutex<Vec<(String, AnalyticsPayload)>>,
}

impl ScriptedTransport {
    /// Always reply with `reply`
    pub fn always(reply: Reply) -> Arc<Self> {
        Self::scripted(Vec::new(), reply)
    }

    pub fn scripted(replies: Vec<Reply>, fallback: Reply) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(replies.into()),
            fallback,
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Number of requests made
    pub fn calls(&self) -> usize {
        self.sent.lock().len()
    }

    /// Payloads sent, in order
    pub fn payloads(&self) -> Vec<AnalyticsPayload> {
        self.sent.lock().iter().map(|(_, p)| p.clone()).collect()
    }

    /// URLs posted to, in order
    pub fn urls(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(u, _)| u.clone()).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(
        &self,
        url: &str,
        payload: &AnalyticsPayload,
    ) -> Result<u16, TransportError> {
        self.sent.lock().push((url.to_string(), payload.clone()));
        let reply = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            Reply::Status(status) => Ok(status),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Ok(200)
            }
            Reply::ConnectError(detail) => Err(TransportError::Connect(detail)),
            Reply::ClientTimeout => Err(TransportError::Timeout),
        }
    }
}

/// Host that counts queries per collaborator.
#[derive(Debug)]
pub struct CountingHost {
    inner: HostSnapshot,
    pub system_calls: AtomicUsize,
    pub catalog_calls: AtomicUsize,
    pub state_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
}

impl CountingHost {
    pub fn new(inner: HostSnapshot) -> Arc<Self> {
        Arc::new(Self {
            inner,
            system_calls: AtomicUsize::new(0),
            catalog_calls: AtomicUsize::new(0),
            state_calls: AtomicUsize::new(0),
            user_calls: AtomicUsize::new(0),
        })
    }

    /// Total queries across all collaborators
    pub fn total_calls(&self) -> usize {
        self.system_calls.load(Ordering::SeqCst)
            + self.catalog_calls.load(Ordering::SeqCst)
            + self.state_calls.load(Ordering::SeqCst)
            + self.user_calls.load(Ordering::SeqCst)
    }

    pub fn host(self: &Arc<Self>) -> Host {
        Host::from_shared(self.clone())
    }
}

#[async_trait]
impl SystemInfoProvider for CountingHost {
    async fn system_info(&self) -> SystemInfo {
        self.system_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.system_info().await
    }
}

impl IntegrationCatalog for CountingHost {
    fn entries(&self) -> Vec<(String, CatalogEntry)> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.entries()
    }
}

impl StateRegistry for CountingHost {
    fn count_states(&self, domain: Option<&str>) -> usize {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.count_states(domain)
    }
}

#[async_trait]
impl UserRegistry for CountingHost {
    async fn users(&self) -> Vec<User> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.users().await
    }
}

/// A small OS installation: 5 states (2 automations), 3 built-in
/// integrations plus 1 custom, 4 users (1 system-generated).
pub fn example_host() -> HostSnapshot {
    HostSnapshot::new("Home Assistant OS")
        .with_integration("hue", true)
        .with_integration("mqtt", true)
        .with_integration("sonos", true)
        .with_integration("hacs", false)
        .with_state("light.kitchen")
        .with_state("light.hall")
        .with_state("sensor.temperature")
        .with_state("automation.wake_up")
        .with_state("automation.lights_off")
        .with_user("owner", false)
        .with_user("partner", false)
        .with_user("guest", false)
        .with_user("supervisor", true)
}
