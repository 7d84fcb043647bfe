//! Daily submission loop.
//!
//! The scheduler runs in a dedicated task and calls
//! [`AnalyticsReporter::submit`] once at startup, before any command is
//! read, and then on every interval tick. Submissions run one at a time; a tick that falls due while one is
//! in flight is skipped. Commands use a bounded channel with `try_send` so
//! callers never wait.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::AnalyticsError;
use crate::reporter::AnalyticsReporter;

/// Channel buffer size - commands are rare
const CHANNEL_BUFFER: usize = 8;

/// Handle for controlling a running scheduler.
///
/// Cheap to clone. Dropping every handle stops the loop.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<SchedulerCommand>,
}

impl SchedulerHandle {
    /// Request a submission outside the schedule (non-blocking).
    pub fn submit_now(&self) -> Result<(), AnalyticsError> {
        self.tx
            .try_send(SchedulerCommand::SubmitNow)
            .map_err(|_| AnalyticsError::ChannelFull)
    }

    /// Stop the scheduler after the current submission.
    pub fn shutdown(&self) -> Result<(), AnalyticsError> {
        self.tx
            .try_send(SchedulerCommand::Shutdown)
            .map_err(|_| AnalyticsError::ChannelFull)
    }
}

/// Commands sent to the scheduler task.
enum SchedulerCommand {
    SubmitNow,
    Shutdown,
}

/// Periodic driver for an [`AnalyticsReporter`].
pub struct Scheduler {
    reporter: Arc<AnalyticsReporter>,
    interval: Duration,
    rx: mpsc::Receiver<SchedulerCommand>,
}

impl Scheduler {
    /// Create a scheduler and its handle.
    ///
    /// The scheduler must be driven with `run()`.
    pub fn new(reporter: Arc<AnalyticsReporter>, interval: Duration) -> (Self, SchedulerHandle) {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER);

        let scheduler = Self {
            reporter,
            interval,
            rx,
        };

        (scheduler, SchedulerHandle { tx })
    }

    /// Run the submission loop until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        debug!(
            endpoint = %self.reporter.config().endpoint,
            interval_secs = self.interval.as_secs(),
            "Analytics scheduler started"
        );

        // tokio panics on a zero period
        let period = self.interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // First tick completes immediately; queued commands wait behind it
        interval.tick().await;
        self.reporter.submit().await;

        loop {
            tokio::select! {
                biased;

                _ = interval.tick() => {
                    trace!("Scheduled analytics submission");
                    self.reporter.submit().await;
                }
                cmd = self.rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::SubmitNow) => {
                            self.reporter.submit().await;
                        }
                        Some(SchedulerCommand::Shutdown) | None => {
                            debug!("Analytics scheduler shutting down");
                            break;
                        }
                    }
                }
            }
        }
    }
}

/// Spawn the scheduler as a background task.
pub fn spawn(reporter: Arc<AnalyticsReporter>, interval: Duration) -> SchedulerHandle {
    let (scheduler, handle) = Scheduler::new(reporter, interval);
    tokio::spawn(scheduler.run());
    handle
}
