// ── Update coordinator ──
//
// Owns the REST client for one connection and keeps a snapshot of every
// remote entity fresh. A single background task polls on a fixed interval;
// each successful fetch replaces the published snapshot wholesale, and
// each failure leaves the previous snapshot in place and emits a signal.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hassmirror_api::RestClient;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, info, info_span, warn};

use crate::config::ConnectionConfig;
use crate::error::CoreError;
use crate::model::Snapshot;
use crate::source::PollingSource;
use crate::stream::SnapshotStream;

const FAILURE_CHANNEL_CAPACITY: usize = 16;

// ── Signals ──────────────────────────────────────────────────────────

/// Which remedy a failed refresh calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credentials were rejected. Polling halts until reconfigured.
    AuthFailed,
    /// Any other failure. Polling continues on the next tick.
    UpdateFailed,
}

impl From<&CoreError> for FailureKind {
    fn from(err: &CoreError) -> Self {
        if err.is_auth() {
            Self::AuthFailed
        } else {
            Self::UpdateFailed
        }
    }
}

/// Emitted on every failed refresh.
#[derive(Debug, Clone)]
pub struct UpdateFailure {
    pub kind: FailureKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Observable coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Not polling (never started, or stopped).
    Stopped,
    /// Last refresh succeeded.
    Idle,
    /// Last refresh failed; the published snapshot is stale.
    UpdateFailed { kind: FailureKind },
}

/// Result of a refresh request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot was published.
    Updated,
    /// Another refresh was already in flight; this request was dropped.
    Skipped,
}

// ── Coordinator ──────────────────────────────────────────────────────

/// Polls one remote hub and publishes entity snapshots.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    client: RestClient,
    poll_interval: Duration,
    span: Span,
    snapshot: watch::Sender<Arc<Snapshot>>,
    state: watch::Sender<PollState>,
    failures: broadcast::Sender<UpdateFailure>,
    /// Held for the duration of one fetch; `try_lock` gives single-flight.
    in_flight: Mutex<()>,
    /// Child token for the current polling task; replaced on each start.
    cancel: Mutex<CancellationToken>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("client", &self.inner.client)
            .field("poll_interval", &self.inner.poll_interval)
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    /// Create a coordinator around an existing client.
    ///
    /// Every log line from this coordinator and its polling task is
    /// emitted inside `span`, so embedders decide where it lands.
    pub fn new(client: RestClient, poll_interval: Duration, span: Span) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::empty()));
        let (state, _) = watch::channel(PollState::Stopped);
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(CoordinatorInner {
                client,
                poll_interval,
                span,
                snapshot,
                state,
                failures,
                in_flight: Mutex::new(()),
                cancel: Mutex::new(CancellationToken::new()),
                task: Mutex::new(None),
            }),
        }
    }

    /// Build the client from `config` and tag logs with the connection id.
    pub fn from_config(config: &ConnectionConfig) -> Result<Self, CoreError> {
        let client = config.build_client()?;
        let span = info_span!("coordinator", connection = %config.id);
        Ok(Self::new(client, config.poll_interval, span))
    }

    pub fn client(&self) -> &RestClient {
        &self.inner.client
    }

    pub fn poll_interval(&self) -> Duration {
        self.inner.poll_interval
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run the first refresh, then spawn the polling task.
    ///
    /// A failed first refresh is returned and no task is spawned. A
    /// [`stop`](Self::stop) issued while the first refresh is in flight
    /// interrupts it and `start` returns [`CoreError::Cancelled`].
    pub async fn start(&self) -> Result<(), CoreError> {
        let mut task = self.inner.task.lock().await;
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return Err(CoreError::AlreadyRunning);
        }

        // Installed before the first refresh so a concurrent stop reaches it.
        let cancel = CancellationToken::new();
        *self.inner.cancel.lock().await = cancel.clone();

        info!(parent: &self.inner.span, url = %self.inner.client.base_url(), "first refresh");
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(parent: &self.inner.span, "stopped during first refresh");
                return Err(CoreError::Cancelled);
            }
            result = self.refresh() => { result?; }
        }

        let interval = self.inner.poll_interval;
        let handle = tokio::spawn(
            refresh_task(self.clone(), interval, cancel).instrument(self.inner.span.clone()),
        );
        *task = Some(handle);

        info!(
            parent: &self.inner.span,
            interval_secs = interval.as_secs(),
            "polling started"
        );
        Ok(())
    }

    /// Cancel the polling task (including an in-flight fetch, or a first
    /// refresh still running inside [`start`](Self::start)) and wait for it
    /// to exit. The last snapshot stays readable.
    pub async fn stop(&self) {
        self.inner.cancel.lock().await.cancel();

        let handle = {
            let mut task = self.inner.task.lock().await;
            // A start that won the task lock may have installed a fresh token.
            self.inner.cancel.lock().await.cancel();
            task.take()
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(parent: &self.inner.span, error = %e, "polling task panicked");
            }
        }

        self.inner.state.send_replace(PollState::Stopped);
        info!(parent: &self.inner.span, "polling stopped");
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Fetch all remote entities and publish them as the new snapshot.
    ///
    /// If a refresh is already in flight this returns `Skipped` without
    /// issuing a request. On failure the previous snapshot is kept, the
    /// state moves to `UpdateFailed`, and an [`UpdateFailure`] is broadcast.
    pub async fn refresh(&self) -> Result<RefreshOutcome, CoreError> {
        self.refresh_inner()
            .instrument(self.inner.span.clone())
            .await
    }

    async fn refresh_inner(&self) -> Result<RefreshOutcome, CoreError> {
        let Ok(_guard) = self.inner.in_flight.try_lock() else {
            debug!("refresh already in flight, skipping");
            return Ok(RefreshOutcome::Skipped);
        };

        match self.inner.client.get_all_states().await {
            Ok(entities) => {
                let snapshot = Arc::new(Snapshot::new(entities));
                debug!(entities = snapshot.len(), "snapshot updated");
                self.inner.snapshot.send_replace(snapshot);
                self.inner.state.send_replace(PollState::Idle);
                Ok(RefreshOutcome::Updated)
            }
            Err(e) => {
                let err = CoreError::from(e);
                let kind = FailureKind::from(&err);
                self.inner.state.send_replace(PollState::UpdateFailed { kind });
                // No subscribers is fine.
                let _ = self.inner.failures.send(UpdateFailure {
                    kind,
                    message: err.to_string(),
                    at: Utc::now(),
                });
                Err(err)
            }
        }
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot.borrow().clone()
    }

    pub fn snapshots(&self) -> SnapshotStream {
        SnapshotStream::new(self.inner.snapshot.subscribe())
    }

    pub fn poll_state(&self) -> PollState {
        *self.inner.state.borrow()
    }

    /// Subscribe to poll-state changes.
    pub fn state(&self) -> watch::Receiver<PollState> {
        self.inner.state.subscribe()
    }

    pub fn failures(&self) -> broadcast::Receiver<UpdateFailure> {
        self.inner.failures.subscribe()
    }
}

impl PollingSource for Coordinator {
    fn start(&self) -> impl Future<Output = Result<(), CoreError>> + Send {
        Coordinator::start(self)
    }

    fn stop(&self) -> impl Future<Output = ()> + Send {
        Coordinator::stop(self)
    }

    fn current_snapshot(&self) -> Arc<Snapshot> {
        Coordinator::current_snapshot(self)
    }

    fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.snapshot.subscribe()
    }

    fn failures(&self) -> broadcast::Receiver<UpdateFailure> {
        Coordinator::failures(self)
    }
}

// ── Background task ──────────────────────────────────────────────────

/// Periodically refresh until cancelled or the credentials are rejected.
async fn refresh_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let result = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = coordinator.refresh() => result,
                };
                match result {
                    Ok(_) => {}
                    Err(e) if e.is_auth() => {
                        warn!(error = %e, "credentials rejected, polling halted until reconfigured");
                        break;
                    }
                    Err(e) => warn!(error = %e, "periodic refresh failed"),
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn coordinator() -> Coordinator {
        let cfg = ConnectionConfig::new(
            "t",
            "127.0.0.1:9",
            SecretString::from("x".to_owned()),
            false,
        );
        Coordinator::from_config(&cfg).unwrap()
    }

    #[tokio::test]
    async fn new_coordinator_is_stopped_with_empty_snapshot() {
        let c = coordinator();
        assert_eq!(c.poll_state(), PollState::Stopped);
        assert!(c.current_snapshot().is_empty());
        assert!(c.current_snapshot().fetched_at().is_none());
    }

    #[tokio::test]
    async fn stop_without_start_is_harmless() {
        let c = coordinator();
        c.stop().await;
        assert_eq!(c.poll_state(), PollState::Stopped);
    }

    #[tokio::test]
    async fn stop_survives_a_panicked_polling_task() {
        let c = coordinator();
        *c.inner.task.lock().await = Some(tokio::spawn(async { panic!("poll loop blew up") }));
        tokio::task::yield_now().await;

        c.stop().await;
        assert_eq!(c.poll_state(), PollState::Stopped);
        assert!(c.inner.task.lock().await.is_none());
    }

    #[test]
    fn failure_kind_follows_error_kind() {
        let auth = CoreError::AuthenticationFailed {
            message: "nope".into(),
        };
        let comm = CoreError::Timeout { url: "x".into() };
        assert_eq!(FailureKind::from(&auth), FailureKind::AuthFailed);
        assert_eq!(FailureKind::from(&comm), FailureKind::UpdateFailed);
    }
}
