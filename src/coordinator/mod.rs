use crate::common::api_client::{ApiClientError, Endpoint, WizarrClient};
use crate::models::{IngestError, RawPayloads, Snapshot};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("API error: {0}")]
    Api(#[from] ApiClientError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// Returned to a caller that coalesced onto a refresh which failed.
    #[error("refresh failed; previous snapshot retained")]
    Unavailable,
}

/// What subscribers are told after each refresh cycle.
#[derive(Clone)]
pub enum RefreshUpdate {
    Refreshed(Arc<Snapshot>),
    Unavailable,
}

type Subscriber = Box<dyn Fn(&RefreshUpdate) + Send + Sync>;

#[derive(Default)]
struct SharedState {
    snapshot: Option<Arc<Snapshot>>,
    last_refresh_ok: bool,
}

/// Owns the refresh cycle: fetches the six endpoints, swaps in the new
/// snapshot atomically, and notifies subscribers. One coordinator lives per
/// bridge instance.
pub struct Coordinator {
    client: WizarrClient,
    interval: Duration,
    state: RwLock<SharedState>,
    refresh_gate: Mutex<()>,
    generation: AtomicU64,
    subscribers: RwLock<Vec<Subscriber>>,
}

impl Coordinator {
    #[must_use]
    pub fn new(client: WizarrClient, interval: Duration) -> Self {
        Self {
            client,
            interval,
            state: RwLock::new(SharedState::default()),
            refresh_gate: Mutex::new(()),
            generation: AtomicU64::new(0),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Latest successful snapshot, if any. Reading is a single `Arc` clone.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.state
            .read()
            .expect("coordinator state lock poisoned")
            .snapshot
            .clone()
    }

    /// Whether the most recent refresh cycle succeeded. When false, the
    /// snapshot (if present) is stale and dependents should report
    /// themselves unavailable.
    #[must_use]
    pub fn last_refresh_ok(&self) -> bool {
        self.state
            .read()
            .expect("coordinator state lock poisoned")
            .last_refresh_ok
    }

    /// Bumped once per completed refresh cycle, success or failure.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Register a callback invoked synchronously after every refresh cycle.
    pub fn subscribe(&self, subscriber: impl Fn(&RefreshUpdate) + Send + Sync + 'static) {
        self.subscribers
            .write()
            .expect("coordinator subscriber lock poisoned")
            .push(Box::new(subscriber));
    }

    /// Refresh now. Callers that arrive while a refresh is in flight wait for
    /// it and reuse its outcome instead of issuing their own network calls.
    ///
    /// # Errors
    /// * If any endpoint fetch fails; the previous snapshot is retained.
    /// * If a payload doesn't match its endpoint's shape.
    /// * [`RefreshError::Unavailable`] when a coalesced-onto refresh failed.
    pub async fn refresh(&self) -> Result<(), RefreshError> {
        let observed = self.generation();
        let _gate = self.refresh_gate.lock().await;
        if self.generation() != observed {
            // A whole cycle completed while we waited for the gate.
            return if self.last_refresh_ok() {
                Ok(())
            } else {
                Err(RefreshError::Unavailable)
            };
        }

        match self.fetch_all().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                {
                    let mut state = self.state.write().expect("coordinator state lock poisoned");
                    state.snapshot = Some(snapshot.clone());
                    state.last_refresh_ok = true;
                }
                self.generation.fetch_add(1, Ordering::AcqRel);
                debug!(generation = self.generation(), "snapshot refreshed");
                self.notify(&RefreshUpdate::Refreshed(snapshot));
                Ok(())
            }
            Err(err) => {
                {
                    let mut state = self.state.write().expect("coordinator state lock poisoned");
                    state.last_refresh_ok = false;
                }
                self.generation.fetch_add(1, Ordering::AcqRel);
                warn!(error = %err, "refresh failed; keeping previous snapshot");
                self.notify(&RefreshUpdate::Unavailable);
                Err(err)
            }
        }
    }

    async fn fetch_all(&self) -> Result<Snapshot, RefreshError> {
        let mut payloads = RawPayloads::default();
        for endpoint in Endpoint::ALL {
            debug!(endpoint = %endpoint, "fetching");
            let payload = self.client.get(endpoint).await?;
            payloads.set(endpoint, payload);
        }
        Ok(Snapshot::ingest(payloads)?)
    }

    fn notify(&self, update: &RefreshUpdate) {
        let subscribers = self
            .subscribers
            .read()
            .expect("coordinator subscriber lock poisoned");
        for subscriber in subscribers.iter() {
            subscriber(update);
        }
    }

    /// Timer loop driving periodic refreshes until cancelled. The caller is
    /// expected to have run the first refresh already; the immediate first
    /// tick is swallowed for that reason.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    // refresh() already logs failures; polling carries on
                    // with the stale snapshot either way.
                    let _ = self.refresh().await;
                }
            }
        }
        info!("polling stopped");
    }
}
