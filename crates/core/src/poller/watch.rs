//! A single watch: the fetch loop for one brief and its subscriptions.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::stream::{self, Stream};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::record::{Record, RecordApi, RecordId};

use super::types::{PollError, PollerState, WatchSnapshot};

/// Settings for one watch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WatchSettings {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

/// Shared state of one watch.
///
/// The snapshot channel is the only place watch state lives. Every write goes
/// through `send_if_modified`, which refuses changes once the state is
/// terminal, so a fetch that completes after cancellation changes nothing.
pub(crate) struct Watch {
    record_id: RecordId,
    records: Arc<dyn RecordApi>,
    settings: WatchSettings,
    snapshot_tx: watch::Sender<WatchSnapshot>,
    shutdown_tx: broadcast::Sender<()>,
    subscribers: Mutex<usize>,
}

impl Watch {
    /// Create a watch with its first subscriber and start fetching.
    pub(crate) fn start(
        record_id: RecordId,
        records: Arc<dyn RecordApi>,
        settings: WatchSettings,
    ) -> (Arc<Self>, Subscription) {
        let (snapshot_tx, _) = watch::channel(WatchSnapshot::idle(record_id.clone()));
        let (shutdown_tx, _) = broadcast::channel(1);
        let watch = Arc::new(Self {
            record_id,
            records,
            settings,
            snapshot_tx,
            shutdown_tx,
            subscribers: Mutex::new(1),
        });

        watch.publish(|snapshot| snapshot.state = PollerState::Watching);
        // Subscribed before spawning so a halt can never be missed.
        let shutdown_rx = watch.shutdown_tx.subscribe();
        let runner = Arc::clone(&watch);
        tokio::spawn(async move { runner.run(shutdown_rx).await });

        let subscription = Subscription {
            watch: Arc::clone(&watch),
            receiver: watch.snapshot_tx.subscribe(),
        };
        (watch, subscription)
    }

    pub(crate) fn state(&self) -> PollerState {
        self.snapshot_tx.borrow().state
    }

    /// A settled watch nobody is subscribed to, kept only for replay.
    pub(crate) fn is_idle_settled(&self) -> bool {
        let count = self.subscribers();
        *count == 0 && self.state() == PollerState::Settled
    }

    fn subscribers(&self) -> MutexGuard<'_, usize> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Join the watch.
    ///
    /// Returns `None` when the watch was cancelled or timed out; a settled
    /// watch still accepts subscribers and replays its final record.
    pub(crate) fn subscribe(self: &Arc<Self>) -> Option<Subscription> {
        let mut count = self.subscribers();
        if matches!(
            self.state(),
            PollerState::Cancelled | PollerState::TimedOut
        ) {
            return None;
        }
        *count += 1;

        Some(Subscription {
            watch: Arc::clone(self),
            receiver: self.snapshot_tx.subscribe(),
        })
    }

    fn unsubscribe(&self) {
        let mut count = self.subscribers();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.halt();
        }
    }

    /// Stop fetching immediately. An in-flight fetch is dropped.
    pub(crate) fn halt(&self) {
        let cancelled = self.snapshot_tx.send_if_modified(|snapshot| {
            if snapshot.state.is_terminal() {
                return false;
            }
            snapshot.state = PollerState::Cancelled;
            true
        });
        if cancelled {
            debug!("Watch on brief {} cancelled", self.record_id);
        }
        let _ = self.shutdown_tx.send(());
    }

    /// Apply `update` unless the watch already reached a terminal state.
    fn publish(&self, update: impl FnOnce(&mut WatchSnapshot)) -> bool {
        self.snapshot_tx.send_if_modified(|snapshot| {
            if snapshot.state.is_terminal() {
                return false;
            }
            update(snapshot);
            true
        })
    }

    async fn run(self: Arc<Self>, mut shutdown_rx: broadcast::Receiver<()>) {
        debug!(
            "Watching brief {} every {:?}",
            self.record_id, self.settings.interval
        );
        let mut attempts: u32 = 0;

        loop {
            // A halt may land while the interval sleep is also ready.
            if self.state().is_terminal() {
                break;
            }
            let result = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                result = self.records.get(&self.record_id) => result,
            };
            attempts += 1;

            match result {
                Ok(record) => {
                    let status = record.status;
                    let terminal = record.is_terminal();
                    let applied = self.publish(|snapshot| {
                        snapshot.attempts = attempts;
                        snapshot.record = Some(record);
                        snapshot.last_error = None;
                        snapshot.consecutive_failures = 0;
                        if terminal {
                            snapshot.state = PollerState::Settled;
                        }
                    });
                    if !applied {
                        break;
                    }
                    if terminal {
                        info!(
                            "Brief {} settled with status {} after {} fetches",
                            self.record_id, status, attempts
                        );
                        break;
                    }
                }
                Err(e) => {
                    warn!(
                        "Fetch {} for brief {} failed: {}",
                        attempts, self.record_id, e
                    );
                    let error = PollError::FetchFailed {
                        attempt: attempts,
                        source: Arc::new(e),
                    };
                    let applied = self.publish(|snapshot| {
                        snapshot.attempts = attempts;
                        snapshot.last_error = Some(error);
                        snapshot.consecutive_failures += 1;
                    });
                    if !applied {
                        break;
                    }
                }
            }

            if self
                .settings
                .max_attempts
                .is_some_and(|max| attempts >= max)
            {
                if self.publish(|snapshot| snapshot.state = PollerState::TimedOut) {
                    warn!(
                        "Brief {} did not settle after {} fetches",
                        self.record_id, attempts
                    );
                }
                break;
            }

            // Measured from the end of the fetch, so fetches never overlap.
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }

        debug!("Watch loop for brief {} stopped", self.record_id);
    }
}

/// A handle on a watch.
///
/// Cloning adds a subscriber. Dropping the last subscription of a watch
/// cancels it, including any fetch in flight.
pub struct Subscription {
    watch: Arc<Watch>,
    receiver: watch::Receiver<WatchSnapshot>,
}

impl Subscription {
    pub fn record_id(&self) -> &RecordId {
        &self.watch.record_id
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> WatchSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next published change.
    ///
    /// Intermediate snapshots may be skipped; the returned one is always the
    /// latest, and a terminal snapshot is always delivered once. Returns
    /// `None` after this subscription has seen a terminal snapshot. A
    /// subscription taken on an already settled watch starts out having seen
    /// it; use [`snapshot`](Self::snapshot) there.
    pub async fn changed(&mut self) -> Option<WatchSnapshot> {
        let unseen = self.receiver.has_changed().ok()?;
        if !unseen && self.receiver.borrow().state.is_terminal() {
            return None;
        }
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until the watch reaches a terminal state.
    pub async fn settled(&mut self) -> Result<Record, PollError> {
        let snapshot = match self
            .receiver
            .wait_for(|snapshot| snapshot.state.is_terminal())
            .await
        {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => return Err(PollError::Cancelled),
        };

        match (snapshot.state, snapshot.record) {
            (PollerState::Settled, Some(record)) => Ok(record),
            (PollerState::TimedOut, _) => Err(PollError::TimedOut {
                attempts: snapshot.attempts,
            }),
            _ => Err(PollError::Cancelled),
        }
    }

    /// Stream of snapshots: the current one first, then each change, ending
    /// after the first terminal snapshot.
    pub fn updates(self) -> impl Stream<Item = WatchSnapshot> + Send {
        stream::unfold(Some((self, true)), |state| async move {
            let (mut subscription, first) = state?;
            if !first && subscription.receiver.changed().await.is_err() {
                return None;
            }
            let snapshot = subscription.receiver.borrow_and_update().clone();
            let next = if snapshot.state.is_terminal() {
                None
            } else {
                Some((subscription, false))
            };
            Some((snapshot, next))
        })
    }

    /// Leave the watch. Equivalent to dropping the subscription.
    pub fn cancel(self) {}
}

impl Clone for Subscription {
    fn clone(&self) -> Self {
        *self.watch.subscribers() += 1;
        Self {
            watch: Arc::clone(&self.watch),
            receiver: self.receiver.clone(),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.watch.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("record_id", &self.watch.record_id)
            .field("state", &self.receiver.borrow().state)
            .finish()
    }
}
