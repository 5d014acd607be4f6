//! Status poller: one watch per brief, shared by every subscriber.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::config::PollerConfig;
use crate::poller::PollerState;
use crate::record::{RecordApi, RecordId};

use super::watch::{Subscription, Watch, WatchSettings};

/// Watches briefs until they reach a terminal status.
///
/// A settled watch stays registered after its last subscriber leaves, so a
/// later `watch` replays the final record without fetching again. Call
/// [`evict_settled`](Self::evict_settled) to release them. Cancelled and
/// timed-out watches are dropped the next time any brief is watched.
pub struct StatusPoller {
    records: Arc<dyn RecordApi>,
    config: PollerConfig,
    watches: Arc<RwLock<HashMap<RecordId, Arc<Watch>>>>,
}

impl StatusPoller {
    pub fn new(records: Arc<dyn RecordApi>, config: PollerConfig) -> Self {
        Self {
            records,
            config,
            watches: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribe to a brief using the configured interval.
    ///
    /// If a live watch for `id` exists (watching, or settled with its final
    /// record) the subscription joins it instead of starting a second one.
    pub async fn watch(&self, id: &RecordId) -> Subscription {
        let interval = Duration::from_millis(self.config.interval_ms);
        self.watch_with_interval(id, interval).await
    }

    /// Like [`watch`](Self::watch), with an explicit interval for a newly
    /// started watch. Joining an existing watch keeps its interval.
    pub async fn watch_with_interval(&self, id: &RecordId, interval: Duration) -> Subscription {
        let mut watches = self.watches.write().await;
        watches.retain(|_, watch| {
            !matches!(
                watch.state(),
                PollerState::Cancelled | PollerState::TimedOut
            )
        });

        if let Some(subscription) = watches.get(id).and_then(|watch| watch.subscribe()) {
            debug!("Joining existing watch on brief {}", id);
            return subscription;
        }

        let (watch, subscription) = Watch::start(
            id.clone(),
            Arc::clone(&self.records),
            WatchSettings {
                interval,
                max_attempts: self.config.max_attempts,
            },
        );
        watches.insert(id.clone(), watch);
        subscription
    }

    /// Cancel the watch on `id` for every subscriber.
    ///
    /// Returns false if there was no watch.
    pub async fn cancel(&self, id: &RecordId) -> bool {
        match self.watches.write().await.remove(id) {
            Some(watch) => {
                watch.halt();
                true
            }
            None => false,
        }
    }

    /// Forget settled watches that have no subscribers left.
    ///
    /// Returns how many were removed.
    pub async fn evict_settled(&self) -> usize {
        let mut watches = self.watches.write().await;
        let before = watches.len();
        watches.retain(|_, watch| !watch.is_idle_settled());
        let evicted = before - watches.len();
        if evicted > 0 {
            debug!("Evicted {} settled watches", evicted);
        }
        evicted
    }

    /// Number of watches held, including settled ones kept for replay.
    pub async fn tracked_watches(&self) -> usize {
        self.watches.read().await.len()
    }

    /// Number of watches still fetching.
    pub async fn active_watches(&self) -> usize {
        self.watches
            .read()
            .await
            .values()
            .filter(|watch| !watch.state().is_terminal())
            .count()
    }
}
