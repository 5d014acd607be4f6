//! Types for watching a brief until it settles.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::record::{Record, RecordError, RecordId};

/// State of a single watch.
///
/// ```text
/// Idle -> Watching -> Settled
///            |-----> Cancelled
///            '-----> TimedOut
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerState {
    /// Created, no subscriber yet, nothing fetched.
    Idle,
    /// Fetching on a fixed interval.
    Watching,
    /// A terminal record status was observed.
    Settled,
    /// The last subscriber left, or the watch was cancelled explicitly.
    Cancelled,
    /// The attempt limit was reached before the brief settled.
    TimedOut,
}

impl PollerState {
    /// No fetch is issued from a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollerState::Settled | PollerState::Cancelled | PollerState::TimedOut
        )
    }
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PollerState::Idle => "idle",
            PollerState::Watching => "watching",
            PollerState::Settled => "settled",
            PollerState::Cancelled => "cancelled",
            PollerState::TimedOut => "timed out",
        };
        f.write_str(s)
    }
}

/// Polling failures.
#[derive(Debug, Clone, Error)]
pub enum PollError {
    /// A single fetch failed. Transient: the watch keeps going.
    #[error("fetch {attempt} failed: {source}")]
    FetchFailed {
        attempt: u32,
        source: Arc<RecordError>,
    },

    /// The attempt limit was reached without a terminal status.
    #[error("brief did not settle after {attempts} fetches")]
    TimedOut { attempts: u32 },

    /// The watch was cancelled before it settled.
    #[error("watch cancelled")]
    Cancelled,
}

/// Latest known view of a watch, as published to subscribers.
#[derive(Debug, Clone)]
pub struct WatchSnapshot {
    pub record_id: RecordId,
    pub state: PollerState,
    /// Last record the server returned. Never replaced by a failure.
    pub record: Option<Record>,
    /// Most recent fetch failure; cleared by the next successful fetch.
    pub last_error: Option<PollError>,
    /// Fetches completed so far, successful or not.
    pub attempts: u32,
    pub consecutive_failures: u32,
}

impl WatchSnapshot {
    pub(crate) fn idle(record_id: RecordId) -> Self {
        Self {
            record_id,
            state: PollerState::Idle,
            record: None,
            last_error: None,
            attempts: 0,
            consecutive_failures: 0,
        }
    }

    /// Settled with a record: the outcome a caller waits for.
    pub fn settled_record(&self) -> Option<&Record> {
        match self.state {
            PollerState::Settled => self.record.as_ref(),
            _ => None,
        }
    }
}
