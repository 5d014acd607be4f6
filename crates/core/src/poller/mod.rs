//! Status polling: fetch a brief on a fixed interval until it settles.
//!
//! Each fetch starts only after the previous one completed and the interval
//! elapsed. Fetch failures are published as transient errors and never end a
//! watch; only a terminal status, cancellation or the attempt limit does.

mod status_poller;
mod types;
mod watch;

pub use status_poller::StatusPoller;
pub use types::{PollError, PollerState, WatchSnapshot};
pub use watch::Subscription;
