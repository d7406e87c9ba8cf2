use std::time::Duration;

use tokio::sync::watch;

use crate::error::Result;

/// Where the engine reads its tick period from.
///
/// Change notifications are edge-triggered and carry no value: the engine
/// calls [`current_interval`](IntervalSource::current_interval) again on
/// every notification instead of trusting anything embedded in the event.
/// Notifications arriving while the engine is busy are held as a pending
/// version bump, so they are applied (once) as soon as it next waits.
pub trait IntervalSource: Send + Sync {
    /// The current tick period. Must be strictly positive; a zero interval
    /// is a configuration error, not something the engine works around.
    fn current_interval(&self) -> Result<Duration>;

    /// Subscribe to change notifications for the lifetime of the source.
    fn subscribe(&self) -> watch::Receiver<()>;
}
