use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::info;

use crate::error::Result;
use crate::source::IntervalSource;
use crate::work::WorkUnit;

/// Core scheduler loop: fires the work unit once per interval until the
/// shutdown signal broadcasts.
pub struct SchedulerEngine {
    source: Arc<dyn IntervalSource>,
    work: Arc<dyn WorkUnit>,
}

impl SchedulerEngine {
    pub fn new(source: Arc<dyn IntervalSource>, work: Arc<dyn WorkUnit>) -> Self {
        Self { source, work }
    }

    /// Main event loop. Runs until `shutdown` broadcasts `true` (a dropped
    /// sender counts as shutdown too).
    ///
    /// A change notification discards the current timer, including any
    /// partially elapsed period, and rearms from a fresh read of the
    /// source. The restart is iterative, never recursive, so frequent
    /// reconfiguration cannot grow the stack. A failed interval read is
    /// fatal to this loop instance.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut changes = self.source.subscribe();
        let mut changes_closed = false;
        info!("scheduler engine started");

        'rearm: loop {
            let period = self.source.current_interval()?;
            info!(interval_secs = period.as_secs(), "timer armed");
            // First tick a full period from now; a late tick delays the
            // following ones instead of bursting to catch up.
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    // Shutdown wins over a simultaneously due tick; a change
                    // beats the tick so the new period applies first.
                    biased;
                    res = shutdown.changed() => {
                        if res.is_err() || *shutdown.borrow() {
                            info!("scheduler engine shutting down");
                            return Ok(());
                        }
                    }
                    res = changes.changed(), if !changes_closed => {
                        match res {
                            Ok(()) => {
                                info!("interval change notified — rearming timer");
                                continue 'rearm;
                            }
                            // Source dropped its sender: keep the current
                            // period and stop polling this arm.
                            Err(_) => changes_closed = true,
                        }
                    }
                    _ = ticker.tick() => {
                        // Awaited inline: the next wait starts only after
                        // the work returns, so at most one invocation is in
                        // flight and cadence drifts under slow work.
                        self.work.run().await;
                    }
                }
            }
        }
    }
}
