use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, warn};

/// Capacity of the pending-error queue.
pub const ERROR_QUEUE_DEPTH: usize = 5;

/// Handle for reporting asynchronous service-layer and work failures.
///
/// Reporting never blocks: when the queue is full the entry is dropped with
/// a warning. Pair with [`spawn_drain`], which logs entries for the whole
/// process lifetime, independent of start/stop cycles.
#[derive(Clone)]
pub struct ErrorSink {
    tx: mpsc::Sender<anyhow::Error>,
}

impl ErrorSink {
    /// Create a sink plus the receiving end for its drain task.
    pub fn channel() -> (Self, mpsc::Receiver<anyhow::Error>) {
        let (tx, rx) = mpsc::channel(ERROR_QUEUE_DEPTH);
        (Self { tx }, rx)
    }

    /// Queue an error for the drain task. Non-blocking.
    pub fn report(&self, err: anyhow::Error) {
        if self.tx.try_send(err).is_err() {
            warn!("error queue full or closed — entry dropped");
        }
    }
}

/// Spawn the process-lifetime drain loop: logs every reported error.
///
/// Exits only once every [`ErrorSink`] clone has been dropped.
pub fn spawn_drain(mut rx: mpsc::Receiver<anyhow::Error>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(err) = rx.recv().await {
            error!("service error: {err:#}");
        }
    })
}
