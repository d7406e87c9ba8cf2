use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::engine::SchedulerEngine;
use crate::error::{Result, SchedulerError};
use crate::source::IntervalSource;
use crate::work::WorkUnit;

/// Lifecycle state, owned exclusively by [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Stopped,
}

/// Lifecycle controller: mediates between the host service manager's
/// start/stop semantics and the engine loop.
///
/// One engine instance runs per `Running` period, driven by a cancellation
/// signal created fresh on each start. A stopped program cannot be
/// restarted; build a new `Program` instead (one armed signal per run).
pub struct Program {
    source: Arc<dyn IntervalSource>,
    work: Arc<dyn WorkUnit>,
    interactive: bool,
    state: RunState,
    shutdown: Option<watch::Sender<bool>>,
    engine_task: Option<JoinHandle<()>>,
}

impl Program {
    /// `interactive` is the one bit read from the host environment: whether
    /// the process is attached to a terminal rather than run by the service
    /// manager. It only gates the user-facing start/stop notices.
    pub fn new(source: Arc<dyn IntervalSource>, work: Arc<dyn WorkUnit>, interactive: bool) -> Self {
        Self {
            source,
            work,
            interactive,
            state: RunState::NotStarted,
            shutdown: None,
            engine_task: None,
        }
    }

    /// Launch the engine loop in the background and return immediately.
    ///
    /// Never blocks on the loop's progress; an error here means the task
    /// could not be spawned at all. Work failures later on are the work
    /// unit's own concern.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            RunState::Running => return Err(SchedulerError::AlreadyRunning),
            RunState::Stopped => return Err(SchedulerError::AlreadyStopped),
            RunState::NotStarted => {}
        }

        if self.interactive {
            info!("running in terminal");
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SchedulerError::Launch(e.to_string()))?;

        let (tx, rx) = watch::channel(false);
        let engine = SchedulerEngine::new(Arc::clone(&self.source), Arc::clone(&self.work));
        let task = runtime.spawn(async move {
            if let Err(e) = engine.run(rx).await {
                error!("scheduler engine terminated: {e}");
            }
        });

        self.shutdown = Some(tx);
        self.engine_task = Some(task);
        self.state = RunState::Running;
        Ok(())
    }

    /// Fire the cancellation signal and return immediately.
    ///
    /// In-flight work is not waited for; use [`take_handle`](Self::take_handle)
    /// to bound the final drain. A second stop is a reported error, never a
    /// second fire: the sender is consumed by the first call.
    pub fn stop(&mut self) -> Result<()> {
        let tx = self.shutdown.take().ok_or(SchedulerError::NotRunning)?;

        if self.interactive {
            info!("stopping");
        }
        let _ = tx.send(true);
        self.state = RunState::Stopped;
        Ok(())
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Hand the engine task to the caller, e.g. for a bounded join after
    /// [`stop`](Self::stop).
    pub fn take_handle(&mut self) -> Option<JoinHandle<()>> {
        self.engine_task.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::time::sleep;

    struct FixedSource {
        tx: watch::Sender<()>,
    }

    impl FixedSource {
        fn new() -> Arc<Self> {
            let (tx, _) = watch::channel(());
            Arc::new(Self { tx })
        }
    }

    impl IntervalSource for FixedSource {
        fn current_interval(&self) -> Result<Duration> {
            Ok(Duration::from_secs(1))
        }

        fn subscribe(&self) -> watch::Receiver<()> {
            self.tx.subscribe()
        }
    }

    struct SlowWork {
        runs: AtomicUsize,
        busy: Duration,
    }

    impl SlowWork {
        fn new(busy: Duration) -> Arc<Self> {
            Arc::new(Self {
                runs: AtomicUsize::new(0),
                busy,
            })
        }
    }

    #[async_trait::async_trait]
    impl WorkUnit for SlowWork {
        async fn run(&self) {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if !self.busy.is_zero() {
                sleep(self.busy).await;
            }
        }
    }

    fn program(busy: Duration) -> Program {
        Program::new(FixedSource::new(), SlowWork::new(busy), false)
    }

    #[tokio::test]
    async fn start_then_stop_transitions_cleanly() {
        let mut p = program(Duration::ZERO);
        assert_eq!(p.state(), RunState::NotStarted);

        p.start().unwrap();
        assert_eq!(p.state(), RunState::Running);

        p.stop().unwrap();
        assert_eq!(p.state(), RunState::Stopped);
    }

    #[tokio::test]
    async fn double_start_is_reported() {
        let mut p = program(Duration::ZERO);
        p.start().unwrap();
        assert!(matches!(p.start(), Err(SchedulerError::AlreadyRunning)));
        p.stop().unwrap();
    }

    #[tokio::test]
    async fn stop_before_start_is_reported() {
        let mut p = program(Duration::ZERO);
        assert!(matches!(p.stop(), Err(SchedulerError::NotRunning)));
    }

    #[tokio::test]
    async fn double_stop_is_reported_not_fatal() {
        let mut p = program(Duration::ZERO);
        p.start().unwrap();
        p.stop().unwrap();
        assert!(matches!(p.stop(), Err(SchedulerError::NotRunning)));
        assert_eq!(p.state(), RunState::Stopped);
    }

    #[tokio::test]
    async fn stopped_program_cannot_restart() {
        let mut p = program(Duration::ZERO);
        p.start().unwrap();
        p.stop().unwrap();
        assert!(matches!(p.start(), Err(SchedulerError::AlreadyStopped)));
    }

    #[test]
    fn start_outside_runtime_is_launch_error() {
        let mut p = program(Duration::ZERO);
        assert!(matches!(p.start(), Err(SchedulerError::Launch(_))));
        // A failed start must not report the program as running.
        assert_eq!(p.state(), RunState::NotStarted);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_immediate_even_with_slow_work() {
        let mut p = program(Duration::from_secs(1000));
        p.start().unwrap();

        // Let the first tick fire so a slow run is in flight.
        sleep(Duration::from_secs(1)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }

        p.stop().unwrap();
        assert_eq!(p.state(), RunState::Stopped);

        // The engine is still draining the in-flight run; a bounded join
        // times out instead of hanging.
        let handle = p.take_handle().unwrap();
        let drained = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(drained.is_err(), "engine should still be draining slow work");
    }
}
