use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The configured tick period is not strictly positive.
    #[error("Invalid interval: {secs}s (must be positive)")]
    InvalidInterval { secs: u64 },

    /// The interval could not be read from its source at all.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `start()` was called while the engine loop is active.
    #[error("Scheduler is already running")]
    AlreadyRunning,

    /// `stop()` was called with no active engine loop.
    #[error("Scheduler is not running")]
    NotRunning,

    /// A stopped program cannot be restarted; build a new one.
    #[error("Scheduler was stopped and cannot be restarted")]
    AlreadyStopped,

    /// The background engine task could not be spawned.
    #[error("Failed to launch scheduler task: {0}")]
    Launch(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
