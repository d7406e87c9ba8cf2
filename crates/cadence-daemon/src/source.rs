//! File-backed interval source with SIGHUP-triggered reload.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use cadence_core::CadenceConfig;
use cadence_scheduler::{IntervalSource, SchedulerError};
use tokio::sync::watch;
use tracing::{info, warn};

/// Serves the tick period from the loaded config and notifies the engine
/// when a reload changes it.
pub struct FileIntervalSource {
    config_path: Option<String>,
    current: RwLock<CadenceConfig>,
    changes: watch::Sender<()>,
}

impl FileIntervalSource {
    pub fn new(initial: CadenceConfig, config_path: Option<String>) -> Self {
        let (changes, _) = watch::channel(());
        Self {
            config_path,
            current: RwLock::new(initial),
            changes,
        }
    }

    /// Re-read cadence.toml (plus env overrides) and notify subscribers.
    ///
    /// On failure the previous config stays in effect and no notification
    /// is sent.
    pub fn reload(&self) {
        match CadenceConfig::load(self.config_path.as_deref()) {
            Ok(config) => {
                let interval_secs = config.schedule.interval_secs;
                *self.current.write().unwrap() = config;
                let _ = self.changes.send(());
                info!(interval_secs, "configuration reloaded");
            }
            Err(e) => warn!("config reload failed ({e}); keeping previous configuration"),
        }
    }
}

impl IntervalSource for FileIntervalSource {
    fn current_interval(&self) -> cadence_scheduler::Result<Duration> {
        let secs = self.current.read().unwrap().schedule.interval_secs;
        if secs == 0 {
            return Err(SchedulerError::InvalidInterval { secs });
        }
        Ok(Duration::from_secs(secs))
    }

    fn subscribe(&self) -> watch::Receiver<()> {
        self.changes.subscribe()
    }
}

/// Spawn the SIGHUP listener: each signal triggers one reload.
#[cfg(unix)]
pub fn watch_reload(source: Arc<FileIntervalSource>) -> anyhow::Result<()> {
    let mut hangup =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup())?;
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!("SIGHUP received — reloading configuration");
            source.reload();
        }
    });
    Ok(())
}

#[cfg(not(unix))]
pub fn watch_reload(_source: Arc<FileIntervalSource>) -> anyhow::Result<()> {
    Ok(())
}
