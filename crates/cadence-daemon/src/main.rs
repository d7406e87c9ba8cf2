use std::io::IsTerminal;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::{info, warn};

mod service;
mod source;
mod task;

#[derive(Parser)]
#[command(
    name = "cadenced",
    about = "Recurring-task daemon with a runtime-reconfigurable interval"
)]
struct Cli {
    /// Path to cadence.toml (falls back to CADENCE_CONFIG, then
    /// ~/.cadence/cadence.toml).
    #[arg(long)]
    config: Option<String>,

    /// Control the system service instead of running in the foreground.
    #[arg(long, value_enum)]
    service: Option<ServiceAction>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ServiceAction {
    Install,
    Uninstall,
    Start,
    Stop,
    Restart,
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadenced=info,cadence_scheduler=info".into()),
        )
        .init();

    let cli = Cli::parse();

    // config path: explicit flag > CADENCE_CONFIG env > ~/.cadence/cadence.toml
    let config_path = cli.config.or_else(|| std::env::var("CADENCE_CONFIG").ok());
    let config = cadence_core::CadenceConfig::load(config_path.as_deref())?;

    if let Some(action) = cli.service {
        return service::control(action, &config, config_path.as_deref());
    }

    // The error drain runs for the whole process lifetime, across any number
    // of start/stop cycles.
    let (sink, errors_rx) = cadence_scheduler::ErrorSink::channel();
    let _drain = cadence_scheduler::spawn_drain(errors_rx);

    if config.task.command.is_empty() {
        warn!("task.command is empty — ticks will be no-ops");
    }

    let source = Arc::new(source::FileIntervalSource::new(
        config.clone(),
        config_path.clone(),
    ));
    source::watch_reload(Arc::clone(&source))?;

    let work = Arc::new(task::CommandTask::new(config.task.clone(), sink.clone()));

    let interactive = std::io::stdout().is_terminal();
    let mut program = cadence_scheduler::Program::new(source, work, interactive);
    program.start()?;
    info!(
        service = %config.service.name,
        interval_secs = config.schedule.interval_secs,
        "cadenced started"
    );

    wait_for_shutdown().await;

    program.stop()?;
    if let Some(handle) = program.take_handle() {
        // Bounded drain: give in-flight work a few seconds, then move on.
        if tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .is_err()
        {
            warn!("engine did not drain within 5s — exiting anyway");
        }
    }
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn wait_for_shutdown() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                warn!("SIGTERM handler failed ({e}); relying on ctrl-c only");
                let _ = ctrl_c.await;
                return;
            }
        };
        tokio::select! {
            _ = ctrl_c => info!("received SIGINT, shutting down"),
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("received ctrl-c, shutting down");
    }
}
