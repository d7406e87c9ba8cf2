//! Shell-command work unit.

use async_trait::async_trait;
use cadence_core::config::TaskConfig;
use cadence_scheduler::{ErrorSink, WorkUnit};
use tracing::{debug, info};

/// Runs the configured shell command once per tick.
///
/// Failures are contained here: they go to the error sink and never reach
/// the scheduler loop.
pub struct CommandTask {
    config: TaskConfig,
    sink: ErrorSink,
}

impl CommandTask {
    pub fn new(config: TaskConfig, sink: ErrorSink) -> Self {
        Self { config, sink }
    }
}

#[async_trait]
impl WorkUnit for CommandTask {
    async fn run(&self) {
        if self.config.command.is_empty() {
            debug!("no task.command configured — skipping tick");
            return;
        }

        let started = std::time::Instant::now();
        let mut cmd = tokio::process::Command::new("/bin/sh");
        cmd.arg("-c").arg(&self.config.command);
        if let Some(ref dir) = self.config.workdir {
            cmd.current_dir(dir);
        }

        match cmd.output().await {
            Ok(output) if output.status.success() => {
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "task completed"
                );
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                self.sink.report(anyhow::anyhow!(
                    "task exited with {}: {stderr}",
                    output.status
                ));
            }
            Err(e) => {
                self.sink.report(anyhow::anyhow!("task failed to launch: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with(command: &str) -> (CommandTask, tokio::sync::mpsc::Receiver<anyhow::Error>) {
        let (sink, rx) = ErrorSink::channel();
        let config = TaskConfig {
            command: command.to_string(),
            workdir: None,
        };
        (CommandTask::new(config, sink), rx)
    }

    #[tokio::test]
    async fn successful_command_reports_nothing() {
        let (task, mut rx) = task_with("true");
        task.run().await;
        drop(task);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn failing_command_reports_to_sink() {
        let (task, mut rx) = task_with("echo nope >&2; exit 3");
        task.run().await;

        let err = rx.recv().await.expect("failure should be reported");
        let msg = format!("{err}");
        assert!(msg.contains("task exited"), "unexpected report: {msg}");
        assert!(msg.contains("nope"), "stderr should be included: {msg}");
    }

    #[tokio::test]
    async fn empty_command_is_a_noop() {
        let (task, mut rx) = task_with("");
        task.run().await;
        drop(task);
        assert!(rx.recv().await.is_none());
    }
}
