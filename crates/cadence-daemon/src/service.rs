//! systemd glue: render the unit file and drive `systemctl`.

use std::process::Command;

use anyhow::{bail, Context};
use cadence_core::config::{CadenceConfig, ServiceConfig};
use tracing::info;

use crate::ServiceAction;

fn unit_path(name: &str) -> String {
    format!("/etc/systemd/system/{name}.service")
}

/// Render the systemd unit for this daemon.
fn render_unit(service: &ServiceConfig, exe: &str, config_path: Option<&str>) -> String {
    let exec_start = match config_path {
        Some(path) => format!("{exe} --config {path}"),
        None => exe.to_string(),
    };
    format!(
        "[Unit]\n\
         Description={}\n\
         After=network.target\n\
         \n\
         [Service]\n\
         ExecStart={}\n\
         Restart=on-failure\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        service.description, exec_start
    )
}

/// Execute one service-manager action and exit.
pub fn control(
    action: ServiceAction,
    config: &CadenceConfig,
    config_path: Option<&str>,
) -> anyhow::Result<()> {
    let name = &config.service.name;
    match action {
        ServiceAction::Install => {
            let exe = std::env::current_exe().context("cannot resolve daemon executable path")?;
            let unit = render_unit(&config.service, &exe.to_string_lossy(), config_path);
            let path = unit_path(name);
            std::fs::write(&path, unit).with_context(|| format!("writing {path}"))?;
            systemctl(&["daemon-reload"])?;
            systemctl(&["enable", name])?;
            info!(unit = %path, "service installed");
            Ok(())
        }
        ServiceAction::Uninstall => {
            // Best effort: the unit may already be disabled.
            systemctl(&["disable", name]).ok();
            let path = unit_path(name);
            std::fs::remove_file(&path).with_context(|| format!("removing {path}"))?;
            systemctl(&["daemon-reload"])?;
            info!("service uninstalled");
            Ok(())
        }
        ServiceAction::Start => systemctl(&["start", name]),
        ServiceAction::Stop => systemctl(&["stop", name]),
        ServiceAction::Restart => systemctl(&["restart", name]),
        ServiceAction::Status => {
            // Pass systemctl's own report through to the user.
            let status = Command::new("systemctl")
                .args(["status", name])
                .status()
                .context("running systemctl")?;
            if !status.success() {
                bail!("service {name} is not running");
            }
            Ok(())
        }
    }
}

fn systemctl(args: &[&str]) -> anyhow::Result<()> {
    let output = Command::new("systemctl")
        .args(args)
        .output()
        .context("running systemctl")?;
    if !output.status.success() {
        bail!(
            "systemctl {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_complete_unit() {
        let service = ServiceConfig::default();
        let unit = render_unit(&service, "/usr/local/bin/cadenced", Some("/etc/cadence.toml"));

        assert!(unit.contains("Description=Cadence recurring task daemon"));
        assert!(unit.contains("ExecStart=/usr/local/bin/cadenced --config /etc/cadence.toml"));
        assert!(unit.contains("WantedBy=multi-user.target"));
    }

    #[test]
    fn omits_config_flag_when_unset() {
        let service = ServiceConfig::default();
        let unit = render_unit(&service, "/usr/local/bin/cadenced", None);
        assert!(unit.contains("ExecStart=/usr/local/bin/cadenced\n"));
        assert!(!unit.contains("--config"));
    }

    #[test]
    fn unit_path_uses_the_service_name() {
        assert_eq!(unit_path("myjob"), "/etc/systemd/system/myjob.service");
    }
}
