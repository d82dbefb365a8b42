use std::process::{Command, Output};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{CheckReport, ServiceController, ServiceError};

/// External commands, each as an argv array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommandSet {
    pub check: Vec<String>,
    pub reload: Vec<String>,
    pub status: Vec<String>,
    pub ports: Vec<String>,
    /// Prefix for `<prefix> <target> <link>` when creating a link directly fails.
    pub link_fallback: Vec<String>,
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

impl Default for CommandSet {
    fn default() -> Self {
        Self {
            check: argv(&["sudo", "nginx", "-t"]),
            reload: argv(&["sudo", "systemctl", "reload", "nginx"]),
            status: argv(&["systemctl", "is-active", "nginx"]),
            ports: argv(&["ss", "-tlnp"]),
            link_fallback: argv(&["sudo", "ln", "-sf"]),
        }
    }
}

/// Drives the real service through shell commands.
pub struct SystemServiceController {
    commands: CommandSet,
}

impl SystemServiceController {
    pub fn new(commands: CommandSet) -> Self {
        Self { commands }
    }

    fn run(&self, name: &'static str, argv: &[String]) -> Result<Output, ServiceError> {
        let (program, args) = argv
            .split_first()
            .ok_or(ServiceError::NotConfigured(name))?;

        debug!(command = %argv.join(" "), "running service command");
        Command::new(program)
            .args(args)
            .output()
            .map_err(|e| ServiceError::SpawnFailed {
                command: argv.join(" "),
                source: e,
            })
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

impl ServiceController for SystemServiceController {
    fn check(&self) -> Result<CheckReport, ServiceError> {
        let output = self.run("check", &self.commands.check)?;
        Ok(CheckReport {
            ok: output.status.success(),
            diagnostics: combined_output(&output),
        })
    }

    fn reload(&self) -> Result<(), ServiceError> {
        let output = self.run("reload", &self.commands.reload)?;
        if !output.status.success() {
            return Err(ServiceError::CommandFailed {
                command: self.commands.reload.join(" "),
                status: output.status.to_string(),
                output: combined_output(&output).trim().to_string(),
            });
        }
        info!("service reloaded");
        Ok(())
    }

    fn query_status(&self) -> Result<bool, ServiceError> {
        let output = self.run("status", &self.commands.status)?;
        Ok(output.status.success())
    }

    fn list_listening_ports(&self) -> Result<String, ServiceError> {
        let output = self.run("ports", &self.commands.ports)?;
        if !output.status.success() {
            return Err(ServiceError::CommandFailed {
                command: self.commands.ports.join(" "),
                status: output.status.to_string(),
                output: combined_output(&output).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
