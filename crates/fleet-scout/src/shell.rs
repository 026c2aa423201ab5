//! Remote command execution
//!
//! [`RemoteShell`] is the seam between the scout and the cluster: the real
//! implementation shells out to `ssh`, and [`StaticShell`] scripts responses
//! for tests.

use async_trait::async_trait;
use fleet_core::config::SshConfig;
use fleet_core::{Error, Host, Result};
use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Captured output of one remote command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Process exit code; -1 when the process was killed by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the command exited with code zero
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Command execution on a cluster host
#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// Run a command on the host and capture its output.
    ///
    /// `Err` means the command could not be executed at all; a command that
    /// ran and exited non-zero is an `Ok` with a non-zero exit code.
    async fn run(&self, host: &Host, command: &str) -> Result<CommandOutput>;

    /// Whether the host accepts connections at all
    async fn probe(&self, host: &Host) -> bool {
        matches!(self.run(host, "exit").await, Ok(out) if out.is_success())
    }
}

/// [`RemoteShell`] backed by the system `ssh` client.
///
/// Connections use `BatchMode=yes` so a missing key fails fast instead of
/// prompting, plus the configured connect timeout and any extra `-o`
/// options.
#[derive(Debug, Clone)]
pub struct SshShell {
    connect_timeout: Duration,
    command_timeout: Duration,
    user: Option<String>,
    options: Vec<String>,
}

impl SshShell {
    pub fn new(config: &SshConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            command_timeout: Duration::from_secs(config.connect_timeout_secs + 30),
            user: config.user.clone(),
            options: config.options.clone(),
        }
    }

    fn target(&self, host: &Host) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, host),
            None => host.to_string(),
        }
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn run(&self, host: &Host, command: &str) -> Result<CommandOutput> {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg(format!("ConnectTimeout={}", self.connect_timeout.as_secs()));
        for option in &self.options {
            cmd.arg("-o").arg(option);
        }
        cmd.arg(self.target(host))
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(host = %host, command = %command, "running remote command");

        let output = tokio::time::timeout(self.command_timeout, cmd.output())
            .await
            .map_err(|_| Error::timeout(format!("ssh to {} timed out", host)))?
            .map_err(|e| Error::ssh(format!("failed to spawn ssh for {}: {}", host, e)))?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Scripted [`RemoteShell`] for tests.
///
/// Hosts not marked reachable fail every call; reachable hosts answer every
/// command with their scripted stdout.
#[derive(Debug, Clone, Default)]
pub struct StaticShell {
    reachable: HashSet<Host>,
    outputs: HashMap<Host, String>,
}

impl StaticShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a host reachable, answering commands with empty output
    pub fn with_host(mut self, host: impl Into<Host>) -> Self {
        self.reachable.insert(host.into());
        self
    }

    /// Mark a host reachable, answering commands with `stdout`
    pub fn with_output(mut self, host: impl Into<Host>, stdout: impl Into<String>) -> Self {
        let host = host.into();
        self.reachable.insert(host.clone());
        self.outputs.insert(host, stdout.into());
        self
    }
}

#[async_trait]
impl RemoteShell for StaticShell {
    async fn run(&self, host: &Host, _command: &str) -> Result<CommandOutput> {
        if !self.reachable.contains(host) {
            return Err(Error::ssh(format!("connection to {} refused", host)));
        }
        Ok(CommandOutput {
            exit_code: 0,
            stdout: self.outputs.get(host).cloned().unwrap_or_default(),
            stderr: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_shell_probe() {
        let shell = StaticShell::new().with_host("gpu-1");
        assert!(shell.probe(&Host::new("gpu-1")).await);
        assert!(!shell.probe(&Host::new("gpu-2")).await);
    }

    #[tokio::test]
    async fn test_static_shell_scripted_output() {
        let shell = StaticShell::new().with_output("gpu-1", "hello\n");
        let out = shell.run(&Host::new("gpu-1"), "echo hello").await.unwrap();
        assert!(out.is_success());
        assert_eq!(out.stdout, "hello\n");
    }

    #[test]
    fn test_ssh_target_includes_user() {
        let shell = SshShell::new(&SshConfig {
            connect_timeout_secs: 5,
            user: Some("opc".to_string()),
            options: vec![],
        });
        assert_eq!(shell.target(&Host::new("gpu-1")), "opc@gpu-1");

        let bare = SshShell::new(&SshConfig::default());
        assert_eq!(bare.target(&Host::new("gpu-1")), "gpu-1");
    }
}
