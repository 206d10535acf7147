//! Process-launch collaborator
//!
//! Turns an [`Operation`] into a Windows command line and runs it with
//! captured output. Remote operations are wrapped in a launcher (PsExec by
//! default) that forwards the same command line to the target.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

use crate::deploy::{Location, Operation, OperationKind};
use crate::executor::{Invocation, InvocationResult, Invoker};

/// Placeholder replaced by the computer name in the remote launcher
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// Programs and flags used to build command lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokerConfig {
    /// PowerShell executable
    pub powershell: String,
    /// Command shell executable
    pub cmd: String,
    /// Windows Installer executable
    pub msiexec: String,
    /// Prefix for remote runs; `{target}` is substituted
    pub remote_launcher: Vec<String>,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            powershell: "powershell.exe".to_string(),
            cmd: "cmd.exe".to_string(),
            msiexec: "msiexec.exe".to_string(),
            remote_launcher: vec![
                "psexec.exe".to_string(),
                "-accepteula".to_string(),
                "-nobanner".to_string(),
                "-s".to_string(),
                format!(r"\\{TARGET_PLACEHOLDER}"),
            ],
        }
    }
}

/// Launches operations as child processes
#[derive(Debug, Clone, Default)]
pub struct CommandInvoker {
    config: InvokerConfig,
}

impl CommandInvoker {
    /// Creates an invoker with default programs
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an invoker with custom programs
    #[must_use]
    pub fn with_config(config: InvokerConfig) -> Self {
        Self { config }
    }

    /// Full argv for an operation, launcher included for remote runs
    #[must_use]
    pub fn command_line(&self, operation: Operation, invocation: &Invocation) -> Vec<String> {
        let local = self.local_command_line(operation.kind, invocation);

        match (operation.location, invocation.target.as_deref()) {
            (Location::Remote, Some(target)) => self
                .config
                .remote_launcher
                .iter()
                .map(|part| part.replace(TARGET_PLACEHOLDER, target))
                .chain(local)
                .collect(),
            _ => local,
        }
    }

    fn local_command_line(&self, kind: OperationKind, invocation: &Invocation) -> Vec<String> {
        let path = invocation.path.clone();
        let msiexec = |flags: &[&str]| {
            let mut argv = vec![self.config.msiexec.clone()];
            argv.extend(flags.iter().map(ToString::to_string));
            argv.push(path.clone());
            argv.extend(["/qn".to_string(), "/norestart".to_string()]);
            argv
        };

        let mut argv = match kind {
            OperationKind::RunPowerShellScript => vec![
                self.config.powershell.clone(),
                "-NoProfile".to_string(),
                "-NonInteractive".to_string(),
                "-ExecutionPolicy".to_string(),
                "Bypass".to_string(),
                "-File".to_string(),
                path.clone(),
            ],
            OperationKind::RunBatchScript => {
                vec![self.config.cmd.clone(), "/c".to_string(), path.clone()]
            }
            OperationKind::InstallMsi => msiexec(&["/i"]),
            OperationKind::InstallMsp => msiexec(&["/p"]),
            OperationKind::RepairMsi => msiexec(&["/fa"]),
            OperationKind::RepairMsp => {
                let mut argv = msiexec(&["/p"]);
                argv.extend(["REINSTALL=ALL".to_string(), "REINSTALLMODE=omus".to_string()]);
                argv
            }
            OperationKind::UninstallMsi | OperationKind::UninstallProductCode => msiexec(&["/x"]),
            OperationKind::UninstallMsp => msiexec(&["/uninstall"]),
            OperationKind::InstallExe | OperationKind::RepairExe | OperationKind::UninstallExe => {
                vec![path.clone()]
            }
        };

        if kind.takes_arguments() {
            argv.extend(invocation.arguments.iter().cloned());
        }
        argv
    }
}

#[async_trait]
impl Invoker for CommandInvoker {
    async fn invoke(
        &self,
        operation: Operation,
        invocation: &Invocation,
    ) -> std::io::Result<InvocationResult> {
        let argv = self.command_line(operation, invocation);
        let Some((program, args)) = argv.split_first() else {
            return Err(std::io::Error::other("empty command line"));
        };

        debug!(command = %shell_words::join(&argv), "Launching process");

        let start = Instant::now();
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                std::io::Error::new(e.kind(), format!("Failed to launch {program}: {e}"))
            })?;

        let exit_code = output.status.code().unwrap_or(-1);
        debug!(exit_code, elapsed = ?start.elapsed(), "Process exited");

        Ok(InvocationResult {
            exit_code,
            stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
        })
    }
}
