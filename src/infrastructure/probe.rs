//! Reachability collaborator backed by an external command

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::invoker::TARGET_PLACEHOLDER;
use crate::deploy::Location;
use crate::executor::ReachabilityProbe;

/// Probes a target by running a command and checking its exit status
///
/// `localhost` is always considered valid.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    command: Vec<String>,
}

impl Default for CommandProbe {
    fn default() -> Self {
        let command: &[&str] = if cfg!(windows) {
            &["ping", "-n", "1", "-w", "1000", TARGET_PLACEHOLDER]
        } else {
            &["ping", "-c", "1", "-W", "1", TARGET_PLACEHOLDER]
        };
        Self::with_command(command.iter().map(ToString::to_string).collect())
    }
}

impl CommandProbe {
    /// Creates a probe using the platform `ping`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a probe using a custom command; `{target}` is substituted
    #[must_use]
    pub fn with_command(command: Vec<String>) -> Self {
        Self { command }
    }

    fn argv(&self, target: &str) -> Vec<String> {
        self.command
            .iter()
            .map(|part| part.replace(TARGET_PLACEHOLDER, target))
            .collect()
    }
}

#[async_trait]
impl ReachabilityProbe for CommandProbe {
    async fn is_valid(&self, target: &str) -> bool {
        if Location::for_target(target) == Location::Local {
            return true;
        }

        let argv = self.argv(target);
        let Some((program, args)) = argv.split_first() else {
            return false;
        };

        match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
        {
            Ok(status) => {
                debug!(target = %target, success = status.success(), "Probe finished");
                status.success()
            }
            Err(e) => {
                debug!(target = %target, error = %e, "Probe could not run");
                false
            }
        }
    }
}
