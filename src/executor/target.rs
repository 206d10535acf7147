//! Per-target workflow
//!
//! Validate, optionally stage, resolve and invoke, then optionally clean
//! up. Stages run strictly in that order and every failure is folded into
//! the target's [`Outcome`]; nothing escapes to the caller.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::traits::{Collaborators, Invocation, InvocationResult};
use crate::deploy::{BatchConfig, Location, Outcome, TargetError, resolve};

/// Runs the deployment workflow for one target
#[derive(Debug, Clone)]
pub struct TargetExecutor {
    config: Arc<BatchConfig>,
    collaborators: Collaborators,
}

impl TargetExecutor {
    /// Creates an executor sharing the batch configuration
    pub fn new(config: Arc<BatchConfig>, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// Executes the workflow and always returns an outcome
    pub async fn execute(&self, target: &str, cancel: &CancellationToken) -> Outcome {
        match self.try_execute(target, cancel).await {
            Ok(outcome) => outcome,
            Err(err) => {
                match &err {
                    TargetError::TransferFailure { reason } => {
                        warn!(target = %target, %reason, "Staging failed");
                    }
                    other => debug!(target = %target, error = %other, "Target failed"),
                }
                Outcome::from_error(target, &err)
            }
        }
    }

    async fn try_execute(
        &self,
        target: &str,
        cancel: &CancellationToken,
    ) -> Result<Outcome, TargetError> {
        if cancel.is_cancelled() {
            return Err(TargetError::Cancelled);
        }

        if !self.collaborators.probe.is_valid(target).await {
            return Err(TargetError::TargetUnreachable);
        }

        let source = self.config.source_path();
        let source_is_dir = if source.as_os_str().is_empty() {
            false
        } else {
            self.collaborators.transfer.is_directory(source).await
        };

        if !self.config.copy_source_items() {
            return self.invoke(target, false, source_is_dir, cancel).await;
        }

        let destination = self.config.destination_for(target);
        self.stage(target, source_is_dir, &destination).await?;

        let result = self.invoke(target, true, source_is_dir, cancel).await;
        self.cleanup(target, &destination).await;
        result
    }

    async fn stage(
        &self,
        target: &str,
        source_is_dir: bool,
        destination: &str,
    ) -> Result<(), TargetError> {
        let transfer = &self.collaborators.transfer;
        let source = self.config.source_path();

        debug!(target = %target, source = %source.display(), %destination, "Staging source items");

        let copied = if source_is_dir {
            transfer.copy_directory(target, source, destination).await
        } else {
            transfer.copy_file(target, source, destination).await
        };

        copied.map_err(|e| TargetError::TransferFailure {
            reason: e.to_string(),
        })
    }

    async fn invoke(
        &self,
        target: &str,
        staged: bool,
        source_is_dir: bool,
        cancel: &CancellationToken,
    ) -> Result<Outcome, TargetError> {
        let location = Location::for_target(target);
        let operation = resolve(location, self.config.mode(), self.config.file())?;

        if cancel.is_cancelled() {
            return Err(TargetError::Cancelled);
        }

        let invocation = Invocation {
            target: match location {
                Location::Local => None,
                Location::Remote => Some(target.to_string()),
            },
            path: self.config.invocation_path(target, staged, source_is_dir),
            arguments: if operation.kind.takes_arguments() {
                self.config.arguments().to_vec()
            } else {
                Vec::new()
            },
        };

        info!(target = %target, %operation, path = %invocation.path, "Invoking");

        let InvocationResult {
            exit_code,
            stdout,
            stderr,
        } = self
            .collaborators
            .invoker
            .invoke(operation, &invocation)
            .await
            .map_err(|e| TargetError::InvocationFailure(e.to_string()))?;

        let error = match stderr.filter(|s| !s.trim().is_empty()) {
            Some(text) if exit_code == 0 => {
                debug!(target = %target, stderr = %text, "Succeeded with output on stderr");
                None
            }
            other => other,
        };

        Ok(Outcome::completed(
            target,
            exit_code,
            error,
            stdout.filter(|s| !s.trim().is_empty()),
        ))
    }

    async fn cleanup(&self, target: &str, destination: &str) {
        if let Err(e) = self
            .collaborators
            .transfer
            .remove_directory(target, destination)
            .await
        {
            debug!(target = %target, %destination, error = %e, "Cleanup failed, ignoring");
        }
    }
}
