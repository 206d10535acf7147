//! Deadline enforcement for a single target
//!
//! The target workflow runs as its own task and races a timer. Whichever
//! finishes first decides the outcome. On timeout the task is signalled to
//! stop and then left alone: the process it launched may keep running on the
//! target, and anything the task produces afterwards is dropped.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use super::target::TargetExecutor;
use crate::deploy::{Outcome, TargetError};

/// Runs target workflows under a hard deadline
#[derive(Debug, Clone)]
pub struct TimeoutSupervisor {
    executor: TargetExecutor,
    timeout: Duration,
    cancel: CancellationToken,
}

impl TimeoutSupervisor {
    /// Creates a supervisor; `cancel` is the batch-wide cancellation signal
    pub fn new(executor: TargetExecutor, timeout: Duration, cancel: CancellationToken) -> Self {
        Self {
            executor,
            timeout,
            cancel,
        }
    }

    /// Runs one target and returns exactly one outcome
    pub async fn run_with_timeout(&self, target: String) -> Outcome {
        let token = self.cancel.child_token();
        let executor = self.executor.clone();
        let task_token = token.clone();
        let task_target = target.clone();

        let mut handle =
            tokio::spawn(async move { executor.execute(&task_target, &task_token).await });

        tokio::select! {
            joined = &mut handle => match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(target = %target, error = %e, "Target task aborted");
                    Outcome::from_error(target, &TargetError::Internal(e.to_string()))
                }
            },
            () = tokio::time::sleep(self.timeout) => {
                token.cancel();
                warn!(
                    target = %target,
                    timeout = ?self.timeout,
                    "Target timed out, launched work may still be running"
                );
                Outcome::from_error(target, &TargetError::TimeoutExceeded)
            }
            () = self.cancel.cancelled() => {
                token.cancel();
                Outcome::from_error(target, &TargetError::Cancelled)
            }
        }
    }
}
