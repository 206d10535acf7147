//! Batch fan-out
//!
//! One supervised task per target, all in flight at once. The batch never
//! fails as a whole: a broken target is just a failing outcome.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span};

use super::supervisor::TimeoutSupervisor;
use super::target::TargetExecutor;
use super::traits::Collaborators;
use crate::deploy::{BatchConfig, BatchResult};

/// Runs a validated batch across all of its targets
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: Arc<BatchConfig>,
    collaborators: Collaborators,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Creates an orchestrator for a batch
    pub fn new(config: BatchConfig, collaborators: Collaborators) -> Self {
        Self {
            config: Arc::new(config),
            collaborators,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an externally owned cancellation signal for the whole batch
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Batch configuration
    #[must_use]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Handle that cancels every in-flight target when triggered
    #[must_use]
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs every target and waits for all of them
    ///
    /// Outcomes are returned in submission order, one per target.
    pub async fn run_batch(&self) -> BatchResult {
        let executor = TargetExecutor::new(Arc::clone(&self.config), self.collaborators.clone());
        let supervisor =
            TimeoutSupervisor::new(executor, self.config.timeout(), self.cancel.clone());
        let observer = &self.collaborators.observer;

        info!(
            application = %self.config.application_name(),
            mode = %self.config.mode(),
            targets = self.config.targets().len(),
            "Starting batch"
        );

        let started = Instant::now();
        let tasks = self.config.targets().iter().map(|target| {
            let supervisor = &supervisor;
            let span = info_span!("target", name = %target);
            async move {
                observer.target_started(target);
                let outcome = supervisor.run_with_timeout(target.clone()).await;
                observer.target_finished(&outcome);
                outcome
            }
            .instrument(span)
        });

        let outcomes = join_all(tasks).await;
        let result = BatchResult::new(outcomes, started.elapsed());

        info!(
            succeeded = result.succeeded(),
            failed = result.failed(),
            elapsed = ?result.elapsed,
            "Batch finished"
        );
        observer.batch_finished(&result);
        result
    }
}
