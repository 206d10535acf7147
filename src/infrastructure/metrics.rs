//! Metrics collection
//!
//! Summarizes a batch and tracks progress while it runs.

use parking_lot::RwLock;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::deploy::{BatchResult, Outcome, TargetError};
use crate::executor::Observer;

/// Summary of a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchMetrics {
    /// Number of targets
    pub total: usize,
    /// Targets that exited with 0
    pub succeeded: usize,
    /// Targets that did not
    pub failed: usize,
    /// Targets that hit the deadline
    pub timed_out: usize,
    /// Targets rejected by the reachability probe
    pub unreachable: usize,
    /// Batch wall-clock time in milliseconds
    pub elapsed_ms: u64,
}

impl BatchMetrics {
    /// Computes metrics from outcomes and elapsed time
    #[must_use]
    pub fn from_outcomes(outcomes: &[Outcome], elapsed: Duration) -> Self {
        let count = |error: &TargetError| outcomes.iter().filter(|o| o.failed_with(error)).count();
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();

        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            timed_out: count(&TargetError::TimeoutExceeded),
            unreachable: count(&TargetError::TargetUnreachable),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Computes metrics for a finished batch
    #[must_use]
    pub fn from_result(result: &BatchResult) -> Self {
        Self::from_outcomes(&result.outcomes, result.elapsed)
    }
}

/// Observer that keeps a live tally of finished targets
///
/// Every finished target logs a progress line against the expected total.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    total: usize,
    started: RwLock<usize>,
    finished: RwLock<Vec<Outcome>>,
}

impl MetricsCollector {
    /// Creates a collector for a batch of `total` targets
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Expected number of targets
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Targets started so far
    #[must_use]
    pub fn started(&self) -> usize {
        *self.started.read()
    }

    /// Targets finished so far
    #[must_use]
    pub fn finished(&self) -> usize {
        self.finished.read().len()
    }

    /// Metrics over the targets finished so far
    #[must_use]
    pub fn snapshot(&self, elapsed: Duration) -> BatchMetrics {
        BatchMetrics::from_outcomes(&self.finished.read(), elapsed)
    }
}

impl Observer for MetricsCollector {
    fn target_started(&self, _target: &str) {
        *self.started.write() += 1;
    }

    fn target_finished(&self, outcome: &Outcome) {
        let (finished, succeeded) = {
            let mut done = self.finished.write();
            done.push(outcome.clone());
            (done.len(), done.iter().filter(|o| o.is_success()).count())
        };
        info!(
            finished,
            total = self.total,
            succeeded,
            failed = finished - succeeded,
            "Progress"
        );
    }
}
