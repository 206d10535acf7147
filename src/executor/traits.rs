//! Capability traits for deployment execution
//!
//! The engine never touches the network, the filesystem of a target, or a
//! process directly. Everything it needs from the outside world is behind
//! one of these traits so that tests can substitute fakes.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::deploy::{BatchConfig, BatchResult, DeployError, Operation, Outcome};

/// Decides whether a target can be deployed to
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Returns true if the target exists and answers
    async fn is_valid(&self, target: &str) -> bool;
}

/// Stages files on a target and removes them afterwards
#[async_trait]
#[allow(clippy::missing_errors_doc)]
pub trait Transfer: Send + Sync {
    /// Returns true if a source path is a directory
    async fn is_directory(&self, source: &Path) -> bool;

    /// Copies one file into `destination` on the target
    async fn copy_file(&self, target: &str, source: &Path, destination: &str)
    -> std::io::Result<()>;

    /// Copies the contents of a directory into `destination` on the target
    async fn copy_directory(
        &self,
        target: &str,
        source: &Path,
        destination: &str,
    ) -> std::io::Result<()>;

    /// Removes a staged directory from the target
    async fn remove_directory(&self, target: &str, path: &str) -> std::io::Result<()>;
}

/// A single call into the process-launch collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Remote computer, `None` for local operations
    pub target: Option<String>,
    /// Script, package, patch, executable or product code
    pub path: String,
    /// Arguments forwarded to the process
    pub arguments: Vec<String>,
}

/// Native result of a launched process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResult {
    /// Process exit code
    pub exit_code: i32,
    /// Captured standard output
    pub stdout: Option<String>,
    /// Captured standard error
    pub stderr: Option<String>,
}

impl InvocationResult {
    /// Creates a result with only an exit code
    #[must_use]
    pub fn with_exit_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }

    /// Returns true if the process exited with 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Launches the process behind an [`Operation`]
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Runs the operation and waits for it to exit
    ///
    /// # Errors
    ///
    /// Returns an error only if the process could not be started or waited
    /// on; a non-zero exit is a successful invocation.
    async fn invoke(
        &self,
        operation: Operation,
        invocation: &Invocation,
    ) -> std::io::Result<InvocationResult>;
}

/// Receives progress notifications from the engine
///
/// All methods default to doing nothing.
pub trait Observer: Send + Sync {
    /// A target task has been launched
    fn target_started(&self, _target: &str) {}

    /// A target task has produced its outcome
    fn target_finished(&self, _outcome: &Outcome) {}

    /// Every target has finished
    fn batch_finished(&self, _result: &BatchResult) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Hands a finished batch to whatever persists it
#[allow(clippy::missing_errors_doc)]
pub trait Reporter: Send + Sync {
    /// Writes the report
    fn report(&self, config: &BatchConfig, result: &BatchResult) -> Result<(), DeployError>;
}

/// The collaborators a target task needs, shared by every task in a batch
#[derive(Clone)]
pub struct Collaborators {
    /// Reachability probe
    pub probe: Arc<dyn ReachabilityProbe>,
    /// File staging
    pub transfer: Arc<dyn Transfer>,
    /// Process launch
    pub invoker: Arc<dyn Invoker>,
    /// Progress notifications
    pub observer: Arc<dyn Observer>,
}

impl Collaborators {
    /// Bundles collaborators with a no-op observer
    pub fn new(
        probe: Arc<dyn ReachabilityProbe>,
        transfer: Arc<dyn Transfer>,
        invoker: Arc<dyn Invoker>,
    ) -> Self {
        Self {
            probe,
            transfer,
            invoker,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Replaces the observer
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_result_success() {
        assert!(InvocationResult::with_exit_code(0).is_success());
        assert!(!InvocationResult::with_exit_code(1603).is_success());
    }

    #[test]
    fn test_noop_observer_accepts_events() {
        let observer = NoopObserver;
        observer.target_started("PC1");
        observer.target_finished(&Outcome::completed("PC1", 0, None, None));
    }
}
