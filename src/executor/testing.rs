//! In-memory collaborators for engine tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::traits::{
    Collaborators, Invocation, InvocationResult, Invoker, Observer, ReachabilityProbe, Transfer,
};
use crate::deploy::{BatchResult, Operation, Outcome};

pub(crate) fn collaborators(
    probe: Arc<FakeProbe>,
    transfer: Arc<FakeTransfer>,
    invoker: Arc<FakeInvoker>,
) -> Collaborators {
    Collaborators::new(probe, transfer, invoker)
}

pub(crate) struct FakeProbe {
    unreachable: Vec<String>,
    calls: AtomicUsize,
}

impl FakeProbe {
    pub(crate) fn all_valid() -> Self {
        Self::unreachable(Vec::<String>::new())
    }

    pub(crate) fn unreachable<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unreachable: targets.into_iter().map(Into::into).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReachabilityProbe for FakeProbe {
    async fn is_valid(&self, target: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        !self.unreachable.iter().any(|t| t == target)
    }
}

#[derive(Default)]
pub(crate) struct FakeTransfer {
    source_is_dir: bool,
    fail_copy: bool,
    fail_remove: bool,
    copies: Mutex<Vec<(String, String, bool)>>,
    removals: Mutex<Vec<(String, String)>>,
}

impl FakeTransfer {
    pub(crate) fn file() -> Self {
        Self::default()
    }

    pub(crate) fn directory() -> Self {
        Self {
            source_is_dir: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_copy(mut self) -> Self {
        self.fail_copy = true;
        self
    }

    pub(crate) fn failing_remove(mut self) -> Self {
        self.fail_remove = true;
        self
    }

    pub(crate) fn copies(&self) -> Vec<(String, String, bool)> {
        self.copies.lock().clone()
    }

    pub(crate) fn removals(&self) -> Vec<(String, String)> {
        self.removals.lock().clone()
    }

    fn copy(&self, target: &str, destination: &str, directory: bool) -> std::io::Result<()> {
        if self.fail_copy {
            return Err(std::io::Error::other("access denied"));
        }
        self.copies
            .lock()
            .push((target.to_string(), destination.to_string(), directory));
        Ok(())
    }
}

#[async_trait]
impl Transfer for FakeTransfer {
    async fn is_directory(&self, _source: &Path) -> bool {
        self.source_is_dir
    }

    async fn copy_file(
        &self,
        target: &str,
        _source: &Path,
        destination: &str,
    ) -> std::io::Result<()> {
        self.copy(target, destination, false)
    }

    async fn copy_directory(
        &self,
        target: &str,
        _source: &Path,
        destination: &str,
    ) -> std::io::Result<()> {
        self.copy(target, destination, true)
    }

    async fn remove_directory(&self, target: &str, path: &str) -> std::io::Result<()> {
        self.removals
            .lock()
            .push((target.to_string(), path.to_string()));
        if self.fail_remove {
            return Err(std::io::Error::other("in use"));
        }
        Ok(())
    }
}

pub(crate) struct FakeInvoker {
    result: InvocationResult,
    launch_error: Option<String>,
    delay: Option<Duration>,
    slow_targets: Vec<String>,
    panic_targets: Vec<String>,
    calls: Mutex<Vec<(Operation, Invocation)>>,
}

impl FakeInvoker {
    pub(crate) fn exiting(exit_code: i32) -> Self {
        Self {
            result: InvocationResult::with_exit_code(exit_code),
            launch_error: None,
            delay: None,
            slow_targets: Vec::new(),
            panic_targets: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            launch_error: Some(message.to_string()),
            ..Self::exiting(-1)
        }
    }

    pub(crate) fn with_stdout(mut self, stdout: &str) -> Self {
        self.result.stdout = Some(stdout.to_string());
        self
    }

    pub(crate) fn with_stderr(mut self, stderr: &str) -> Self {
        self.result.stderr = Some(stderr.to_string());
        self
    }

    /// Delays every call, or only calls for `targets` when given
    pub(crate) fn delayed(mut self, delay: Duration, targets: &[&str]) -> Self {
        self.delay = Some(delay);
        self.slow_targets = targets.iter().map(ToString::to_string).collect();
        self
    }

    /// Panics inside `invoke` for the given targets
    pub(crate) fn panicking_for(mut self, targets: &[&str]) -> Self {
        self.panic_targets = targets.iter().map(ToString::to_string).collect();
        self
    }

    pub(crate) fn calls(&self) -> Vec<(Operation, Invocation)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Invoker for FakeInvoker {
    async fn invoke(
        &self,
        operation: Operation,
        invocation: &Invocation,
    ) -> std::io::Result<InvocationResult> {
        self.calls.lock().push((operation, invocation.clone()));

        let name = invocation.target.as_deref().unwrap_or("localhost");
        assert!(
            !self.panic_targets.iter().any(|t| t == name),
            "invoker bug on {name}"
        );
        if let Some(delay) = self.delay {
            if self.slow_targets.is_empty() || self.slow_targets.iter().any(|t| t == name) {
                tokio::time::sleep(delay).await;
            }
        }

        match &self.launch_error {
            Some(message) => Err(std::io::Error::other(message.clone())),
            None => Ok(self.result.clone()),
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    pub(crate) started: Mutex<Vec<String>>,
    pub(crate) finished: Mutex<Vec<Outcome>>,
    pub(crate) batches: AtomicUsize,
}

impl Observer for RecordingObserver {
    fn target_started(&self, target: &str) {
        self.started.lock().push(target.to_string());
    }

    fn target_finished(&self, outcome: &Outcome) {
        self.finished.lock().push(outcome.clone());
    }

    fn batch_finished(&self, _result: &BatchResult) {
        self.batches.fetch_add(1, Ordering::SeqCst);
    }
}
