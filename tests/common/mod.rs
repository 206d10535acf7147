//! Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use deployline::{
    Collaborators, Invocation, InvocationResult, Invoker, Operation, ReachabilityProbe, Transfer,
};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Probe that rejects a fixed set of computers and records every call
#[derive(Default)]
pub struct ListProbe {
    pub offline: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

impl ListProbe {
    pub fn offline(targets: &[&str]) -> Self {
        Self {
            offline: targets.iter().map(ToString::to_string).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ReachabilityProbe for ListProbe {
    async fn is_valid(&self, target: &str) -> bool {
        self.calls.lock().push(target.to_string());
        !self.offline.iter().any(|t| t == target)
    }
}

/// Transfer that records staging calls per target
#[derive(Default)]
pub struct RecordingTransfer {
    pub copies: Mutex<Vec<String>>,
    pub removals: Mutex<Vec<String>>,
}

impl RecordingTransfer {
    pub fn calls_for(&self, target: &str) -> usize {
        self.copies.lock().iter().filter(|t| *t == target).count()
            + self.removals.lock().iter().filter(|t| *t == target).count()
    }
}

#[async_trait]
impl Transfer for RecordingTransfer {
    async fn is_directory(&self, _source: &Path) -> bool {
        false
    }

    async fn copy_file(&self, target: &str, _: &Path, _: &str) -> std::io::Result<()> {
        self.copies.lock().push(target.to_string());
        Ok(())
    }

    async fn copy_directory(&self, target: &str, _: &Path, _: &str) -> std::io::Result<()> {
        self.copies.lock().push(target.to_string());
        Ok(())
    }

    async fn remove_directory(&self, target: &str, _: &str) -> std::io::Result<()> {
        self.removals.lock().push(target.to_string());
        Ok(())
    }
}

/// How the scripted invoker behaves
#[derive(Clone, Copy)]
pub enum Behaviour {
    Exit(i32),
    ExitAfter(i32, Duration),
    Hang,
}

/// Invoker with a fixed behaviour that records every call
pub struct ScriptedInvoker {
    pub behaviour: Behaviour,
    pub calls: Mutex<Vec<(Operation, Invocation)>>,
}

impl ScriptedInvoker {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls_for(&self, target: Option<&str>) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(_, inv)| inv.target.as_deref() == target)
            .count()
    }
}

#[async_trait]
impl Invoker for ScriptedInvoker {
    async fn invoke(
        &self,
        operation: Operation,
        invocation: &Invocation,
    ) -> std::io::Result<InvocationResult> {
        self.calls.lock().push((operation, invocation.clone()));
        match self.behaviour {
            Behaviour::Exit(code) => Ok(InvocationResult::with_exit_code(code)),
            Behaviour::ExitAfter(code, delay) => {
                tokio::time::sleep(delay).await;
                Ok(InvocationResult::with_exit_code(code))
            }
            Behaviour::Hang => std::future::pending().await,
        }
    }
}

pub struct Fakes {
    pub probe: Arc<ListProbe>,
    pub transfer: Arc<RecordingTransfer>,
    pub invoker: Arc<ScriptedInvoker>,
}

impl Fakes {
    pub fn new(offline: &[&str], behaviour: Behaviour) -> Self {
        Self {
            probe: Arc::new(ListProbe::offline(offline)),
            transfer: Arc::new(RecordingTransfer::default()),
            invoker: Arc::new(ScriptedInvoker::new(behaviour)),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            self.probe.clone(),
            self.transfer.clone(),
            self.invoker.clone(),
        )
    }
}
