//! Deployment execution layer
//!
//! This module contains the capability traits and the engine that fans a
//! batch out across its targets.

mod orchestrator;
mod supervisor;
mod target;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::Orchestrator;
pub use supervisor::TimeoutSupervisor;
pub use target::TargetExecutor;
pub use traits::{
    Collaborators, Invocation, InvocationResult, Invoker, NoopObserver, Observer,
    ReachabilityProbe, Reporter, Transfer,
};
