//! Prelude module for common imports

pub use crate::deploy::config::{BatchConfig, BatchConfigBuilder};
pub use crate::deploy::errors::{DeployError, TargetError, ValidationError};
pub use crate::deploy::resolver::resolve;
pub use crate::deploy::types::{
    BatchResult, FileRef, Location, Mode, Operation, OperationKind, Outcome, Validate,
};

pub use crate::executor::{
    Collaborators, Invocation, InvocationResult, Invoker, Observer, Orchestrator,
    ReachabilityProbe, Reporter, Transfer,
};
