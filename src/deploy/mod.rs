//! Deployment domain types and logic

pub mod config;
pub mod errors;
pub mod resolver;
pub mod types;

pub use config::{BatchConfig, BatchConfigBuilder, DEFAULT_DESTINATION, DEFAULT_TIMEOUT};
pub use errors::{DeployError, TargetError, ValidationError};
pub use resolver::{resolve, resolve_kind, supported_extensions};
pub use types::{
    BatchResult, FAILURE_CODE, FileRef, LOCALHOST, Location, Mode, Operation, OperationKind,
    Outcome, Validate,
};
