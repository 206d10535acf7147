//! # Deployline - fan-out deployments for Windows fleets
//!
//! Deployline runs one deployment action (a script, or an MSI/MSP/EXE
//! install, repair or uninstall) against many machines at once. Every
//! machine gets a single attempt under a hard timeout and produces exactly
//! one [`Outcome`]; the batch as a whole always completes.
//!
//! ## Architecture
//!
//! - [`deploy`]: configuration, the action resolver and result types
//! - [`executor`]: the per-target workflow, the timeout supervisor and the
//!   orchestrator, all talking to the outside world through capability traits
//! - [`infrastructure`]: command-line probes, share-based file staging,
//!   process launch, settings files, logging and reports
//!
//! ## Example
//!
//! ```rust,no_run
//! use deployline::{BatchConfig, Mode, Orchestrator, system_collaborators};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), deployline::ValidationError> {
//! let config = BatchConfig::builder()
//!     .application_name("Agent")
//!     .source_path(r"\\files\packages\agent\setup.msi")
//!     .mode(Mode::Install)
//!     .file("setup.msi")
//!     .timeout(Duration::from_secs(300))
//!     .targets(["localhost", "PC2"])
//!     .build()?;
//!
//! let result = Orchestrator::new(config, system_collaborators()).run_batch().await;
//! println!("{} of {} succeeded", result.succeeded(), result.outcomes.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <https://www.apache.org/licenses/LICENSE-2.0>)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or <https://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod deploy;
pub mod executor;
pub mod infrastructure;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use deploy::{
    BatchConfig, BatchConfigBuilder, BatchResult, DeployError, FileRef, Location, Mode, Operation,
    OperationKind, Outcome, TargetError, Validate, ValidationError, resolve,
};
pub use executor::{
    Collaborators, Invocation, InvocationResult, Invoker, Observer, Orchestrator,
    ReachabilityProbe, Reporter, TargetExecutor, TimeoutSupervisor, Transfer,
};
pub use infrastructure::{
    BatchMetrics, CommandInvoker, CommandProbe, JsonReporter, Settings, ShareTransfer,
    TextReporter, TracingObserver, init_logging, system_collaborators,
};

/// Version of the deployline crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
