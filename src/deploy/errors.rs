//! Error types for the deployment domain
//!
//! Errors are split by blast radius: [`ValidationError`] aborts the whole
//! batch before any target is touched, [`TargetError`] degrades exactly one
//! target's [`Outcome`](super::Outcome).

use super::types::Mode;
use thiserror::Error;

/// Top level errors surfaced to callers of the library
#[derive(Error, Debug)]
pub enum DeployError {
    /// Batch configuration is invalid
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Settings or computer list could not be parsed
    #[error("Invalid settings in '{path}': {reason}")]
    Settings {
        /// File that failed to parse.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// Report could not be serialized
    #[error("Report serialization failed: {0}")]
    Report(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation errors for batch configuration
///
/// Any of these is fatal for the run and is raised before a single target
/// task is started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Application name cannot be empty
    #[error("Application name cannot be empty")]
    EmptyApplicationName,

    /// Source path cannot be empty
    #[error("Source path cannot be empty")]
    EmptySourcePath,

    /// File reference cannot be empty
    #[error("File reference cannot be empty")]
    EmptyFileReference,

    /// Timeout must be positive
    #[error("Invalid timeout: must be positive, got {value_ms}ms")]
    InvalidTimeout {
        /// The invalid timeout in milliseconds.
        value_ms: u64,
    },

    /// Target list must contain at least one computer
    #[error("Target list must contain at least one computer")]
    EmptyTargetList,

    /// A target entry is blank
    #[error("Target at position {index} is empty")]
    EmptyTarget {
        /// Zero-based position in the target list.
        index: usize,
    },

    /// The same computer appears twice
    #[error(
        "Computer '{target}' is listed more than once (names are case-insensitive); \
         remove the duplicate from the computer list"
    )]
    DuplicateTarget {
        /// The repeated computer name.
        target: String,
    },

    /// Mode is not one of the four supported values
    #[error("Invalid mode: '{0}' (expected RunScript, Install, Repair or Uninstall)")]
    InvalidMode(String),

    /// Staging requested without a destination
    #[error("Destination cannot be empty when source items are copied")]
    EmptyDestination,

    /// Invocation arguments could not be tokenized
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Failures scoped to a single target
///
/// The display text of each variant is the message recorded in the target's
/// outcome, so the first four strings are part of the report format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    /// Reachability probe rejected the target
    #[error("Computer is not a valid AD computer or is offline")]
    TargetUnreachable,

    /// Staging source items failed
    #[error("Files could not be copied")]
    TransferFailure {
        /// Underlying transfer error, kept for logs.
        reason: String,
    },

    /// The per-target deadline elapsed first
    #[error("Task timed out")]
    TimeoutExceeded,

    /// Cancellation was observed before the task finished
    #[error("Task was cancelled")]
    Cancelled,

    /// No operation exists for this mode and file
    #[error("Unsupported file type '{file}' for mode {mode}")]
    UnsupportedFileType {
        /// Requested mode.
        mode: Mode,
        /// File reference as given.
        file: String,
    },

    /// The process could not be launched
    #[error("{0}")]
    InvocationFailure(String),

    /// The task died without producing an outcome
    #[error("{0}")]
    Internal(String),
}
