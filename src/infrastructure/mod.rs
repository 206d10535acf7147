//! Infrastructure layer
//!
//! This module contains external integrations and adapters.

mod config;
mod invoker;
mod logging;
mod metrics;
mod probe;
mod report;
mod transfer;

pub use config::{ReportFormat, Settings, load_computer_list, parse_computer_list};
pub use invoker::{CommandInvoker, InvokerConfig, TARGET_PLACEHOLDER};
pub use logging::init_logging;
pub use metrics::{BatchMetrics, MetricsCollector};
pub use probe::CommandProbe;
pub use report::{
    FanoutObserver, JsonReporter, TextReporter, TracingObserver, render_json, render_text,
    reporter_for,
};
pub use transfer::ShareTransfer;

use std::sync::Arc;

use crate::executor::Collaborators;

/// Collaborators that talk to real machines
#[must_use]
pub fn system_collaborators() -> Collaborators {
    Collaborators::new(
        Arc::new(CommandProbe::new()),
        Arc::new(ShareTransfer::new()),
        Arc::new(CommandInvoker::new()),
    )
    .with_observer(Arc::new(TracingObserver))
}
