//! Reporting and console progress
//!
//! Reporters persist a finished batch; observers narrate it while it runs.

use serde_json::json;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::config::ReportFormat;
use super::metrics::BatchMetrics;
use crate::deploy::{BatchConfig, BatchResult, DeployError, Outcome};
use crate::executor::{Observer, Reporter};

/// Renders the plain text report
#[must_use]
pub fn render_text(config: &BatchConfig, result: &BatchResult) -> String {
    let metrics = BatchMetrics::from_result(result);
    let width = result
        .outcomes
        .iter()
        .map(|o| o.target.len())
        .max()
        .unwrap_or(0)
        .max("TARGET".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} {})",
        config.application_name(),
        config.mode(),
        config.file()
    );
    let _ = writeln!(out, "{:<width$}  {:>6}  MESSAGE", "TARGET", "STATUS");
    for outcome in &result.outcomes {
        let message = match (&outcome.error, outcome.is_success()) {
            (Some(error), _) => error.as_str(),
            (None, true) => "OK",
            (None, false) => "FAILED",
        };
        let _ = writeln!(
            out,
            "{:<width$}  {:>6}  {}",
            outcome.target,
            outcome.exit_code,
            message.lines().next().unwrap_or("")
        );
    }
    let _ = writeln!(
        out,
        "{} succeeded, {} failed ({} timed out, {} unreachable) in {}ms",
        metrics.succeeded,
        metrics.failed,
        metrics.timed_out,
        metrics.unreachable,
        metrics.elapsed_ms
    );
    out
}

/// Renders the JSON report
#[must_use]
pub fn render_json(config: &BatchConfig, result: &BatchResult) -> serde_json::Value {
    json!({
        "run_id": Uuid::new_v4().to_string(),
        "application": config.application_name(),
        "mode": config.mode(),
        "file": config.file().to_string(),
        "summary": BatchMetrics::from_result(result),
        "outcomes": result.outcomes,
    })
}

fn write_output(output: Option<&PathBuf>, content: &str) -> Result<(), DeployError> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
            info!(path = %path.display(), "Report written");
        }
        None => print!("{content}"),
    }
    Ok(())
}

/// Writes the fixed-width text report
#[derive(Debug, Clone, Default)]
pub struct TextReporter {
    output: Option<PathBuf>,
}

impl TextReporter {
    /// Creates a reporter; `None` writes to stdout
    #[must_use]
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }
}

impl Reporter for TextReporter {
    fn report(&self, config: &BatchConfig, result: &BatchResult) -> Result<(), DeployError> {
        write_output(self.output.as_ref(), &render_text(config, result))
    }
}

/// Writes the JSON report
#[derive(Debug, Clone, Default)]
pub struct JsonReporter {
    output: Option<PathBuf>,
}

impl JsonReporter {
    /// Creates a reporter; `None` writes to stdout
    #[must_use]
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }
}

impl Reporter for JsonReporter {
    fn report(&self, config: &BatchConfig, result: &BatchResult) -> Result<(), DeployError> {
        let mut content = serde_json::to_string_pretty(&render_json(config, result))
            .map_err(|e| DeployError::Report(e.to_string()))?;
        content.push('\n');
        write_output(self.output.as_ref(), &content)
    }
}

/// Picks the reporter for a format
#[must_use]
pub fn reporter_for(format: ReportFormat, output: Option<PathBuf>) -> Box<dyn Reporter> {
    match format {
        ReportFormat::Text => Box::new(TextReporter::new(output)),
        ReportFormat::Json => Box::new(JsonReporter::new(output)),
    }
}

/// Observer that logs progress through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn target_started(&self, target: &str) {
        info!(target = %target, "Deployment started");
    }

    fn target_finished(&self, outcome: &Outcome) {
        if outcome.is_success() {
            info!(target = %outcome.target, "Deployment succeeded");
        } else {
            warn!(
                target = %outcome.target,
                status = outcome.exit_code,
                error = outcome.error.as_deref().unwrap_or(""),
                "Deployment failed"
            );
        }
    }
}

/// Forwards every event to several observers
#[derive(Clone, Default)]
pub struct FanoutObserver {
    observers: Vec<Arc<dyn Observer>>,
}

impl FanoutObserver {
    /// Creates an empty fan-out
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer
    #[must_use]
    pub fn with(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }
}

impl Observer for FanoutObserver {
    fn target_started(&self, target: &str) {
        self.observers.iter().for_each(|o| o.target_started(target));
    }

    fn target_finished(&self, outcome: &Outcome) {
        self.observers.iter().for_each(|o| o.target_finished(outcome));
    }

    fn batch_finished(&self, result: &BatchResult) {
        self.observers.iter().for_each(|o| o.batch_finished(result));
    }
}
