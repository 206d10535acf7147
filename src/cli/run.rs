//! `deployline run` - Execute a deployment batch
//!
//! Loads the settings file, validates it, fans the deployment out to every
//! computer and writes the report.
//!
//! ## Exit codes
//!
//! - `0`: every target succeeded
//! - `1`: at least one target failed
//! - `2`: the settings were rejected before anything ran

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use deployline::deploy::DeployError;
use deployline::executor::Orchestrator;
use deployline::infrastructure::{
    FanoutObserver, MetricsCollector, ReportFormat, Settings, TracingObserver, init_logging,
    reporter_for, system_collaborators,
};

/// Command line values that take precedence over the settings file
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    /// Per-target timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Report destination
    pub report: Option<PathBuf>,
    /// Report format
    pub format: Option<ReportFormat>,
}

/// Loads settings and applies overrides
pub fn load_settings(file: &Path, overrides: &RunOverrides) -> Result<Settings> {
    let mut settings = Settings::load(file)
        .with_context(|| format!("Failed to load settings: {}", file.display()))?;

    if let Some(timeout_ms) = overrides.timeout_ms {
        settings.timeout_ms = timeout_ms;
    }
    if let Some(report) = &overrides.report {
        settings.report = Some(report.clone());
    }
    if let Some(format) = overrides.format {
        settings.report_format = format;
    }
    Ok(settings)
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every target succeeded
    Succeeded,
    /// At least one target failed
    TargetsFailed,
    /// Settings were rejected before any target started
    InvalidSettings,
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Succeeded => ExitCode::SUCCESS,
            RunStatus::TargetsFailed => ExitCode::from(1),
            RunStatus::InvalidSettings => ExitCode::from(2),
        }
    }
}

/// Runs the batch described by a settings file
pub fn run_batch(file: &Path, overrides: &RunOverrides, debug: bool) -> Result<RunStatus> {
    let settings = load_settings(file, overrides)?;
    init_logging(if debug { "debug" } else { settings.log_level.as_str() });

    let report = settings.report.clone();
    let format = settings.report_format;

    let config = match settings.into_batch_config() {
        Ok(config) => config,
        Err(DeployError::Validation(e)) => {
            eprintln!("Invalid settings: {e}");
            return Ok(RunStatus::InvalidSettings);
        }
        Err(e) => return Err(e).context("Failed to prepare batch"),
    };

    let observer = FanoutObserver::new()
        .with(Arc::new(TracingObserver))
        .with(Arc::new(MetricsCollector::new(config.targets().len())));
    let cancel = CancellationToken::new();
    let orchestrator = Orchestrator::new(
        config,
        system_collaborators().with_observer(Arc::new(observer)),
    )
    .with_cancellation(cancel.clone());

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let result = runtime.block_on(async {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling remaining targets");
                cancel.cancel();
            }
        });
        orchestrator.run_batch().await
    });

    reporter_for(format, report)
        .report(orchestrator.config(), &result)
        .context("Failed to write report")?;

    // Launched processes are not awaited past their deadline.
    runtime.shutdown_background();

    Ok(if result.is_success() {
        RunStatus::Succeeded
    } else {
        RunStatus::TargetsFailed
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_take_precedence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch.yaml");
        fs::write(
            &path,
            "application_name: A\nmode: install\nfile: a.msi\ntimeout_ms: 1000\n",
        )
        .unwrap();

        let overrides = RunOverrides {
            timeout_ms: Some(50),
            report: Some(dir.path().join("out.json")),
            format: Some(ReportFormat::Json),
        };
        let settings = load_settings(&path, &overrides).unwrap();

        assert_eq!(settings.timeout_ms, 50);
        assert_eq!(settings.report_format, ReportFormat::Json);
        assert_eq!(settings.report, Some(dir.path().join("out.json")));
    }

    #[test]
    fn test_invalid_settings_exit_with_two() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch.yaml");
        fs::write(&path, "application_name: A\nsource_path: /x\nmode: install\nfile: a.msi\n")
            .unwrap();

        let status = run_batch(&path, &RunOverrides::default(), false).unwrap();

        assert_eq!(status, RunStatus::InvalidSettings);
    }

    #[test]
    fn test_unknown_mode_exits_with_two() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch.yaml");
        fs::write(
            &path,
            "application_name: A\nsource_path: /x\nmode: reboot\nfile: a.msi\ncomputers: [PC1]\n",
        )
        .unwrap();

        let status = run_batch(&path, &RunOverrides::default(), false).unwrap();

        assert_eq!(status, RunStatus::InvalidSettings);
        assert_eq!(
            load_settings(&path, &RunOverrides::default()).unwrap().mode,
            "reboot"
        );
    }

    #[test]
    fn test_missing_settings_file_is_an_error() {
        let result = run_batch(
            Path::new("/nonexistent/deployline/batch.yaml"),
            &RunOverrides::default(),
            false,
        );
        assert!(result.is_err());
    }
}
