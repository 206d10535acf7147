//! Settings file and computer list loading

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::deploy::{BatchConfig, DEFAULT_DESTINATION, DeployError, Mode, ValidationError};

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Fixed-width table
    #[default]
    Text,
    /// Pretty printed JSON document
    Json,
}

/// Deployment settings as written in a YAML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Application name
    pub application_name: String,
    /// Source file or directory
    #[serde(default)]
    pub source_path: PathBuf,
    /// Stage source items on the target before invoking
    #[serde(default)]
    pub copy_source_items: bool,
    /// Deployment mode, checked when the batch is built
    pub mode: String,
    /// Script, package or product code
    pub file: String,
    /// Argument line forwarded to the process
    #[serde(default)]
    pub arguments: String,
    /// Destination template
    #[serde(default = "default_destination")]
    pub destination: String,
    /// Per-target timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Inline computer names
    #[serde(default)]
    pub computers: Vec<String>,
    /// File with one computer per line
    #[serde(default)]
    pub computer_list: Option<PathBuf>,
    /// Where to write the report; stdout when absent
    #[serde(default)]
    pub report: Option<PathBuf>,
    /// Report format
    #[serde(default)]
    pub report_format: ReportFormat,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_destination() -> String {
    DEFAULT_DESTINATION.to_string()
}

fn default_timeout_ms() -> u64 {
    600_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Loads settings from a YAML file
    ///
    /// A relative `computer_list` is resolved against the settings file's
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Io`] if the file cannot be read and
    /// [`DeployError::Settings`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, DeployError> {
        let raw = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_yaml::from_str(&raw).map_err(|e| DeployError::Settings {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        if let (Some(list), Some(dir)) = (settings.computer_list.as_ref(), path.parent()) {
            if list.is_relative() {
                settings.computer_list = Some(dir.join(list));
            }
        }
        Ok(settings)
    }

    /// Inline computers followed by the computer list entries
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Io`] if the list file cannot be read.
    pub fn computers(&self) -> Result<Vec<String>, DeployError> {
        let mut computers = self.computers.clone();
        if let Some(list) = &self.computer_list {
            computers.extend(load_computer_list(list)?);
        }
        Ok(computers)
    }

    /// Builds the validated batch configuration
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Validation`] for invalid values and
    /// [`DeployError::Io`] if the computer list cannot be read.
    pub fn into_batch_config(self) -> Result<BatchConfig, DeployError> {
        let mode: Mode = self.mode.parse()?;
        let targets = self.computers()?;
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout { value_ms: 0 }.into());
        }

        let config = BatchConfig::builder()
            .application_name(self.application_name)
            .source_path(self.source_path)
            .copy_source_items(self.copy_source_items)
            .mode(mode)
            .file(self.file)
            .arguments_line(&self.arguments)?
            .destination(self.destination)
            .timeout(Duration::from_millis(self.timeout_ms))
            .targets(targets)
            .build()?;
        Ok(config)
    }
}

/// Parses a computer list: one name per line, `#` comments and blanks skipped
#[must_use]
pub fn parse_computer_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

/// Reads and parses a computer list file
///
/// # Errors
///
/// Returns [`DeployError::Io`] if the file cannot be read.
pub fn load_computer_list(path: &Path) -> Result<Vec<String>, DeployError> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_computer_list(&content))
}
