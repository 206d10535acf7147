//! Core types for the deployment domain
//!
//! These types describe what is deployed, where it runs, and what came back
//! from each machine.

#![allow(clippy::must_use_candidate)]

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use super::errors::{TargetError, ValidationError};

/// Target name that means "run on this machine"
pub const LOCALHOST: &str = "localhost";

/// Status code recorded when a target fails before or outside its operation
pub const FAILURE_CODE: i32 = -1;

/// What the batch does on every target
///
/// Deserializes through [`FromStr`], so any casing and `_`/`-` separators
/// are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Run a PowerShell or batch script
    RunScript,
    /// Install a package, patch or executable
    Install,
    /// Repair an installed package
    Repair,
    /// Remove a package by file or product code
    Uninstall,
}

impl Mode {
    /// All modes, in declaration order
    pub const ALL: [Mode; 4] = [Mode::RunScript, Mode::Install, Mode::Repair, Mode::Uninstall];
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunScript => write!(f, "RunScript"),
            Self::Install => write!(f, "Install"),
            Self::Repair => write!(f, "Repair"),
            Self::Uninstall => write!(f, "Uninstall"),
        }
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "runscript" => Ok(Self::RunScript),
            "install" => Ok(Self::Install),
            "repair" => Ok(Self::Repair),
            "uninstall" => Ok(Self::Uninstall),
            _ => Err(ValidationError::InvalidMode(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Where an operation is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// On the machine running the batch
    Local,
    /// On another machine
    Remote,
}

impl Location {
    /// Classifies a target name; `localhost` matches case-insensitively
    pub fn for_target(target: &str) -> Self {
        if target.trim().eq_ignore_ascii_case(LOCALHOST) {
            Self::Local
        } else {
            Self::Remote
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// The file a batch acts on: a path, or an installed product's code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRef {
    /// Script, package, patch or executable
    Path(String),
    /// MSI product code such as `{3F2504E0-4F89-11D3-9A0C-0305E82C3301}`
    ProductCode(Uuid),
}

impl FileRef {
    /// Classifies a raw file reference
    ///
    /// Anything that parses as a GUID (braced, hyphenated or simple) is a
    /// product code; everything else is kept as a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match Uuid::try_parse(trimmed) {
            Ok(code) => Self::ProductCode(code),
            Err(_) => Self::Path(trimmed.to_string()),
        }
    }

    /// Lowercased extension without the dot, if this is a path with one
    pub fn extension(&self) -> Option<String> {
        match self {
            Self::Path(path) => {
                let name = file_name(path);
                let (stem, ext) = name.rsplit_once('.')?;
                if stem.is_empty() || ext.is_empty() {
                    None
                } else {
                    Some(ext.to_ascii_lowercase())
                }
            }
            Self::ProductCode(_) => None,
        }
    }

    /// Final component used when joining onto a staging or source directory
    pub fn file_name(&self) -> String {
        match self {
            Self::Path(path) => file_name(path).to_string(),
            Self::ProductCode(_) => self.to_string(),
        }
    }

    /// Returns true for product codes
    pub fn is_product_code(&self) -> bool {
        matches!(self, Self::ProductCode(_))
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{path}"),
            Self::ProductCode(code) => {
                write!(f, "{}", code.braced().to_string().to_ascii_uppercase())
            }
        }
    }
}

/// Last path component, accepting both `/` and `\` separators
pub(crate) fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Joins a file name onto a directory string, keeping its separator style
pub(crate) fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        return name.to_string();
    }
    if base.ends_with(['/', '\\']) {
        return format!("{base}{name}");
    }
    let separator = if base.contains('\\') { '\\' } else { '/' };
    format!("{base}{separator}{name}")
}

/// Concrete action selected for a target, before location is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Run a `.ps1` through PowerShell
    RunPowerShellScript,
    /// Run a `.bat`/`.cmd` through the command shell
    RunBatchScript,
    /// Install an `.msi`
    InstallMsi,
    /// Apply an `.msp`
    InstallMsp,
    /// Run an installer `.exe` with the batch arguments
    InstallExe,
    /// Repair an `.msi`
    RepairMsi,
    /// Reapply an `.msp`
    RepairMsp,
    /// Run a repair `.exe` with the batch arguments
    RepairExe,
    /// Remove an `.msi` by package path
    UninstallMsi,
    /// Remove an `.msp` by patch path
    UninstallMsp,
    /// Run an uninstaller `.exe` with the batch arguments
    UninstallExe,
    /// Remove an installed product by its product code
    UninstallProductCode,
}

impl OperationKind {
    /// Returns true when the batch arguments are forwarded to the process
    pub fn takes_arguments(&self) -> bool {
        !matches!(self, Self::UninstallProductCode)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RunPowerShellScript => "run PowerShell script",
            Self::RunBatchScript => "run batch script",
            Self::InstallMsi => "install MSI",
            Self::InstallMsp => "install MSP",
            Self::InstallExe => "install EXE",
            Self::RepairMsi => "repair MSI",
            Self::RepairMsp => "repair MSP",
            Self::RepairExe => "repair EXE",
            Self::UninstallMsi => "uninstall MSI",
            Self::UninstallMsp => "uninstall MSP",
            Self::UninstallExe => "uninstall EXE",
            Self::UninstallProductCode => "uninstall product code",
        };
        write!(f, "{label}")
    }
}

/// An operation bound to where it runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    /// What to do
    pub kind: OperationKind,
    /// Where to do it
    pub location: Location,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.location)
    }
}

/// Terminal record for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Computer the outcome belongs to
    pub target: String,
    /// 0 on success, -1 for orchestration failures, otherwise the native code
    pub exit_code: i32,
    /// Failure message, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Captured standard output, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Outcome {
    /// Builds an outcome from a finished operation
    pub fn completed(
        target: impl Into<String>,
        exit_code: i32,
        error: Option<String>,
        output: Option<String>,
    ) -> Self {
        Self {
            target: target.into(),
            exit_code,
            error,
            output,
        }
    }

    /// Builds a `-1` outcome carrying the error's message
    pub fn from_error(target: impl Into<String>, error: &TargetError) -> Self {
        Self {
            target: target.into(),
            exit_code: FAILURE_CODE,
            error: Some(error.to_string()),
            output: None,
        }
    }

    /// Returns true if the target succeeded
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns true if this outcome carries the given error's message
    pub fn failed_with(&self, error: &TargetError) -> bool {
        self.exit_code == FAILURE_CODE && self.error.as_deref() == Some(&error.to_string())
    }
}

/// Every outcome of one run plus its wall-clock duration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// Outcomes in submission order
    pub outcomes: Vec<Outcome>,
    /// Time from first launch to last completion
    pub elapsed: Duration,
}

impl BatchResult {
    /// Creates a batch result
    pub fn new(outcomes: Vec<Outcome>, elapsed: Duration) -> Self {
        Self { outcomes, elapsed }
    }

    /// Returns true if every target succeeded
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(Outcome::is_success)
    }

    /// Looks up the outcome for a target
    pub fn outcome(&self, target: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.target == target)
    }

    /// Number of successful targets
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed targets
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Trait for types that can be validated
#[allow(clippy::missing_errors_doc)]
pub trait Validate {
    /// Type of validation error
    type Error;

    /// Validates this type
    fn validate(&self) -> std::result::Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mode_from_str_accepts_common_spellings() {
        assert_eq!("RunScript".parse::<Mode>().unwrap(), Mode::RunScript);
        assert_eq!("run_script".parse::<Mode>().unwrap(), Mode::RunScript);
        assert_eq!("INSTALL".parse::<Mode>().unwrap(), Mode::Install);
        assert_eq!(" repair ".parse::<Mode>().unwrap(), Mode::Repair);
        assert_eq!("Uninstall".parse::<Mode>().unwrap(), Mode::Uninstall);
        assert!(matches!(
            "reboot".parse::<Mode>(),
            Err(ValidationError::InvalidMode(_))
        ));
    }

    #[test]
    fn test_mode_deserialize() {
        let mode: Mode = serde_yaml::from_str("run_script").unwrap();
        assert_eq!(mode, Mode::RunScript);
        let mode: Mode = serde_yaml::from_str("Install").unwrap();
        assert_eq!(mode, Mode::Install);
        let mode: Mode = serde_yaml::from_str("UnInstall").unwrap();
        assert_eq!(mode, Mode::Uninstall);

        let err = serde_yaml::from_str::<Mode>("reboot").unwrap_err();
        assert!(err.to_string().contains("Invalid mode: 'reboot'"));
    }

    #[test]
    fn test_location_for_target() {
        assert_eq!(Location::for_target("localhost"), Location::Local);
        assert_eq!(Location::for_target("LocalHost"), Location::Local);
        assert_eq!(Location::for_target("PC1"), Location::Remote);
        assert_eq!(Location::for_target("localhost2"), Location::Remote);
    }

    #[test]
    fn test_file_ref_parse_product_code() {
        let file = FileRef::parse("{3F2504E0-4F89-11D3-9A0C-0305E82C3301}");
        assert!(file.is_product_code());
        assert_eq!(file.extension(), None);
        assert_eq!(file.to_string(), "{3F2504E0-4F89-11D3-9A0C-0305E82C3301}");

        let lower = FileRef::parse("3f2504e0-4f89-11d3-9a0c-0305e82c3301");
        assert_eq!(lower, file);
    }

    #[test]
    fn test_file_ref_parse_path() {
        let file = FileRef::parse(r"C:\Packages\Setup.MSI");
        assert!(!file.is_product_code());
        assert_eq!(file.extension().as_deref(), Some("msi"));
        assert_eq!(file.file_name(), "Setup.MSI");
    }

    #[test]
    fn test_file_ref_extension_edge_cases() {
        assert_eq!(FileRef::parse("README").extension(), None);
        assert_eq!(FileRef::parse(".hidden").extension(), None);
        assert_eq!(FileRef::parse("trailing.").extension(), None);
        assert_eq!(
            FileRef::parse("dir.d/deploy.ps1").extension().as_deref(),
            Some("ps1")
        );
    }

    #[test]
    fn test_join_path_keeps_separator_style() {
        assert_eq!(join_path(r"C:\Temp\App", "setup.msi"), r"C:\Temp\App\setup.msi");
        assert_eq!(join_path(r"C:\Temp\", "setup.msi"), r"C:\Temp\setup.msi");
        assert_eq!(join_path("/srv/pkgs", "setup.msi"), "/srv/pkgs/setup.msi");
        assert_eq!(join_path("", "setup.msi"), "setup.msi");
    }

    #[test]
    fn test_outcome_from_error() {
        let outcome = Outcome::from_error("PC1", &TargetError::TimeoutExceeded);
        assert_eq!(outcome.exit_code, FAILURE_CODE);
        assert_eq!(outcome.error.as_deref(), Some("Task timed out"));
        assert!(outcome.failed_with(&TargetError::TimeoutExceeded));
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_outcome_serialize_skips_empty_fields() {
        let outcome = Outcome::completed("PC1", 0, None, None);
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"target":"PC1","exit_code":0}"#);
    }

    #[test]
    fn test_batch_result_counts() {
        let result = BatchResult::new(
            vec![
                Outcome::completed("a", 0, None, None),
                Outcome::completed("b", 1603, Some("fatal".to_string()), None),
                Outcome::from_error("c", &TargetError::TargetUnreachable),
            ],
            Duration::from_millis(5),
        );
        assert_eq!(result.succeeded(), 1);
        assert_eq!(result.failed(), 2);
        assert!(!result.is_success());
        assert_eq!(result.outcome("b").unwrap().exit_code, 1603);
        assert!(result.outcome("z").is_none());
    }
}
