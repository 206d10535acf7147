//! Batch configuration
//!
//! A [`BatchConfig`] is built once, validated, and then shared read-only by
//! every target task.

use ahash::AHashSet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::errors::ValidationError;
use super::types::{FileRef, Mode, Validate, join_path};

/// Destination used when none is configured
pub const DEFAULT_DESTINATION: &str = r"C:\Temp\${APPLICATION}";

/// Per-target timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

static TEMPLATE_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("template pattern is valid")
});

/// Immutable description of one deployment run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    application_name: String,
    source_path: PathBuf,
    copy_source_items: bool,
    mode: Mode,
    file: FileRef,
    arguments: Vec<String>,
    destination: String,
    timeout: Duration,
    targets: Vec<String>,
}

impl BatchConfig {
    /// Creates a builder
    #[must_use]
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::default()
    }

    /// Application being deployed
    #[must_use]
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// File or directory holding the items to deploy
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Whether source items are staged on the target first
    #[must_use]
    pub fn copy_source_items(&self) -> bool {
        self.copy_source_items
    }

    /// What to do on each target
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Script, package or product code acted on
    #[must_use]
    pub fn file(&self) -> &FileRef {
        &self.file
    }

    /// Arguments forwarded to the invoked process
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Unexpanded destination template
    #[must_use]
    pub fn destination_template(&self) -> &str {
        &self.destination
    }

    /// Per-target deadline
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Computers in submission order
    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Staging directory for a target
    ///
    /// `${APPLICATION}` and `${COMPUTER}` are substituted; unknown variables
    /// are left as written.
    #[must_use]
    pub fn destination_for(&self, target: &str) -> String {
        TEMPLATE_VAR
            .replace_all(&self.destination, |caps: &regex::Captures| {
                match caps.get(1).map(|m| m.as_str()) {
                    Some("APPLICATION") => self.application_name.clone(),
                    Some("COMPUTER") => target.to_string(),
                    _ => caps
                        .get(0)
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default(),
                }
            })
            .into_owned()
    }

    /// Path handed to the invoker
    ///
    /// A directory source keeps its layout, so `file` is joined as written
    /// onto the destination (staged) or the source (unstaged). A single
    /// staged file lands as the destination plus its file name, and an
    /// unstaged file is invoked from the source path itself. Product codes
    /// pass through untouched.
    #[must_use]
    pub fn invocation_path(&self, target: &str, staged: bool, source_is_dir: bool) -> String {
        if self.file.is_product_code() {
            return self.file.to_string();
        }
        let source = self.source_path.to_string_lossy();
        match (staged, source_is_dir) {
            (true, true) => join_path(&self.destination_for(target), &self.file.to_string()),
            (true, false) => join_path(&self.destination_for(target), &self.file.file_name()),
            (false, true) => join_path(&source, &self.file.to_string()),
            (false, false) => source.into_owned(),
        }
    }
}

impl Validate for BatchConfig {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.application_name.trim().is_empty() {
            return Err(ValidationError::EmptyApplicationName);
        }
        if self.source_path.as_os_str().is_empty() && !self.file.is_product_code() {
            return Err(ValidationError::EmptySourcePath);
        }
        if matches!(&self.file, FileRef::Path(p) if p.is_empty()) {
            return Err(ValidationError::EmptyFileReference);
        }
        if self.timeout.is_zero() {
            return Err(ValidationError::InvalidTimeout { value_ms: 0 });
        }
        if self.copy_source_items && self.destination.trim().is_empty() {
            return Err(ValidationError::EmptyDestination);
        }
        if self.targets.is_empty() {
            return Err(ValidationError::EmptyTargetList);
        }

        let mut seen = AHashSet::with_capacity(self.targets.len());
        for (index, target) in self.targets.iter().enumerate() {
            if target.trim().is_empty() {
                return Err(ValidationError::EmptyTarget { index });
            }
            if !seen.insert(target.to_ascii_lowercase()) {
                return Err(ValidationError::DuplicateTarget {
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Builder for [`BatchConfig`]
#[derive(Debug, Clone)]
pub struct BatchConfigBuilder {
    application_name: String,
    source_path: PathBuf,
    copy_source_items: bool,
    mode: Mode,
    file: String,
    arguments: Vec<String>,
    destination: String,
    timeout: Duration,
    targets: Vec<String>,
}

impl Default for BatchConfigBuilder {
    fn default() -> Self {
        Self {
            application_name: String::new(),
            source_path: PathBuf::new(),
            copy_source_items: false,
            mode: Mode::Install,
            file: String::new(),
            arguments: Vec::new(),
            destination: DEFAULT_DESTINATION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            targets: Vec::new(),
        }
    }
}

impl BatchConfigBuilder {
    /// Sets the application name
    #[must_use]
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    /// Sets the source path
    #[must_use]
    pub fn source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = path.into();
        self
    }

    /// Enables or disables staging
    #[must_use]
    pub fn copy_source_items(mut self, copy: bool) -> Self {
        self.copy_source_items = copy;
        self
    }

    /// Sets the mode
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the file reference (path or product code)
    #[must_use]
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    /// Sets the invocation arguments
    #[must_use]
    pub fn arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    /// Splits a command-line style argument string
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArguments`] on unbalanced quotes.
    pub fn arguments_line(self, line: &str) -> Result<Self, ValidationError> {
        let args =
            shell_words::split(line).map_err(|e| ValidationError::InvalidArguments(e.to_string()))?;
        Ok(self.arguments(args))
    }

    /// Sets the destination template
    #[must_use]
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Sets the per-target timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Appends one target
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    /// Replaces the target list
    #[must_use]
    pub fn targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Builds and validates the configuration
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn build(self) -> Result<BatchConfig, ValidationError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Builds without validation
    #[must_use]
    pub fn build_unchecked(self) -> BatchConfig {
        BatchConfig {
            application_name: self.application_name,
            source_path: self.source_path,
            copy_source_items: self.copy_source_items,
            mode: self.mode,
            file: FileRef::parse(&self.file),
            arguments: self.arguments,
            destination: self.destination,
            timeout: self.timeout,
            targets: self.targets.into_iter().map(|t| t.trim().to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> BatchConfigBuilder {
        BatchConfig::builder()
            .application_name("Agent")
            .source_path(r"\\share\packages\agent")
            .mode(Mode::Install)
            .file("setup.msi")
            .timeout(Duration::from_secs(5))
            .targets(["localhost", "PC2"])
    }

    #[test]
    fn test_build_valid_config() {
        let config = base().build().unwrap();
        assert_eq!(config.application_name(), "Agent");
        assert_eq!(config.mode(), Mode::Install);
        assert_eq!(config.targets(), ["localhost", "PC2"]);
        assert!(!config.copy_source_items());
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            base().application_name(" ").build().unwrap_err(),
            ValidationError::EmptyApplicationName
        );
        assert_eq!(
            base().timeout(Duration::ZERO).build().unwrap_err(),
            ValidationError::InvalidTimeout { value_ms: 0 }
        );
        assert_eq!(
            base().targets(Vec::<String>::new()).build().unwrap_err(),
            ValidationError::EmptyTargetList
        );
        assert_eq!(
            base().targets(["PC1", ""]).build().unwrap_err(),
            ValidationError::EmptyTarget { index: 1 }
        );
        assert_eq!(
            base().file("").build().unwrap_err(),
            ValidationError::EmptyFileReference
        );
        assert_eq!(
            base().copy_source_items(true).destination("").build().unwrap_err(),
            ValidationError::EmptyDestination
        );
    }

    #[test]
    fn test_duplicate_targets_are_case_insensitive() {
        let err = base().targets(["PC1", "pc1"]).build().unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateTarget {
                target: "pc1".to_string()
            }
        );
    }

    #[test]
    fn test_product_code_needs_no_source() {
        let config = base()
            .source_path("")
            .mode(Mode::Uninstall)
            .file("{3F2504E0-4F89-11D3-9A0C-0305E82C3301}")
            .build()
            .unwrap();
        assert!(config.file().is_product_code());
    }

    #[test]
    fn test_arguments_line() {
        let config = base()
            .arguments_line(r#"/quiet INSTALLDIR="C:\Program Files\Agent""#)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            config.arguments(),
            ["/quiet", r"INSTALLDIR=C:\Program Files\Agent"]
        );
        assert!(matches!(
            base().arguments_line("\"unterminated"),
            Err(ValidationError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_destination_expansion() {
        let config = base()
            .destination(r"C:\Deploy\${APPLICATION}\${COMPUTER}\${UNKNOWN}")
            .build()
            .unwrap();
        assert_eq!(
            config.destination_for("PC2"),
            r"C:\Deploy\Agent\PC2\${UNKNOWN}"
        );
    }

    #[test]
    fn test_invocation_path_variants() {
        let config = base().build().unwrap();
        assert_eq!(
            config.invocation_path("PC2", true, true),
            r"C:\Temp\Agent\setup.msi"
        );
        assert_eq!(
            config.invocation_path("PC2", false, true),
            r"\\share\packages\agent\setup.msi"
        );
        assert_eq!(
            config.invocation_path("PC2", false, false),
            r"\\share\packages\agent"
        );
    }

    #[test]
    fn test_invocation_path_keeps_relative_file_in_directory_sources() {
        let config = base().file(r"x64\setup.msi").build().unwrap();
        assert_eq!(
            config.invocation_path("PC2", true, true),
            r"C:\Temp\Agent\x64\setup.msi"
        );
        assert_eq!(
            config.invocation_path("PC2", false, true),
            r"\\share\packages\agent\x64\setup.msi"
        );
        assert_eq!(
            config.invocation_path("PC2", true, false),
            r"C:\Temp\Agent\setup.msi"
        );
    }

    #[test]
    fn test_invocation_path_for_product_code() {
        let config = base()
            .mode(Mode::Uninstall)
            .file("3f2504e0-4f89-11d3-9a0c-0305e82c3301")
            .build()
            .unwrap();
        assert_eq!(
            config.invocation_path("PC2", true, true),
            "{3F2504E0-4F89-11D3-9A0C-0305E82C3301}"
        );
    }
}
