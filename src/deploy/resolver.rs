//! Action resolution
//!
//! Maps a mode and a file reference to the operation to invoke. Path based
//! operations live in one table keyed by `(mode, extension)`; extending the
//! tool with a new file type means adding a row, nothing else.
//!
//! Product codes are only meaningful for [`Mode::Uninstall`] and always
//! resolve to [`OperationKind::UninstallProductCode`]. There is no extension
//! to inspect on a GUID, so no MSI/MSP distinction is made for them.

use super::errors::TargetError;
use super::types::{FileRef, Location, Mode, Operation, OperationKind};

/// Path based dispatch table: mode, lowercase extension, operation
const PATH_OPERATIONS: &[(Mode, &str, OperationKind)] = &[
    (Mode::RunScript, "ps1", OperationKind::RunPowerShellScript),
    (Mode::RunScript, "bat", OperationKind::RunBatchScript),
    (Mode::RunScript, "cmd", OperationKind::RunBatchScript),
    (Mode::Install, "msi", OperationKind::InstallMsi),
    (Mode::Install, "msp", OperationKind::InstallMsp),
    (Mode::Install, "exe", OperationKind::InstallExe),
    (Mode::Repair, "msi", OperationKind::RepairMsi),
    (Mode::Repair, "msp", OperationKind::RepairMsp),
    (Mode::Repair, "exe", OperationKind::RepairExe),
    (Mode::Uninstall, "msi", OperationKind::UninstallMsi),
    (Mode::Uninstall, "msp", OperationKind::UninstallMsp),
    (Mode::Uninstall, "exe", OperationKind::UninstallExe),
];

/// Resolves the operation for a target
///
/// # Errors
///
/// Returns [`TargetError::UnsupportedFileType`] when no row matches.
pub fn resolve(location: Location, mode: Mode, file: &FileRef) -> Result<Operation, TargetError> {
    resolve_kind(mode, file).map(|kind| Operation { kind, location })
}

/// Resolves the location independent part of an operation
///
/// # Errors
///
/// Returns [`TargetError::UnsupportedFileType`] when no row matches.
pub fn resolve_kind(mode: Mode, file: &FileRef) -> Result<OperationKind, TargetError> {
    let unsupported = || TargetError::UnsupportedFileType {
        mode,
        file: file.to_string(),
    };

    match file {
        FileRef::ProductCode(_) if mode == Mode::Uninstall => {
            Ok(OperationKind::UninstallProductCode)
        }
        FileRef::ProductCode(_) => Err(unsupported()),
        FileRef::Path(_) => {
            let ext = file.extension().ok_or_else(unsupported)?;
            PATH_OPERATIONS
                .iter()
                .find(|(m, e, _)| *m == mode && *e == ext)
                .map(|(_, _, kind)| *kind)
                .ok_or_else(unsupported)
        }
    }
}

/// Extensions accepted for a mode, in table order
#[must_use]
pub fn supported_extensions(mode: Mode) -> Vec<&'static str> {
    PATH_OPERATIONS
        .iter()
        .filter(|(m, _, _)| *m == mode)
        .map(|(_, e, _)| *e)
        .collect()
}
