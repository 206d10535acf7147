//! File staging collaborator
//!
//! Remote destinations are reached through the target's administrative
//! share, so `C:\Temp\App` on `PC1` becomes `\\PC1\C$\Temp\App`. Local
//! destinations are used as written.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::deploy::Location;
use crate::executor::Transfer;

static DRIVE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]):[\\/]?(.*)$").expect("drive pattern is valid"));

/// Copies through the local filesystem or an administrative share
#[derive(Debug, Clone, Copy, Default)]
pub struct ShareTransfer;

impl ShareTransfer {
    /// Creates a share transfer
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Filesystem path under which `destination` on `target` is reachable
    #[must_use]
    pub fn resolve(target: &str, destination: &str) -> PathBuf {
        if Location::for_target(target) == Location::Local || destination.starts_with(r"\\") {
            return PathBuf::from(destination);
        }

        match DRIVE_PATH.captures(destination) {
            Some(caps) => {
                let drive = caps.get(1).map_or("C", |m| m.as_str());
                let rest = caps.get(2).map_or("", |m| m.as_str()).replace('/', r"\");
                if rest.is_empty() {
                    PathBuf::from(format!(r"\\{target}\{drive}$"))
                } else {
                    PathBuf::from(format!(r"\\{target}\{drive}$\{rest}"))
                }
            }
            None => PathBuf::from(format!(
                r"\\{target}\{}",
                destination.trim_start_matches(['\\', '/'])
            )),
        }
    }
}

async fn copy_tree(source: &Path, destination: &Path) -> io::Result<()> {
    let mut pending = vec![(source.to_path_buf(), destination.to_path_buf())];

    while let Some((from, to)) = pending.pop() {
        tokio::fs::create_dir_all(&to).await?;
        let mut entries = tokio::fs::read_dir(&from).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let dest = to.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                pending.push((path, dest));
            } else {
                tokio::fs::copy(&path, &dest).await?;
            }
        }
    }
    Ok(())
}

#[async_trait]
impl Transfer for ShareTransfer {
    async fn is_directory(&self, source: &Path) -> bool {
        tokio::fs::metadata(source)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn copy_file(&self, target: &str, source: &Path, destination: &str) -> io::Result<()> {
        let dir = Self::resolve(target, destination);
        let name = source
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"))?;

        debug!(target = %target, from = %source.display(), to = %dir.display(), "Copying file");
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::copy(source, dir.join(name)).await?;
        Ok(())
    }

    async fn copy_directory(
        &self,
        target: &str,
        source: &Path,
        destination: &str,
    ) -> io::Result<()> {
        let dir = Self::resolve(target, destination);
        debug!(
            target = %target,
            from = %source.display(),
            to = %dir.display(),
            "Copying directory"
        );
        copy_tree(source, &dir).await
    }

    async fn remove_directory(&self, target: &str, path: &str) -> io::Result<()> {
        let dir = Self::resolve(target, path);
        debug!(target = %target, path = %dir.display(), "Removing staged directory");
        tokio::fs::remove_dir_all(dir).await
    }
}
