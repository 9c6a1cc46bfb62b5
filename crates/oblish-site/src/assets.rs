//! Copying non-note files into the output directory.
//!
//! Copying is best effort: a file that fails to copy is logged and counted,
//! and the build carries on.

use std::fs;
use std::path::Path;

use oblish_config::CopyEntry;

use crate::error::BuildError;
use crate::scanner::VaultFile;

/// Outcome of a copy pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Files written.
    pub copied: usize,
    /// Files that failed to copy.
    pub failed: usize,
}

impl CopyReport {
    fn merge(&mut self, other: Self) {
        self.copied += other.copied;
        self.failed += other.failed;
    }

    fn record(&mut self, src: &Path, result: Result<(), BuildError>) {
        match result {
            Ok(()) => self.copied += 1,
            Err(e) => {
                tracing::warn!(path = %src.display(), error = %e, "Failed to copy file");
                self.failed += 1;
            }
        }
    }
}

/// Copy one file, creating parent directories and overwriting the target.
pub fn copy_file(src: &Path, dst: &Path) -> Result<(), BuildError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    fs::copy(src, dst).map_err(|e| BuildError::io(src, e))?;
    Ok(())
}

/// Copy vault assets to the same relative paths under `destination`.
pub fn copy_assets(assets: &[VaultFile], destination: &Path) -> CopyReport {
    let mut report = CopyReport::default();
    for asset in assets {
        report.record(
            &asset.path,
            copy_file(&asset.path, &destination.join(&asset.relative)),
        );
    }
    report
}

/// Copy a configured entry: `<base>/<relative>` to `<destination>/<relative>`.
///
/// Directories are copied recursively.
///
/// # Errors
///
/// Returns [`BuildError::CopySourceNotFound`] if the source does not exist.
/// Failures on individual files are only counted.
pub fn copy_entry(entry: &CopyEntry, destination: &Path) -> Result<CopyReport, BuildError> {
    let src = entry.base.join(&entry.relative);
    let dst = destination.join(&entry.relative);

    let metadata =
        fs::metadata(&src).map_err(|_| BuildError::CopySourceNotFound(src.clone()))?;

    let mut report = CopyReport::default();
    if metadata.is_dir() {
        report.merge(copy_dir(&src, &dst));
    } else {
        report.record(&src, copy_file(&src, &dst));
    }
    Ok(report)
}

fn copy_dir(src: &Path, dst: &Path) -> CopyReport {
    let mut report = CopyReport::default();
    let entries = match fs::read_dir(src) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %src.display(), error = %e, "Failed to read directory");
            report.failed += 1;
            return report;
        }
    };

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let target = dst.join(entry.file_name());
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            report.merge(copy_dir(&path, &target));
        } else {
            report.record(&path, copy_file(&path, &target));
        }
    }
    report
}
