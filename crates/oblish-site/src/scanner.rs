//! Vault discovery by filesystem walking.
//!
//! The scanner only classifies files: `.md` files become notes, everything
//! else is an asset copied verbatim. Nothing is read at this stage.

use std::fs;
use std::path::{Path, PathBuf};

use oblish_notes::NOTE_EXTENSION;

use crate::error::BuildError;

/// File found in the vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Path relative to the vault root.
    pub relative: PathBuf,
}

impl VaultFile {
    /// Note title for this file: the file name without `.md`.
    #[must_use]
    pub fn title(&self) -> String {
        let name = self
            .relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        oblish_notes::strip_extension(&name).to_owned()
    }
}

/// Result of scanning a vault.
#[derive(Debug, Default)]
pub struct VaultScan {
    /// Markdown files, sorted by relative path.
    pub notes: Vec<VaultFile>,
    /// Other files, sorted by relative path.
    pub assets: Vec<VaultFile>,
}

/// Walks a vault directory.
///
/// Directories whose name starts with `.` are skipped, as are explicitly
/// excluded directories (typically the output directory when it lives
/// inside the vault).
pub struct Scanner {
    vault_dir: PathBuf,
    excluded: Vec<PathBuf>,
}

impl Scanner {
    #[must_use]
    pub fn new(vault_dir: impl Into<PathBuf>) -> Self {
        Self {
            vault_dir: vault_dir.into(),
            excluded: Vec::new(),
        }
    }

    /// Skip `dir` and everything below it. Directories that do not exist yet
    /// are ignored.
    #[must_use]
    pub fn exclude(mut self, dir: &Path) -> Self {
        if let Ok(canonical) = fs::canonicalize(dir) {
            self.excluded.push(canonical);
        }
        self
    }

    /// Scan the vault.
    ///
    /// Unreadable subdirectories are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::VaultNotFound`] if the vault directory does not
    /// exist or is not a directory.
    pub fn scan(&self) -> Result<VaultScan, BuildError> {
        let root = fs::canonicalize(&self.vault_dir)
            .ok()
            .filter(|p| p.is_dir())
            .ok_or_else(|| BuildError::VaultNotFound(self.vault_dir.clone()))?;

        let mut scan = VaultScan::default();
        self.scan_directory(&root, Path::new(""), &mut scan);
        tracing::debug!(
            notes = scan.notes.len(),
            assets = scan.assets.len(),
            "Vault scan completed"
        );
        Ok(scan)
    }

    fn scan_directory(&self, dir_path: &Path, relative: &Path, scan: &mut VaultScan) {
        let entries = match fs::read_dir(dir_path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir_path.display(), error = %e, "Failed to read directory");
                return;
            }
        };

        // Collect entries with cached file_type to avoid repeated stat calls
        let mut entries: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| {
                let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
                (e.file_name(), e.path(), is_dir)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, path, is_dir) in entries {
            let child_relative = relative.join(&name);

            if is_dir {
                if name.to_string_lossy().starts_with('.') || self.excluded.contains(&path) {
                    continue;
                }
                self.scan_directory(&path, &child_relative, scan);
            } else if name.to_string_lossy().ends_with(NOTE_EXTENSION) {
                scan.notes.push(VaultFile {
                    path,
                    relative: child_relative,
                });
            } else {
                scan.assets.push(VaultFile {
                    path,
                    relative: child_relative,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn relative_paths(files: &[VaultFile]) -> Vec<PathBuf> {
        files.iter().map(|f| f.relative.clone()).collect()
    }

    #[test]
    fn test_scan_classifies_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        fs::write(dir.path().join("image.png"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/c.md"), "").unwrap();

        let scan = Scanner::new(dir.path()).scan().unwrap();

        assert_eq!(
            relative_paths(&scan.notes),
            vec![
                PathBuf::from("a.md"),
                PathBuf::from("b.md"),
                PathBuf::from("sub/c.md"),
            ]
        );
        assert_eq!(relative_paths(&scan.assets), vec![PathBuf::from("image.png")]);
    }

    #[test]
    fn test_scan_skips_dot_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".oblish")).unwrap();
        fs::write(dir.path().join(".oblish/config.toml"), "").unwrap();
        fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        fs::write(dir.path().join(".git/objects/x.md"), "").unwrap();
        fs::write(dir.path().join("note.md"), "").unwrap();

        let scan = Scanner::new(dir.path()).scan().unwrap();

        assert_eq!(relative_paths(&scan.notes), vec![PathBuf::from("note.md")]);
        assert!(scan.assets.is_empty());
    }

    #[test]
    fn test_dot_files_are_assets() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".nojekyll"), "").unwrap();

        let scan = Scanner::new(dir.path()).scan().unwrap();

        assert_eq!(relative_paths(&scan.assets), vec![PathBuf::from(".nojekyll")]);
    }

    #[test]
    fn test_scan_excludes_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("public")).unwrap();
        fs::write(dir.path().join("public/index.html"), "").unwrap();
        fs::write(dir.path().join("note.md"), "").unwrap();

        let scan = Scanner::new(dir.path())
            .exclude(&dir.path().join("public"))
            .scan()
            .unwrap();

        assert!(scan.assets.is_empty());
        assert_eq!(scan.notes.len(), 1);
    }

    #[test]
    fn test_scan_missing_vault() {
        let result = Scanner::new("/nonexistent/vault").scan();
        assert!(matches!(result, Err(BuildError::VaultNotFound(_))));
    }

    #[test]
    fn test_vault_file_title() {
        let file = VaultFile {
            path: PathBuf::from("/v/dir/My Note.md"),
            relative: PathBuf::from("dir/My Note.md"),
        };
        assert_eq!(file.title(), "My Note");
    }
}
