//! Build errors.

use std::path::PathBuf;

use oblish_notes::{NoteError, ResolveError};

/// Error returned when building a site fails.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Vault directory does not exist.
    #[error("Vault directory not found: {}", .0.display())]
    VaultNotFound(PathBuf),
    /// I/O error on a specific path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A configured copy source does not exist.
    #[error("Copy source not found: {}", .0.display())]
    CopySourceNotFound(PathBuf),
    /// Note could not be added to the store.
    #[error(transparent)]
    Note(#[from] NoteError),
    /// Link resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Template failed to compile or render.
    #[error("Template error while rendering {page}: {source}")]
    Template {
        page: String,
        #[source]
        source: minijinja::Error,
    },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
