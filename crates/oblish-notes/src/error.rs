//! Error types for the note graph.

use oblish_renderer::DocumentError;

/// Error returned when a note cannot be added to the store.
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    /// A document was already attached to a note with this title.
    #[error("Duplicate note title: {0}")]
    DuplicateTitle(String),
    /// The note source could not be parsed.
    #[error("Failed to parse note {title}: {source}")]
    Document {
        title: String,
        #[source]
        source: DocumentError,
    },
}

/// Error returned when link resolution fails.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The node sequence of a note is not properly nested.
    #[error("Malformed document in note {title}: {message}")]
    Structure { title: String, message: &'static str },
}
