//! Note title and slug helpers.

/// Markdown file extension stripped from titles.
pub const NOTE_EXTENSION: &str = ".md";

/// Strip a trailing `.md` extension from a title.
#[must_use]
pub fn strip_extension(title: &str) -> &str {
    title.strip_suffix(NOTE_EXTENSION).unwrap_or(title)
}

/// Compute the URL slug for a note title.
///
/// Lowercases the title, drops everything outside `[a-z0-9 ]` and joins the
/// remaining words with single dashes. Titles with nothing left produce an
/// empty slug.
///
/// ```
/// use oblish_notes::slugify;
///
/// assert_eq!(slugify("My Note! 😀"), "my-note");
/// assert_eq!(slugify("Meeting notes.md"), "meeting-notes");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let kept: String = strip_extension(title)
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join("-")
}
