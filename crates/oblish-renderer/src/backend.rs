//! Render backend trait for format-specific rendering.
//!
//! The generic renderer handles structure (paragraphs, lists, tables, inline
//! formatting); a backend decides how the format-specific elements are
//! written out.

use pulldown_cmark::BlockQuoteKind;

/// GitHub-style alert kind (`> [!NOTE]` and friends).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl From<BlockQuoteKind> for AlertKind {
    fn from(kind: BlockQuoteKind) -> Self {
        match kind {
            BlockQuoteKind::Note => Self::Note,
            BlockQuoteKind::Tip => Self::Tip,
            BlockQuoteKind::Important => Self::Important,
            BlockQuoteKind::Warning => Self::Warning,
            BlockQuoteKind::Caution => Self::Caution,
        }
    }
}

/// Backend trait for format-specific rendering operations.
pub trait RenderBackend {
    /// Render a code block.
    ///
    /// # Arguments
    ///
    /// * `lang` - Optional language identifier (e.g., "rust", "python")
    /// * `content` - The code content
    /// * `out` - Output buffer to write to
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    /// Render blockquote start tag.
    fn blockquote_start(out: &mut String);

    /// Render blockquote end tag.
    fn blockquote_end(out: &mut String);

    /// Render the opening of an alert block.
    fn alert_start(kind: AlertKind, out: &mut String);

    /// Render the closing of an alert block.
    fn alert_end(kind: AlertKind, out: &mut String);

    /// Render an image.
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    /// Render the opening tag of a note reference.
    ///
    /// `dead` is set when the referenced note has no content.
    fn reference_start(href: &str, dead: bool, out: &mut String);

    /// Render the closing tag of a note reference.
    fn reference_end(out: &mut String) {
        out.push_str("</a>");
    }

    /// Render a hard break.
    fn hard_break(out: &mut String) {
        out.push_str("<br>");
    }

    /// Render a horizontal rule.
    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr>");
    }

    /// Render a task list marker.
    fn task_list_marker(checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            out.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }
}
