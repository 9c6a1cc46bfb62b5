//! HTML backend for markdown rendering.

use std::fmt::Write;

use crate::backend::{AlertKind, RenderBackend};
use crate::state::escape_html;

/// CSS class carried by references to notes without content.
pub const PLACEHOLDER_CLASS: &str = "placeholder";

/// HTML render backend.
///
/// Produces semantic HTML5 with `<pre><code>` code blocks, `<blockquote>`
/// quotes, GitHub-style alert containers and `<a>` note references.
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        if let Some(lang) = lang {
            write!(
                out,
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(content)
            )
            .unwrap();
        } else {
            write!(out, "<pre><code>{}</code></pre>", escape_html(content)).unwrap();
        }
    }

    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>");
    }

    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>");
    }

    fn alert_start(kind: AlertKind, out: &mut String) {
        let (class, title) = match kind {
            AlertKind::Note => ("note", "Note"),
            AlertKind::Tip => ("tip", "Tip"),
            AlertKind::Important => ("important", "Important"),
            AlertKind::Warning => ("warning", "Warning"),
            AlertKind::Caution => ("caution", "Caution"),
        };
        write!(
            out,
            r#"<div class="alert alert-{class}"><div class="alert-title">{title}</div><div class="alert-content">"#
        )
        .unwrap();
    }

    fn alert_end(_kind: AlertKind, out: &mut String) {
        out.push_str("</div></div>");
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        write!(
            out,
            r#"<img src="{}"{title_attr} alt="{}">"#,
            escape_html(src),
            escape_html(alt)
        )
        .unwrap();
    }

    fn reference_start(href: &str, dead: bool, out: &mut String) {
        if dead {
            write!(
                out,
                r#"<a href="{}" class="{PLACEHOLDER_CLASS}">"#,
                escape_html(href)
            )
            .unwrap();
        } else {
            write!(out, r#"<a href="{}">"#, escape_html(href)).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_with_language() {
        let mut out = String::new();
        HtmlBackend::code_block(Some("rust"), "fn main() {}", &mut out);
        assert_eq!(
            out,
            r#"<pre><code class="language-rust">fn main() {}</code></pre>"#
        );
    }

    #[test]
    fn test_code_block_without_language() {
        let mut out = String::new();
        HtmlBackend::code_block(None, "a < b", &mut out);
        assert_eq!(out, "<pre><code>a &lt; b</code></pre>");
    }

    #[test]
    fn test_image_with_title() {
        let mut out = String::new();
        HtmlBackend::image("image.png", "Alt text", "Image title", &mut out);
        assert_eq!(
            out,
            r#"<img src="image.png" title="Image title" alt="Alt text">"#
        );
    }

    #[test]
    fn test_alert_warning() {
        let mut out = String::new();
        HtmlBackend::alert_start(AlertKind::Warning, &mut out);
        HtmlBackend::alert_end(AlertKind::Warning, &mut out);
        assert!(out.contains(r#"class="alert alert-warning""#));
        assert!(out.contains("Warning"));
    }

    #[test]
    fn test_reference_live() {
        let mut out = String::new();
        HtmlBackend::reference_start("/other-note", false, &mut out);
        HtmlBackend::reference_end(&mut out);
        assert_eq!(out, r#"<a href="/other-note"></a>"#);
    }

    #[test]
    fn test_reference_dead_has_placeholder_class() {
        let mut out = String::new();
        HtmlBackend::reference_start("/missing", true, &mut out);
        assert_eq!(out, r#"<a href="/missing" class="placeholder">"#);
    }
}
