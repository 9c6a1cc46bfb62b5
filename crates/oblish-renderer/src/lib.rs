//! Markdown document model and trait-based renderer for wiki-linked notes.
//!
//! [`Document::parse`] turns note source into a node sequence where every
//! `[[wikilink]]` is a [`Reference`] node, splitting off the YAML front
//! matter. References can be rewritten in place (destination, dead-link
//! marker) and the document is then rendered by [`MarkdownRenderer`].
//!
//! # Architecture
//!
//! The renderer uses a trait-based abstraction to handle format-specific differences:
//! - [`HtmlBackend`]: Produces semantic HTML5, marking dead references with
//!   the [`PLACEHOLDER_CLASS`] class
//!
//! Shared functionality (tables, lists, inline formatting) is handled by the
//! generic renderer, while format-specific elements (code blocks, blockquotes,
//! images, references) are delegated to the backend.
//!
//! # Example
//!
//! ```
//! use oblish_renderer::{Document, HtmlBackend, MarkdownRenderer, Node};
//!
//! let mut parsed = Document::parse("See [[Other Note]].").unwrap();
//! for node in parsed.document.nodes_mut() {
//!     if let Node::Reference(reference) = node {
//!         reference.set_destination("/other-note");
//!     }
//! }
//! let result = MarkdownRenderer::<HtmlBackend>::new().render(&parsed.document);
//! assert_eq!(result.html, r#"<p>See <a href="/other-note">Other Note</a>.</p>"#);
//! ```

mod backend;
mod document;
mod html;
mod renderer;
mod state;

pub use backend::{AlertKind, RenderBackend};
pub use document::{Document, DocumentError, Node, ParsedDocument, Reference, parser_options};
pub use html::{HtmlBackend, PLACEHOLDER_CLASS};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, anchor_id, escape_html};
