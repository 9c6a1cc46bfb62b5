//! Note records.

use std::collections::BTreeMap;
use std::path::{Component, Path};

use oblish_renderer::Document;

use crate::metadata::Metadata;
use crate::slug::slugify;

/// Stable identity of a note inside a [`NoteStore`](crate::NoteStore).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId(pub(crate) usize);

/// One note of the vault, either parsed from a file or a placeholder created
/// because another note links to it.
#[derive(Debug)]
pub struct Note {
    id: NoteId,
    title: String,
    raw_content: String,
    document: Option<Document>,
    /// Set once a document is attached; stays set while the resolver has the
    /// document checked out.
    parsed: bool,
    metadata: Metadata,
    /// Validated `slug` front matter value, without the leading `/`.
    explicit_slug: Option<String>,
    backlinks: BTreeMap<String, NoteId>,
}

impl Note {
    pub(crate) fn placeholder(id: NoteId, title: String) -> Self {
        Self {
            id,
            title,
            raw_content: String::new(),
            document: None,
            parsed: false,
            metadata: Metadata::default(),
            explicit_slug: None,
            backlinks: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> NoteId {
        self.id
    }

    /// Note title: the file name without its `.md` extension.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Original markdown source. Empty for placeholders.
    #[must_use]
    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    /// Parsed body, absent for placeholders.
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Notes linking here, keyed by source title.
    #[must_use]
    pub fn backlinks(&self) -> &BTreeMap<String, NoteId> {
        &self.backlinks
    }

    /// Whether no document was ever attached to this note.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        !self.parsed
    }

    /// Whether the note is flagged as the site index.
    #[must_use]
    pub fn is_index(&self) -> bool {
        self.metadata.is_index()
    }

    /// URL slug: the explicit `slug` front matter value, or the slugified
    /// title.
    ///
    /// An explicit slug that would leave the output directory (`..`, `.`,
    /// root or prefix components) is ignored when the document is attached.
    #[must_use]
    pub fn slug(&self) -> String {
        match &self.explicit_slug {
            Some(slug) => slug.clone(),
            None => slugify(&self.title),
        }
    }

    /// Canonical link destination, `/` followed by the slug.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}", self.slug())
    }

    /// Record a backlink from `source`. The first edge for a source title
    /// wins; returns `false` if one already existed.
    pub fn add_backlink(&mut self, title: impl Into<String>, source: NoteId) -> bool {
        let title = title.into();
        if self.backlinks.contains_key(&title) {
            return false;
        }
        self.backlinks.insert(title, source);
        true
    }

    pub(crate) fn attach(&mut self, raw_content: String, document: Document, metadata: Metadata) {
        self.explicit_slug = metadata.slug().and_then(|slug| {
            let slug = slug.trim_start_matches('/');
            if is_contained(slug) {
                Some(slug.to_owned())
            } else {
                tracing::warn!(
                    note = %self.title,
                    slug,
                    "Ignoring slug outside the output directory"
                );
                None
            }
        });
        self.raw_content = raw_content;
        self.document = Some(document);
        self.metadata = metadata;
        self.parsed = true;
    }

    pub(crate) fn take_document(&mut self) -> Option<Document> {
        self.document.take()
    }

    pub(crate) fn restore_document(&mut self, document: Document) {
        self.document = Some(document);
    }
}

/// Whether `slug` is made of plain path segments only.
fn is_contained(slug: &str) -> bool {
    Path::new(slug)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}
