//! Title-keyed note registry.
//!
//! Notes live in a flat arena addressed by [`NoteId`]; a title index maps
//! each title to its single entry. Placeholders are created on first lookup
//! so links may point at notes that are parsed later or never exist.

use std::collections::BTreeMap;

use oblish_renderer::Document;

use crate::error::NoteError;
use crate::metadata::Metadata;
use crate::note::{Note, NoteId};
use crate::slug::strip_extension;

/// Registry of every note known in one build.
#[derive(Debug, Default)]
pub struct NoteStore {
    notes: Vec<Note>,
    by_title: BTreeMap<String, NoteId>,
    index: Option<NoteId>,
}

impl NoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the note for `title`, registering a placeholder on first use.
    ///
    /// A trailing `.md` is ignored, so a file name and a link to it name the
    /// same note. Calling this repeatedly with one title always yields the
    /// same identity.
    pub fn get_or_create(&mut self, title: &str) -> NoteId {
        let title = strip_extension(title);
        if let Some(&id) = self.by_title.get(title) {
            return id;
        }

        let id = NoteId(self.notes.len());
        self.notes.push(Note::placeholder(id, title.to_owned()));
        self.by_title.insert(title.to_owned(), id);
        id
    }

    /// Look up an existing note by title without creating it.
    #[must_use]
    pub fn find(&self, title: &str) -> Option<NoteId> {
        self.by_title.get(strip_extension(title)).copied()
    }

    /// Get a note by identity.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different store.
    #[must_use]
    pub fn get(&self, id: NoteId) -> &Note {
        &self.notes[id.0]
    }

    /// Get a note by identity for mutation.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different store.
    pub fn get_mut(&mut self, id: NoteId) -> &mut Note {
        &mut self.notes[id.0]
    }

    /// Attach parsed content to the note named `title`.
    ///
    /// Each title accepts content once; later attempts fail with
    /// [`NoteError::DuplicateTitle`] and leave the existing note untouched.
    pub fn attach_document(
        &mut self,
        title: &str,
        raw_content: String,
        document: Document,
        metadata: Metadata,
    ) -> Result<NoteId, NoteError> {
        let id = self.get_or_create(title);
        let note = self.get_mut(id);
        if !note.is_placeholder() {
            return Err(NoteError::DuplicateTitle(note.title().to_owned()));
        }
        note.attach(raw_content, document, metadata);

        if note.is_index() {
            self.set_index(id);
        }
        Ok(id)
    }

    /// Parse markdown source and attach it to the note named `title`.
    pub fn add_source(&mut self, title: &str, source: &str) -> Result<NoteId, NoteError> {
        if let Some(id) = self.find(title)
            && !self.get(id).is_placeholder()
        {
            return Err(NoteError::DuplicateTitle(self.get(id).title().to_owned()));
        }

        let parsed = Document::parse(source).map_err(|source| NoteError::Document {
            title: strip_extension(title).to_owned(),
            source,
        })?;
        self.attach_document(
            title,
            source.to_owned(),
            parsed.document,
            Metadata::new(parsed.front_matter),
        )
    }

    /// Designate the index note. The first designation wins; returns
    /// `false` if another note already holds it.
    pub fn set_index(&mut self, id: NoteId) -> bool {
        match self.index {
            Some(current) if current == id => true,
            Some(current) => {
                tracing::warn!(
                    note = self.get(id).title(),
                    index = self.get(current).title(),
                    "Ignoring additional index note"
                );
                false
            }
            None => {
                self.index = Some(id);
                true
            }
        }
    }

    /// The note rendered at the site root, if any.
    #[must_use]
    pub fn index(&self) -> Option<NoteId> {
        self.index
    }

    /// Iterate over all notes ordered by title.
    pub fn iter(&self) -> impl Iterator<Item = &Note> + '_ {
        self.by_title.values().map(|&id| self.get(id))
    }

    /// Identities of all notes ordered by title.
    #[must_use]
    pub fn ids(&self) -> Vec<NoteId> {
        self.by_title.values().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Number of notes without content.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.notes.iter().filter(|note| note.is_placeholder()).count()
    }
}
