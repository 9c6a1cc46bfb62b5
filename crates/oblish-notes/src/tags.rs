//! Tag normalization and the tag index.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use crate::note::{Note, NoteId};

static TAG_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\s]+").expect("invalid tag delimiter regex"));

/// Raw `tags` front matter value.
#[derive(Clone, Debug, PartialEq)]
pub enum TagsValue {
    /// `tags: a, b c`
    Single(String),
    /// `tags: [a, b]`
    Sequence(Vec<Value>),
}

/// Result of [`normalize_tags`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizedTags {
    /// Tags in declaration order, duplicates preserved.
    pub tags: Vec<String>,
    /// Number of sequence entries that were not strings.
    pub discarded: usize,
}

/// Normalize a raw tags value into a list of tag names.
///
/// A single string is split on runs of commas and whitespace. A sequence
/// keeps its string entries in order and counts the rest as discarded.
#[must_use]
pub fn normalize_tags(value: &TagsValue) -> NormalizedTags {
    match value {
        TagsValue::Single(tags) => NormalizedTags {
            tags: TAG_DELIMITER
                .split(tags)
                .filter(|tag| !tag.is_empty())
                .map(str::to_owned)
                .collect(),
            discarded: 0,
        },
        TagsValue::Sequence(items) => {
            let mut normalized = NormalizedTags::default();
            for item in items {
                match item {
                    Value::String(tag) => normalized.tags.push(tag.clone()),
                    _ => normalized.discarded += 1,
                }
            }
            normalized
        }
    }
}

/// Mapping from tag name to the notes declaring it.
///
/// Tags iterate in lexicographic order; notes of one tag keep registration
/// order. A note declaring a tag twice appears twice.
#[derive(Debug, Default)]
pub struct TagIndex {
    tags: BTreeMap<String, Vec<NoteId>>,
}

impl TagIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one tag for a note.
    pub fn add(&mut self, tag: impl Into<String>, note: NoteId) {
        self.tags.entry(tag.into()).or_default().push(note);
    }

    /// Register every tag declared in the note's front matter.
    ///
    /// Returns the number of tags registered.
    pub fn index_note(&mut self, note: &Note) -> usize {
        let Some(value) = note.metadata().tags() else {
            return 0;
        };

        let normalized = normalize_tags(&value);
        if normalized.discarded > 0 {
            tracing::debug!(
                note = note.title(),
                discarded = normalized.discarded,
                "Discarded non-string tags"
            );
        }

        let count = normalized.tags.len();
        for tag in normalized.tags {
            self.add(tag, note.id());
        }
        count
    }

    /// Notes declaring `tag`, in registration order.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&[NoteId]> {
        self.tags.get(tag).map(Vec::as_slice)
    }

    /// Iterate over tags in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[NoteId])> + '_ {
        self.tags
            .iter()
            .map(|(tag, notes)| (tag.as_str(), notes.as_slice()))
    }

    /// Number of distinct tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
