//! Note graph for a vault of wiki-linked markdown notes.
//!
//! A build fills a [`NoteStore`] with every note of the vault and registers
//! their tags in a [`TagIndex`]. Once all notes are known,
//! [`resolve_links`] rewrites each `[[wikilink]]` to its target's canonical
//! path and records backlinks. Targets that were never parsed exist as
//! placeholder notes.
//!
//! # Example
//!
//! ```
//! use oblish_notes::{NoteStore, TagIndex, resolve_links};
//!
//! let mut store = NoteStore::new();
//! let a = store.add_source("A.md", "---\ntags: draft\n---\n\nSee [[B]].").unwrap();
//!
//! let mut tags = TagIndex::new();
//! tags.index_note(store.get(a));
//!
//! let stats = resolve_links(&mut store).unwrap();
//! assert_eq!(stats.dead_links, 1);
//!
//! let b = store.find("B").unwrap();
//! assert!(store.get(b).is_placeholder());
//! assert!(store.get(b).backlinks().contains_key("A"));
//! ```

mod error;
mod links;
mod metadata;
mod note;
mod slug;
mod store;
mod tags;

pub use error::{NoteError, ResolveError};
pub use links::{ResolveStats, resolve_links};
pub use metadata::Metadata;
pub use note::{Note, NoteId};
pub use slug::{NOTE_EXTENSION, slugify, strip_extension};
pub use store::NoteStore;
pub use tags::{NormalizedTags, TagIndex, TagsValue, normalize_tags};
