//! Wikilink resolution.
//!
//! Runs once every file of the vault is in the [`NoteStore`]. Each reference
//! is resolved by title, creating placeholders for missing notes, and
//! rewritten to the target's canonical path. The target gains a backlink to
//! the source note.
//!
//! The reference keeps the title it was written with, so resolving a store a
//! second time produces the same destinations and backlinks.

use oblish_renderer::{Document, Node, Reference};
use pulldown_cmark::Event;

use crate::error::ResolveError;
use crate::note::NoteId;
use crate::store::NoteStore;

/// Counters collected during one resolution pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// References visited.
    pub references: usize,
    /// References pointing at notes without content.
    pub dead_links: usize,
    /// Placeholder notes in the store after resolution.
    pub placeholders: usize,
}

/// Resolve every reference of every parsed note.
///
/// Notes are processed in title order. Any malformed document aborts the
/// pass.
pub fn resolve_links(store: &mut NoteStore) -> Result<ResolveStats, ResolveError> {
    let mut stats = ResolveStats::default();

    for id in store.ids() {
        let Some(mut document) = store.get_mut(id).take_document() else {
            continue;
        };
        let result = resolve_document(store, id, &mut document, &mut stats);
        store.get_mut(id).restore_document(document);
        result?;
    }

    stats.placeholders = store.placeholder_count();
    tracing::debug!(
        references = stats.references,
        dead_links = stats.dead_links,
        placeholders = stats.placeholders,
        "Resolved links"
    );
    Ok(stats)
}

fn resolve_document(
    store: &mut NoteStore,
    source: NoteId,
    document: &mut Document,
    stats: &mut ResolveStats,
) -> Result<(), ResolveError> {
    let mut depth = 0usize;
    let mut failure = None;
    for node in document.nodes_mut() {
        match node {
            Node::Event(Event::Start(_)) => depth += 1,
            Node::Event(Event::End(_)) => {
                if let Some(remaining) = depth.checked_sub(1) {
                    depth = remaining;
                } else {
                    failure = Some("end tag without matching start");
                    break;
                }
            }
            Node::Event(_) => {}
            Node::Reference(reference) => resolve_reference(store, source, reference, stats),
        }
    }

    if failure.is_none() && depth != 0 {
        failure = Some("unclosed start tag");
    }
    match failure {
        Some(message) => Err(ResolveError::Structure {
            title: store.get(source).title().to_owned(),
            message,
        }),
        None => Ok(()),
    }
}

fn resolve_reference(
    store: &mut NoteStore,
    source: NoteId,
    reference: &mut Reference,
    stats: &mut ResolveStats,
) {
    stats.references += 1;

    // In-page links (`[[#Heading]]`) point back at the source itself.
    let target = if reference.target().is_empty() {
        source
    } else {
        let target = store.get_or_create(reference.target());
        let source_title = store.get(source).title().to_owned();
        store.get_mut(target).add_backlink(source_title, source);
        target
    };

    let note = store.get(target);
    let dead = note.is_placeholder();
    reference.set_destination(note.path());
    reference.set_dead(dead);
    if dead {
        stats.dead_links += 1;
    }
}
