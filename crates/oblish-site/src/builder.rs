//! Whole-vault build.
//!
//! The build runs in strict phases, each finishing before the next starts:
//!
//! 1. scan the vault
//! 2. parse every note and register its tags
//! 3. copy assets and configured copy entries (best effort per file)
//! 4. resolve links across the complete note store
//! 5. render note pages and the tag page

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::PathBuf;

use oblish_config::Config;
use oblish_notes::{NoteError, NoteStore, ResolveStats, TagIndex, resolve_links};

use crate::assets::{CopyReport, copy_assets, copy_entry};
use crate::error::BuildError;
use crate::render::{SiteRenderer, TAGS_DIR};
use crate::scanner::{Scanner, VaultFile};

/// Note file skipped because an earlier file has the same title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateNote {
    pub title: String,
    /// File that provided the note.
    pub kept: PathBuf,
    /// File that was ignored.
    pub skipped: PathBuf,
}

/// Generated page whose output file a note slug can land on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReservedPage {
    /// `<destination>/index.html`, taken by the index note.
    SiteIndex,
    /// `<destination>/tags/index.html`, taken by the tag page.
    TagPage,
}

impl fmt::Display for ReservedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SiteIndex => f.write_str("site index"),
            Self::TagPage => f.write_str("tag page"),
        }
    }
}

/// Notes rendered to the same output directory, or onto a generated page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlugCollision {
    pub slug: String,
    pub titles: Vec<String>,
    /// Generated page sharing the slug. It is written last and wins.
    pub reserved: Option<ReservedPage>,
}

/// Summary of a finished build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Notes parsed from files.
    pub notes: usize,
    /// Placeholder notes created for missing link targets.
    pub placeholders: usize,
    /// Distinct tags.
    pub tags: usize,
    /// Note pages written (the index note counts twice).
    pub pages: usize,
    /// Path of the tag page, when rendered.
    pub tags_page: Option<PathBuf>,
    pub resolve: ResolveStats,
    pub assets: CopyReport,
    pub duplicates: Vec<DuplicateNote>,
    pub slug_collisions: Vec<SlugCollision>,
}

impl BuildReport {
    /// Whether anything worth a warning happened.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.assets.failed > 0 || !self.duplicates.is_empty() || !self.slug_collisions.is_empty()
    }
}

/// Builds a static site from a vault.
pub struct SiteBuilder<'a> {
    config: &'a Config,
}

impl<'a> SiteBuilder<'a> {
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Run all build phases.
    ///
    /// # Errors
    ///
    /// Fails on a missing vault, unreadable or malformed notes, a missing
    /// copy source, malformed documents during resolution and any render
    /// failure. Individual asset copy failures are only reported.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let destination = &self.config.destination;
        let mut report = BuildReport::default();

        fs::create_dir_all(destination).map_err(|e| BuildError::io(destination, e))?;

        let scan = Scanner::new(&self.config.vault_dir)
            .exclude(destination)
            .scan()?;

        let mut store = NoteStore::new();
        let mut tags = TagIndex::new();
        report.duplicates = parse_notes(&scan.notes, &mut store, &mut tags)?;
        report.notes = scan.notes.len() - report.duplicates.len();
        report.tags = tags.len();
        tracing::info!(notes = report.notes, tags = report.tags, "Parsed vault");

        report.assets = copy_assets(&scan.assets, destination);
        for entry in &self.config.copy {
            let copied = copy_entry(entry, destination)?;
            report.assets.copied += copied.copied;
            report.assets.failed += copied.failed;
        }
        tracing::info!(
            copied = report.assets.copied,
            failed = report.assets.failed,
            "Copied assets"
        );

        report.resolve = resolve_links(&mut store)?;
        report.placeholders = report.resolve.placeholders;
        tracing::info!(
            references = report.resolve.references,
            dead_links = report.resolve.dead_links,
            placeholders = report.resolve.placeholders,
            "Resolved links"
        );

        report.slug_collisions =
            find_slug_collisions(&store, self.config.tags_template.is_some());

        let renderer = SiteRenderer::new(destination, &self.config.vars)
            .with_hard_wraps(self.config.hard_wraps);
        report.pages = renderer.render_notes(&store, &self.config.note_template.source)?;
        if let Some(template) = &self.config.tags_template {
            report.tags_page = Some(renderer.render_tags(&store, &tags, &template.source)?);
        }
        tracing::info!(pages = report.pages, "Rendered site");

        Ok(report)
    }
}

/// Parse note files in order, skipping files whose title is already taken.
fn parse_notes(
    files: &[VaultFile],
    store: &mut NoteStore,
    tags: &mut TagIndex,
) -> Result<Vec<DuplicateNote>, BuildError> {
    let mut sources: HashMap<String, PathBuf> = HashMap::new();
    let mut duplicates = Vec::new();

    for file in files {
        let title = file.title();
        if let Some(kept) = sources.get(&title) {
            tracing::warn!(
                title = %title,
                kept = %kept.display(),
                skipped = %file.relative.display(),
                "Duplicate note title"
            );
            duplicates.push(DuplicateNote {
                title,
                kept: kept.clone(),
                skipped: file.relative.clone(),
            });
            continue;
        }

        let source = fs::read_to_string(&file.path).map_err(|e| BuildError::io(&file.path, e))?;
        let id = match store.add_source(&title, &source) {
            Ok(id) => id,
            // Titles are deduplicated above, so this only guards the store.
            Err(NoteError::DuplicateTitle(title)) => {
                tracing::warn!(title = %title, "Note already has content");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        tags.index_note(store.get(id));
        sources.insert(title, file.relative.clone());
    }

    Ok(duplicates)
}

/// Group notes sharing a slug, including slugs that land on the root page
/// (when an index note exists) or on the tag page (when it is rendered).
/// Each collision is logged.
fn find_slug_collisions(store: &NoteStore, tags_page: bool) -> Vec<SlugCollision> {
    let index_title = store.index().map(|id| store.get(id).title());
    let mut by_slug: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for note in store.iter() {
        by_slug
            .entry(note.slug())
            .or_default()
            .push(note.title().to_owned());
    }

    by_slug
        .into_iter()
        .filter_map(|(slug, titles)| {
            let reserved = if slug.is_empty()
                && index_title.is_some_and(|index| titles.iter().any(|t| t != index))
            {
                Some(ReservedPage::SiteIndex)
            } else if tags_page && slug == TAGS_DIR {
                Some(ReservedPage::TagPage)
            } else {
                None
            };
            if titles.len() < 2 && reserved.is_none() {
                return None;
            }
            tracing::warn!(slug = %slug, titles = ?titles, reserved = ?reserved, "Notes share a slug");
            Some(SlugCollision {
                slug,
                titles,
                reserved,
            })
        })
        .collect()
}
