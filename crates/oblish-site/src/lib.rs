//! Static site building for Oblish vaults.
//!
//! [`SiteBuilder`] drives a build from a loaded [`oblish_config::Config`]:
//! the vault is scanned, notes are parsed into an
//! [`oblish_notes::NoteStore`], assets are copied, links are resolved and
//! every page is rendered through the configured minijinja templates.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use oblish_config::Config;
//! use oblish_site::SiteBuilder;
//!
//! let config = Config::load(None, Path::new("vault"), None)?;
//! let report = SiteBuilder::new(&config).build()?;
//! println!("{} pages", report.pages);
//! ```

mod assets;
mod builder;
mod error;
mod render;
mod scanner;

pub use assets::{CopyReport, copy_assets, copy_entry, copy_file};
pub use builder::{BuildReport, DuplicateNote, ReservedPage, SiteBuilder, SlugCollision};
pub use error::BuildError;
pub use render::{
    NoteContext, PAGE_FILENAME, PageLink, SiteRenderer, TAGS_DIR, TagGroup, TagsContext,
};
pub use scanner::{Scanner, VaultFile, VaultScan};
