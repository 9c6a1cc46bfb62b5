//! Page rendering through user templates.
//!
//! Every note, placeholders included, is rendered with the note template to
//! `<destination>/<slug>/index.html`; the index note is additionally
//! rendered to `<destination>/index.html`. The tag page lands at
//! `<destination>/tags/index.html`.
//!
//! The root page and the tag page are written after the note pages, so they
//! win over a note whose slug lands on the same file.
//!
//! Templates are minijinja sources. Output is not auto-escaped: `body` is
//! already HTML.

use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment};
use oblish_notes::{Note, NoteStore, TagIndex, normalize_tags};
use oblish_renderer::{HtmlBackend, MarkdownRenderer, TocEntry};
use serde::Serialize;

use crate::error::BuildError;

/// Output file name inside each page directory.
pub const PAGE_FILENAME: &str = "index.html";

/// Directory of the tag page.
pub const TAGS_DIR: &str = "tags";

/// Link to a note as seen by templates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub title: String,
    pub path: String,
}

impl PageLink {
    fn to(note: &Note) -> Self {
        Self {
            title: note.title().to_owned(),
            path: note.path(),
        }
    }
}

/// Context of the note template.
#[derive(Debug, Serialize)]
pub struct NoteContext<'a> {
    pub title: &'a str,
    pub path: String,
    pub placeholder: bool,
    pub body: String,
    /// Linking notes, ordered by title.
    pub backlinks: Vec<PageLink>,
    pub tags: Vec<String>,
    pub toc: Vec<TocEntry>,
    /// Raw front matter.
    pub meta: &'a serde_yaml::Mapping,
    pub vars: &'a toml::Table,
}

/// One entry of the tag page.
#[derive(Debug, Serialize)]
pub struct TagGroup {
    pub name: String,
    pub notes: Vec<PageLink>,
}

/// Context of the tag template.
#[derive(Debug, Serialize)]
pub struct TagsContext<'a> {
    pub tags: Vec<TagGroup>,
    pub vars: &'a toml::Table,
}

/// Renders pages of a resolved note store.
pub struct SiteRenderer<'a> {
    destination: PathBuf,
    vars: &'a toml::Table,
    hard_wraps: bool,
}

impl<'a> SiteRenderer<'a> {
    #[must_use]
    pub fn new(destination: impl Into<PathBuf>, vars: &'a toml::Table) -> Self {
        Self {
            destination: destination.into(),
            vars,
            hard_wraps: true,
        }
    }

    /// Render soft line breaks in note bodies as `<br>`.
    #[must_use]
    pub fn with_hard_wraps(mut self, enabled: bool) -> Self {
        self.hard_wraps = enabled;
        self
    }

    /// Build the template context for one note.
    #[must_use]
    pub fn note_context<'n>(&self, store: &NoteStore, note: &'n Note) -> NoteContext<'n>
    where
        'a: 'n,
    {
        let (body, toc) = match note.document() {
            Some(document) => {
                let result = MarkdownRenderer::<HtmlBackend>::new()
                    .with_hard_wraps(self.hard_wraps)
                    .render(document);
                (result.html, result.toc)
            }
            None => (String::new(), Vec::new()),
        };

        let backlinks = note
            .backlinks()
            .values()
            .map(|&id| PageLink::to(store.get(id)))
            .collect();

        let tags = note
            .metadata()
            .tags()
            .map(|value| normalize_tags(&value).tags)
            .unwrap_or_default();

        NoteContext {
            title: note.title(),
            path: note.path(),
            placeholder: note.is_placeholder(),
            body,
            backlinks,
            tags,
            toc,
            meta: note.metadata().as_mapping(),
            vars: self.vars,
        }
    }

    /// Render every note of the store with `template`.
    ///
    /// Returns the number of files written. The first failure aborts the
    /// batch.
    pub fn render_notes(&self, store: &NoteStore, template: &str) -> Result<usize, BuildError> {
        let mut written = 0;

        for note in store.iter() {
            let dir = self.destination.join(note.slug());
            fs::create_dir_all(&dir).map_err(|e| BuildError::io(&dir, e))?;
            self.render_note(store, note, template, &dir.join(PAGE_FILENAME))?;
            written += 1;
        }

        if let Some(id) = store.index() {
            let note = store.get(id);
            let path = self.destination.join(PAGE_FILENAME);
            self.render_note(store, note, template, &path)?;
            written += 1;
        }

        tracing::debug!(pages = written, "Rendered notes");
        Ok(written)
    }

    fn render_note(
        &self,
        store: &NoteStore,
        note: &Note,
        template: &str,
        path: &Path,
    ) -> Result<(), BuildError> {
        let context = self.note_context(store, note);
        render_template(note.title(), template, &context, path)
    }

    /// Build the tag page context.
    #[must_use]
    pub fn tags_context(&self, store: &NoteStore, tags: &TagIndex) -> TagsContext<'a> {
        let tags = tags
            .iter()
            .map(|(name, notes)| TagGroup {
                name: name.to_owned(),
                notes: notes.iter().map(|&id| PageLink::to(store.get(id))).collect(),
            })
            .collect();
        TagsContext {
            tags,
            vars: self.vars,
        }
    }

    /// Render the tag page with `template`.
    pub fn render_tags(
        &self,
        store: &NoteStore,
        tags: &TagIndex,
        template: &str,
    ) -> Result<PathBuf, BuildError> {
        let dir = self.destination.join(TAGS_DIR);
        fs::create_dir_all(&dir).map_err(|e| BuildError::io(&dir, e))?;
        let path = dir.join(PAGE_FILENAME);

        let context = self.tags_context(store, tags);
        render_template(TAGS_DIR, template, &context, &path)?;
        Ok(path)
    }
}

/// Compile `source` under `name`, render it and overwrite `path`.
fn render_template<S: Serialize>(
    name: &str,
    source: &str,
    context: S,
    path: &Path,
) -> Result<(), BuildError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);

    let html = env
        .render_named_str(name, source, context)
        .map_err(|source| BuildError::Template {
            page: name.to_owned(),
            source,
        })?;
    fs::write(path, html).map_err(|e| BuildError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oblish_notes::resolve_links;
    use pretty_assertions::assert_eq;

    const NOTE_TEMPLATE: &str = "{{ title }}|{% if placeholder %}true{% else %}false{% endif %}|{% for b in backlinks %}{{ b.title }}={{ b.path }};{% endfor %}|{{ body }}";

    fn store(notes: &[(&str, &str)]) -> NoteStore {
        let mut store = NoteStore::new();
        for (title, source) in notes {
            store.add_source(title, source).unwrap();
        }
        resolve_links(&mut store).unwrap();
        store
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_render_notes_layout() {
        let out = tempfile::tempdir().unwrap();
        let store = store(&[("Alpha", "See [[Beta]]."), ("Beta", "Hi")]);
        let vars = toml::Table::new();

        let written = SiteRenderer::new(out.path(), &vars)
            .render_notes(&store, NOTE_TEMPLATE)
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            read(&out.path().join("alpha/index.html")),
            r#"Alpha|false||<p>See <a href="/beta">Beta</a>.</p>"#
        );
        assert_eq!(
            read(&out.path().join("beta/index.html")),
            "Beta|false|Alpha=/alpha;|<p>Hi</p>"
        );
    }

    #[test]
    fn test_placeholder_page() {
        let out = tempfile::tempdir().unwrap();
        let store = store(&[("Alpha", "[[Ghost Note]]")]);
        let vars = toml::Table::new();

        SiteRenderer::new(out.path(), &vars)
            .render_notes(&store, NOTE_TEMPLATE)
            .unwrap();

        assert_eq!(
            read(&out.path().join("ghost-note/index.html")),
            "Ghost Note|true|Alpha=/alpha;|"
        );
        assert!(read(&out.path().join("alpha/index.html")).contains(r#"class="placeholder""#));
    }

    #[test]
    fn test_index_note_rendered_twice() {
        let out = tempfile::tempdir().unwrap();
        let store = store(&[("Home", "---\nindex: true\n---\n\nWelcome")]);
        let vars = toml::Table::new();

        let written = SiteRenderer::new(out.path(), &vars)
            .render_notes(&store, "{{ title }}")
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(read(&out.path().join("index.html")), "Home");
        assert_eq!(read(&out.path().join("home/index.html")), "Home");
    }

    #[test]
    fn test_root_slug_does_not_replace_index_page() {
        let out = tempfile::tempdir().unwrap();
        let store = store(&[
            ("Home", "---\nindex: true\n---\n"),
            ("\u{1f600}", ""),
        ]);
        let vars = toml::Table::new();

        SiteRenderer::new(out.path(), &vars)
            .render_notes(&store, "{{ title }}")
            .unwrap();

        assert_eq!(read(&out.path().join("index.html")), "Home");
    }

    #[test]
    fn test_escaping_slug_stays_inside_destination() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("public");
        let store = store(&[("Sneaky", "---\nslug: ../escaped\n---\n")]);
        let vars = toml::Table::new();

        SiteRenderer::new(&out, &vars)
            .render_notes(&store, "{{ title }}")
            .unwrap();

        assert_eq!(read(&out.join("sneaky/index.html")), "Sneaky");
        assert!(!root.path().join("escaped").exists());
    }

    #[test]
    fn test_backlinks_sorted_by_title() {
        let store = store(&[("Zed", "[[T]]"), ("Amy", "[[T]]"), ("Mo", "[[T]]")]);
        let vars = toml::Table::new();
        let renderer = SiteRenderer::new("unused", &vars);
        let note = store.get(store.find("T").unwrap());

        let context = renderer.note_context(&store, note);

        let titles: Vec<_> = context.backlinks.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["Amy", "Mo", "Zed"]);
    }

    #[test]
    fn test_note_context_tags_toc_and_vars() {
        let store = store(&[("Post", "---\ntags: rust, cli\nauthor: Kim\n---\n\n## Intro\n")]);
        let mut vars = toml::Table::new();
        vars.insert("site".to_owned(), toml::Value::String("Garden".to_owned()));
        let out = tempfile::tempdir().unwrap();

        SiteRenderer::new(out.path(), &vars)
            .render_notes(
                &store,
                "{{ vars.site }}:{{ tags | join(',') }}:{{ toc[0].id }}:{{ meta.author }}",
            )
            .unwrap();

        assert_eq!(read(&out.path().join("post/index.html")), "Garden:rust,cli:intro:Kim");
    }

    #[test]
    fn test_body_is_not_escaped() {
        let out = tempfile::tempdir().unwrap();
        let store = store(&[("A", "**bold**")]);
        let vars = toml::Table::new();

        SiteRenderer::new(out.path(), &vars)
            .render_notes(&store, "{{ body }}")
            .unwrap();

        assert_eq!(read(&out.path().join("a/index.html")), "<p><strong>bold</strong></p>");
    }

    #[test]
    fn test_output_is_truncated() {
        let out = tempfile::tempdir().unwrap();
        fs::create_dir_all(out.path().join("a")).unwrap();
        fs::write(out.path().join("a/index.html"), "a much longer previous page").unwrap();
        let store = store(&[("A", "")]);
        let vars = toml::Table::new();

        SiteRenderer::new(out.path(), &vars)
            .render_notes(&store, "new")
            .unwrap();

        assert_eq!(read(&out.path().join("a/index.html")), "new");
    }

    #[test]
    fn test_template_error_aborts() {
        let out = tempfile::tempdir().unwrap();
        let store = store(&[("A", ""), ("B", "")]);
        let vars = toml::Table::new();

        let err = SiteRenderer::new(out.path(), &vars)
            .render_notes(&store, "{% for %}")
            .unwrap_err();

        assert!(matches!(err, BuildError::Template { ref page, .. } if page == "A"));
        assert!(!out.path().join("b/index.html").exists());
    }

    #[test]
    fn test_hard_wraps_toggle() {
        let store = store(&[("A", "one\ntwo")]);
        let vars = toml::Table::new();
        let note = store.get(store.find("A").unwrap());

        let wrapped = SiteRenderer::new("unused", &vars).note_context(&store, note);
        assert_eq!(wrapped.body, "<p>one<br>two</p>");

        let plain = SiteRenderer::new("unused", &vars)
            .with_hard_wraps(false)
            .note_context(&store, note);
        assert_eq!(plain.body, "<p>one\ntwo</p>");
    }

    #[test]
    fn test_render_tags() {
        let out = tempfile::tempdir().unwrap();
        let store = store(&[
            ("X", "---\ntags: a, b\n---\n"),
            ("Y", "---\ntags: [b, c]\n---\n"),
        ]);
        let mut tags = TagIndex::new();
        for note in store.iter() {
            tags.index_note(note);
        }
        let vars = toml::Table::new();

        let path = SiteRenderer::new(out.path(), &vars)
            .render_tags(
                &store,
                &tags,
                "{% for t in tags %}{{ t.name }}:{% for n in t.notes %}{{ n.title }}@{{ n.path }} {% endfor %};{% endfor %}",
            )
            .unwrap();

        assert_eq!(path, out.path().join("tags/index.html"));
        assert_eq!(read(&path), "a:X@/x ;b:X@/x Y@/y ;c:Y@/y ;");
    }
}
