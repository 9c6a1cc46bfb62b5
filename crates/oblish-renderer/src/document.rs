//! Structured document model.
//!
//! A [`Document`] is the parsed form of one note: the `pulldown-cmark` event
//! stream with every wikilink folded into a single [`Reference`] node. The
//! label events of a wikilink live inside its reference, so walking the node
//! sequence visits each reference exactly once and never descends into it.
//!
//! YAML front matter is split off during parsing and returned next to the
//! document in [`ParsedDocument`].

use pulldown_cmark::{CowStr, Event, LinkType, MetadataBlockKind, Options, Parser, Tag, TagEnd};
use serde_yaml::{Mapping, Value};

/// Error returned when a document cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Front matter is not valid YAML.
    #[error("Invalid front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
    /// Front matter parsed, but is not a key/value mapping.
    #[error("Front matter must be a mapping, found {0}")]
    FrontMatterShape(&'static str),
}

/// One node of a [`Document`].
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Ordinary markdown event.
    Event(Event<'static>),
    /// Link to another note by title.
    Reference(Reference),
}

/// Wikilink to another note.
///
/// The target title is kept separately from the rewritten destination so a
/// document can be resolved any number of times with the same outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct Reference {
    target: String,
    fragment: Option<String>,
    label: Vec<Event<'static>>,
    destination: Option<String>,
    dead: bool,
}

impl Reference {
    /// Create a reference to `target` labelled with the target itself.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            label: vec![Event::Text(CowStr::from(target.clone()))],
            target,
            fragment: None,
            destination: None,
            dead: false,
        }
    }

    /// Parse a raw wikilink destination such as `Note#Heading`.
    fn from_wikilink(dest_url: &str, label: Vec<Event<'static>>) -> Self {
        let (target, fragment) = match dest_url.split_once('#') {
            Some((target, fragment)) => (target, Some(fragment.trim())),
            None => (dest_url, None),
        };
        Self {
            target: target.trim().to_owned(),
            fragment: fragment.filter(|f| !f.is_empty()).map(str::to_owned),
            label,
            destination: None,
            dead: false,
        }
    }

    /// Note title as written in the source. Empty for in-page links.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Heading fragment (the part after `#`), if any.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Label events rendered inside the link.
    #[must_use]
    pub fn label(&self) -> &[Event<'static>] {
        &self.label
    }

    /// Resolved destination path, if the reference has been resolved.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Rewrite the destination path.
    pub fn set_destination(&mut self, destination: impl Into<String>) {
        self.destination = Some(destination.into());
    }

    /// Whether the target note has no content.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Set or clear the dead-link marker.
    pub fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
    }
}

/// Parsed note body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
}

/// Result of [`Document::parse`].
#[derive(Clone, Debug)]
pub struct ParsedDocument {
    /// Document body.
    pub document: Document,
    /// Front matter mapping (empty when the source has none).
    pub front_matter: Mapping,
}

/// Parser options used for every note.
#[must_use]
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
        | Options::ENABLE_WIKILINKS
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
}

impl Document {
    /// Build a document from pre-assembled nodes.
    #[must_use]
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Parse markdown source into a document and its front matter.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the front matter is malformed.
    pub fn parse(source: &str) -> Result<ParsedDocument, DocumentError> {
        let mut nodes = Vec::new();
        let mut yaml = String::new();
        let mut in_metadata = false;
        let mut events = Parser::new_ext(source, parser_options());

        while let Some(event) = events.next() {
            match event {
                Event::Start(Tag::MetadataBlock(MetadataBlockKind::YamlStyle)) => {
                    in_metadata = true;
                }
                Event::End(TagEnd::MetadataBlock(MetadataBlockKind::YamlStyle)) => {
                    in_metadata = false;
                }
                Event::Text(text) if in_metadata => yaml.push_str(&text),
                Event::Start(Tag::Link {
                    link_type: LinkType::WikiLink { .. },
                    dest_url,
                    ..
                }) => {
                    let label = collect_label(&mut events);
                    nodes.push(Node::Reference(Reference::from_wikilink(&dest_url, label)));
                }
                other => nodes.push(Node::Event(other.into_static())),
            }
        }

        Ok(ParsedDocument {
            document: Self { nodes },
            front_matter: parse_front_matter(&yaml)?,
        })
    }

    /// All nodes in document order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable access to the nodes.
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Iterate over reference nodes in document order.
    pub fn references(&self) -> impl Iterator<Item = &Reference> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            Node::Reference(reference) => Some(reference),
            Node::Event(_) => None,
        })
    }

    /// Whether the document has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Consume events up to the end of the current wikilink.
fn collect_label<'a, I>(events: &mut I) -> Vec<Event<'static>>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut label = Vec::new();
    let mut depth = 0usize;
    for event in events.by_ref() {
        match &event {
            Event::Start(Tag::Link { .. }) => depth += 1,
            Event::End(TagEnd::Link) if depth == 0 => break,
            Event::End(TagEnd::Link) => depth -= 1,
            _ => {}
        }
        label.push(event.into_static());
    }
    label
}

fn parse_front_matter(yaml: &str) -> Result<Mapping, DocumentError> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        Value::Bool(_) => Err(DocumentError::FrontMatterShape("a boolean")),
        Value::Number(_) => Err(DocumentError::FrontMatterShape("a number")),
        Value::String(_) => Err(DocumentError::FrontMatterShape("a string")),
        Value::Sequence(_) => Err(DocumentError::FrontMatterShape("a sequence")),
        Value::Tagged(_) => Err(DocumentError::FrontMatterShape("a tagged value")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn references(source: &str) -> Vec<Reference> {
        Document::parse(source)
            .unwrap()
            .document
            .references()
            .cloned()
            .collect()
    }

    #[test]
    fn test_parse_plain_wikilink() {
        let refs = references("See [[Other Note]] for more.");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target(), "Other Note");
        assert_eq!(refs[0].fragment(), None);
        assert_eq!(refs[0].destination(), None);
        assert!(!refs[0].is_dead());
    }

    #[test]
    fn test_parse_wikilink_with_label() {
        let refs = references("[[Other Note|the other one]]");
        assert_eq!(refs[0].target(), "Other Note");
        assert_eq!(
            refs[0].label(),
            &[Event::Text(CowStr::from("the other one"))]
        );
    }

    #[test]
    fn test_parse_wikilink_with_fragment() {
        let refs = references("[[Other Note#Some Heading]]");
        assert_eq!(refs[0].target(), "Other Note");
        assert_eq!(refs[0].fragment(), Some("Some Heading"));
    }

    #[test]
    fn test_parse_in_page_wikilink() {
        let refs = references("[[#Heading]]");
        assert_eq!(refs[0].target(), "");
        assert_eq!(refs[0].fragment(), Some("Heading"));
    }

    #[test]
    fn test_label_events_are_not_top_level_nodes() {
        let parsed = Document::parse("[[A]]").unwrap();
        let nodes = parsed.document.nodes();
        assert!(
            nodes
                .iter()
                .all(|n| !matches!(n, Node::Event(Event::Text(t)) if t.as_ref() == "A"))
        );
        assert!(
            !nodes
                .iter()
                .any(|n| matches!(n, Node::Event(Event::End(TagEnd::Link))))
        );
    }

    #[test]
    fn test_inline_links_stay_events() {
        let parsed = Document::parse("[site](https://example.com)").unwrap();
        assert_eq!(parsed.document.references().count(), 0);
        assert!(parsed.document.nodes().iter().any(|n| matches!(
            n,
            Node::Event(Event::Start(Tag::Link {
                link_type: LinkType::Inline,
                ..
            }))
        )));
    }

    #[test]
    fn test_parse_front_matter() {
        let source = "---\nindex: true\ntags: a, b\n---\n\n# Body\n";
        let parsed = Document::parse(source).unwrap();
        assert_eq!(
            parsed.front_matter.get("index"),
            Some(&Value::Bool(true))
        );
        assert_eq!(
            parsed.front_matter.get("tags"),
            Some(&Value::String("a, b".to_owned()))
        );
        // Front matter text never reaches the body
        assert!(!parsed.document.nodes().iter().any(
            |n| matches!(n, Node::Event(Event::Text(t)) if t.contains("index"))
        ));
    }

    #[test]
    fn test_missing_front_matter_is_empty() {
        let parsed = Document::parse("Just text").unwrap();
        assert!(parsed.front_matter.is_empty());
    }

    #[test]
    fn test_malformed_front_matter_is_error() {
        let result = Document::parse("---\ntags: [a, b\n---\n\nBody\n");
        assert!(matches!(result, Err(DocumentError::FrontMatter(_))));
    }

    #[test]
    fn test_non_mapping_front_matter_is_error() {
        let result = Document::parse("---\n- a\n- b\n---\n\nBody\n");
        assert!(matches!(
            result,
            Err(DocumentError::FrontMatterShape("a sequence"))
        ));
    }

    #[test]
    fn test_reference_destination_and_marker() {
        let mut reference = Reference::new("Target");
        reference.set_destination("/target");
        reference.set_dead(true);
        assert_eq!(reference.destination(), Some("/target"));
        assert!(reference.is_dead());
        assert_eq!(reference.target(), "Target");
    }
}
