//! Note front matter.
//!
//! Front matter is kept as the raw YAML mapping so templates and future
//! consumers see every key. Only `index`, `slug` and `tags` are interpreted.

use serde_yaml::{Mapping, Value};

use crate::tags::TagsValue;

/// Decoded front matter of a note.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    values: Mapping,
}

impl Metadata {
    #[must_use]
    pub fn new(values: Mapping) -> Self {
        Self { values }
    }

    /// Look up a raw value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether the note is flagged as the site index (`index: true`).
    ///
    /// Non-boolean values are treated as `false`.
    #[must_use]
    pub fn is_index(&self) -> bool {
        self.get("index").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Explicit slug override, if set to a string.
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.get("slug").and_then(Value::as_str)
    }

    /// Declared tags, decoded by shape.
    ///
    /// Returns `None` when the key is missing or holds something other than
    /// a string or a sequence.
    #[must_use]
    pub fn tags(&self) -> Option<TagsValue> {
        match self.get("tags")? {
            Value::String(tags) => Some(TagsValue::Single(tags.clone())),
            Value::Sequence(items) => Some(TagsValue::Sequence(items.clone())),
            other => {
                tracing::debug!(value = ?other, "Ignoring tags with unsupported shape");
                None
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The underlying mapping.
    #[must_use]
    pub fn as_mapping(&self) -> &Mapping {
        &self.values
    }
}

impl From<Mapping> for Metadata {
    fn from(values: Mapping) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metadata(yaml: &str) -> Metadata {
        Metadata::new(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_is_index() {
        assert!(metadata("index: true").is_index());
        assert!(!metadata("index: false").is_index());
        assert!(!metadata("index: \"yes\"").is_index());
        assert!(!Metadata::default().is_index());
    }

    #[test]
    fn test_slug() {
        assert_eq!(metadata("slug: /custom").slug(), Some("/custom"));
        assert_eq!(metadata("slug: 42").slug(), None);
        assert_eq!(Metadata::default().slug(), None);
    }

    #[test]
    fn test_tags_single() {
        assert_eq!(
            metadata("tags: a, b").tags(),
            Some(TagsValue::Single("a, b".to_owned()))
        );
    }

    #[test]
    fn test_tags_sequence() {
        let tags = metadata("tags: [a, 1]").tags();
        assert_eq!(
            tags,
            Some(TagsValue::Sequence(vec![
                Value::String("a".to_owned()),
                Value::Number(1.into()),
            ]))
        );
    }

    #[test]
    fn test_tags_unsupported_shape() {
        assert_eq!(metadata("tags: 12").tags(), None);
        assert_eq!(metadata("tags: {a: b}").tags(), None);
        assert_eq!(metadata("title: x").tags(), None);
    }

    #[test]
    fn test_get_raw_value() {
        let meta = metadata("author: Ann");
        assert_eq!(meta.get("author"), Some(&Value::String("Ann".to_owned())));
        assert!(!meta.is_empty());
    }
}
