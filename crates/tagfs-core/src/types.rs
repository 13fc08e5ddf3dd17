//! Strongly typed store identifiers and tag maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier assigned by the store when an object is created.
///
/// Stable for the lifetime of the object; updates never change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Create a new object id.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Return the raw id.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for ObjectId {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key/value tags attached to a remote object.
///
/// Keys are unique. The store treats the set as unordered; the map is kept
/// sorted so that filters and logs render deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a tag, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a tag value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// True when every pair of `filter` is present in `self` with an equal value.
    pub fn matches(&self, filter: &Tags) -> bool {
        filter
            .iter()
            .all(|(key, value)| self.get(key) == Some(value))
    }

    /// Iterate over the tags in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no tags are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}

/// A full object as returned by `get_by_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    /// Store-assigned identifier
    pub id: ObjectId,
    /// Tags, including store-maintained `:`-prefixed metadata
    pub tags: Tags,
    /// Opaque payload; empty for objects created without data
    pub data: Vec<u8>,
}

/// One item of a `find` response stream: the id and tags, without data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundObject {
    /// Store-assigned identifier
    pub id: ObjectId,
    /// Tags, including store-maintained `:`-prefixed metadata
    pub tags: Tags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_match_requires_every_filter_pair() {
        let tags = Tags::new()
            .with("type", "file")
            .with("name", "a.txt")
            .with("dir", "/docs");

        assert!(tags.matches(&Tags::new().with("dir", "/docs")));
        assert!(tags.matches(&Tags::new().with("dir", "/docs").with("name", "a.txt")));
        assert!(!tags.matches(&Tags::new().with("dir", "/docs").with("name", "b.txt")));
        assert!(!tags.matches(&Tags::new().with("owner", "x")));
        assert!(tags.matches(&Tags::new()));
    }

    #[test]
    fn test_tags_display_is_sorted() {
        let tags: Tags = [("name", "a"), ("dir", "/")].into_iter().collect();
        assert_eq!(tags.to_string(), "{dir=/, name=a}");
    }

    #[test]
    fn test_insert_replaces_value() {
        let mut tags = Tags::new().with("type", "dir");
        assert_eq!(tags.insert("type", "file"), Some("dir".to_string()));
        assert_eq!(tags.get("type"), Some("file"));
        assert_eq!(tags.len(), 1);
    }
}
