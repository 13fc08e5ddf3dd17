//! Filesystem view of a store object's tags.

use crate::errors::{FsError, Result};
use crate::path::{self, ROOT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tagfs_core::{FoundObject, ObjectId, Tags};

/// Tag holding the entry kind (`file` or `dir`)
pub const TYPE_TAG: &str = "type";
/// Tag holding the entry name within its parent
pub const NAME_TAG: &str = "name";
/// Tag holding the absolute normalised parent directory
pub const DIR_TAG: &str = "dir";
/// Store-maintained creation time, unix seconds
pub const CREATED_TAG: &str = ":created";
/// Store-maintained payload size, bytes
pub const SIZE_TAG: &str = ":size";

/// File or directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Holds data
    File,
    /// Holds entries
    Directory,
}

impl EntryKind {
    /// Value stored in the `type` tag
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "dir",
        }
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "dir" => Ok(Self::Directory),
            other => Err(format!("unknown entry type '{other}'")),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Tags identifying an entry: `{type, name, dir}`.
pub fn entry_tags(kind: EntryKind, dir: &str, name: &str) -> Tags {
    Tags::new()
        .with(TYPE_TAG, kind.as_tag())
        .with(NAME_TAG, name)
        .with(DIR_TAG, dir)
}

/// Projection of a store object as a file or directory.
///
/// Not persisted by this layer; it reflects store state at the time of the
/// lookup that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    /// Backing object; `None` only for the implicit root
    pub id: Option<ObjectId>,
    /// File or directory
    pub kind: EntryKind,
    /// Name within the parent; empty for the root
    pub name: String,
    /// Absolute parent directory
    pub parent_dir: String,
    /// Creation time in unix seconds, 0 when the store did not report it
    pub created_at: u64,
    /// Payload size in bytes, 0 when the store did not report it
    pub size: u64,
}

impl PathEntry {
    /// The implicit root directory. Never stored.
    pub fn root() -> Self {
        Self {
            id: None,
            kind: EntryKind::Directory,
            name: String::new(),
            parent_dir: ROOT.to_string(),
            created_at: 0,
            size: 0,
        }
    }

    /// Project a `find` result.
    pub fn from_found(found: FoundObject) -> Result<Self> {
        let FoundObject { id, tags } = found;
        let malformed = |reason: String| FsError::MalformedEntry { id, reason };

        let kind = tags
            .get(TYPE_TAG)
            .ok_or_else(|| malformed(format!("missing '{TYPE_TAG}' tag")))?
            .parse::<EntryKind>()
            .map_err(&malformed)?;
        let name = tags
            .get(NAME_TAG)
            .ok_or_else(|| malformed(format!("missing '{NAME_TAG}' tag")))?
            .to_string();
        let parent_dir = tags
            .get(DIR_TAG)
            .ok_or_else(|| malformed(format!("missing '{DIR_TAG}' tag")))?
            .to_string();

        Ok(Self {
            id: Some(id),
            kind,
            name,
            parent_dir,
            created_at: numeric_tag(&tags, CREATED_TAG),
            size: numeric_tag(&tags, SIZE_TAG),
        })
    }

    /// Full normalised path
    pub fn path(&self) -> String {
        if self.id.is_none() && self.name.is_empty() {
            return ROOT.to_string();
        }
        path::join(&self.parent_dir, &self.name)
    }

    /// True for directories (including the root)
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// True for files
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

fn numeric_tag(tags: &Tags, key: &str) -> u64 {
    tags.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
}
