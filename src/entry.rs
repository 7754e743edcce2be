use chrono::DateTime;
use chrono::Utc;
#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

/// A file found in a directory listing.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Display name of the file, never ending with a separator.
    pub name: String,
    /// Path of the file, relative to the listing unless a base path was
    /// configured.
    pub path: String,
    /// Last modification time, if the listing layout exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl FileEntry {
    /// Creates a new file entry.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            last_modified,
        }
    }
}

/// A directory found in a directory listing.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    /// Display name of the directory, never ending with a separator.
    pub name: String,
    /// Path of the directory. Keeps its trailing separator.
    pub path: String,
    /// Last modification time, if the listing layout exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    /// Contents of the directory.
    ///
    /// `None` when the entry came from a single listing and has not been
    /// traversed. Traversal always resolves it, possibly to an empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Entry>>,
}

impl DirectoryEntry {
    /// Creates a new, unresolved directory entry.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            last_modified,
            children: None,
        }
    }
}

/// A single record of a directory listing.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    /// A leaf resource.
    File(FileEntry),
    /// A directory that may be traversed further.
    Directory(DirectoryEntry),
}

impl Entry {
    pub(crate) fn create(
        name: String,
        path: String,
        last_modified: Option<DateTime<Utc>>,
        is_directory: bool,
    ) -> Self {
        if is_directory {
            Entry::Directory(DirectoryEntry::new(name, path, last_modified))
        } else {
            Entry::File(FileEntry::new(name, path, last_modified))
        }
    }

    /// Name of the file or directory.
    pub fn name(&self) -> &str {
        match self {
            Entry::File(f) => &f.name,
            Entry::Directory(d) => &d.name,
        }
    }

    /// Path of the file or directory.
    pub fn path(&self) -> &str {
        match self {
            Entry::File(f) => &f.path,
            Entry::Directory(d) => &d.path,
        }
    }

    pub(crate) fn set_path(&mut self, path: String) {
        match self {
            Entry::File(f) => f.path = path,
            Entry::Directory(d) => d.path = path,
        }
    }

    /// Last modification time, when known.
    pub fn last_modified(&self) -> Option<&DateTime<Utc>> {
        match self {
            Entry::File(f) => f.last_modified.as_ref(),
            Entry::Directory(d) => d.last_modified.as_ref(),
        }
    }

    /// Whether this entry is a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self, Entry::Directory(_))
    }

    /// Whether this entry is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File(_))
    }

    /// Resolved children of a traversed directory.
    pub fn children(&self) -> Option<&[Entry]> {
        match self {
            Entry::File(_) => None,
            Entry::Directory(d) => d.children.as_deref(),
        }
    }

    /// Counts this entry and everything below it.
    pub fn count(&self) -> usize {
        1 + self
            .children()
            .map(|c| c.iter().map(Entry::count).sum::<usize>())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn serialized_shape() {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap();
        let file = Entry::File(FileEntry::new("a.txt", "a.txt", Some(t)));
        assert_eq!(
            serde_json::to_value(&file).unwrap(),
            json!({
                "type": "file",
                "name": "a.txt",
                "path": "a.txt",
                "lastModified": "2024-01-02T03:04:00Z",
            })
        );

        let dir = Entry::Directory(DirectoryEntry::new("d", "d/", None));
        assert_eq!(
            serde_json::to_value(&dir).unwrap(),
            json!({"type": "directory", "name": "d", "path": "d/"})
        );
    }

    #[test]
    fn deserialize_tree() {
        let value = json!({
            "type": "directory",
            "name": "d",
            "path": "d/",
            "children": [{"type": "file", "name": "x", "path": "d/x"}],
        });
        let entry: Entry = serde_json::from_value(value).unwrap();
        assert!(entry.is_directory());
        assert_eq!(entry.children().unwrap()[0].name(), "x");
        assert_eq!(entry.count(), 2);
    }
}
