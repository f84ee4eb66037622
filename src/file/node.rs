//! File tree node model.
//!
//! Every stored item is a node: a folder, a plain file, or an image.
//! Nodes form a hierarchy through their parent reference; the root of
//! each user's tree is a sentinel, not a stored row, and appears on the
//! wire as parent ID `0`.

use std::fmt;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::{DepotError, Result};

/// Kind of a file tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A container for other nodes. Has no content.
    Folder,
    /// An opaque file with binary content.
    File,
    /// An image file; gains resized derivatives after upload.
    Image,
}

impl NodeKind {
    /// Canonical lowercase name, as stored and as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Folder => "folder",
            NodeKind::File => "file",
            NodeKind::Image => "image",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = DepotError;

    fn from_str(s: &str) -> Result<Self> {
        // Unknown kinds read as if the field were absent
        match s.to_ascii_lowercase().as_str() {
            "folder" => Ok(NodeKind::Folder),
            "file" => Ok(NodeKind::File),
            "image" => Ok(NodeKind::Image),
            _ => Err(DepotError::Validation("Missing type".to_string())),
        }
    }
}

/// Reference to a node's parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    /// The per-user root sentinel. Not a stored node.
    Root,
    /// A stored folder node.
    Folder(i64),
}

impl ParentRef {
    /// Decode the wire representation, where `0` means the root.
    pub fn from_wire(id: i64) -> Self {
        if id == 0 {
            ParentRef::Root
        } else {
            ParentRef::Folder(id)
        }
    }

    /// Wire representation: the root is `0`.
    pub fn as_wire(&self) -> i64 {
        match self {
            ParentRef::Root => 0,
            ParentRef::Folder(id) => *id,
        }
    }

    /// Database representation: the root is stored as NULL.
    pub fn as_db(&self) -> Option<i64> {
        match self {
            ParentRef::Root => None,
            ParentRef::Folder(id) => Some(*id),
        }
    }

    /// Decode the database representation.
    pub fn from_db(id: Option<i64>) -> Self {
        match id {
            None => ParentRef::Root,
            Some(id) => ParentRef::Folder(id),
        }
    }
}

/// A stored file tree node.
#[derive(Debug, Clone)]
pub struct FileNode {
    /// Unique node ID.
    pub id: i64,
    /// Owning user ID.
    pub owner_id: i64,
    /// Display name. Not unique.
    pub name: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Parent reference.
    pub parent: ParentRef,
    /// Whether unauthenticated readers may fetch the content.
    pub is_public: bool,
    /// Blob reference for file and image nodes. Folders have none.
    pub content_ref: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for FileNode {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let kind: String = row.try_get("kind")?;
        let kind = NodeKind::from_str(&kind).map_err(|e| sqlx::Error::ColumnDecode {
            index: "kind".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            )),
        })?;

        let parent_id: Option<i64> = row.try_get("parent_id")?;

        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            name: row.try_get("name")?,
            kind,
            parent: ParentRef::from_db(parent_id),
            is_public: row.try_get("is_public")?,
            content_ref: row.try_get("content_ref")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Data for inserting a new node.
#[derive(Debug, Clone)]
pub struct NewNode {
    /// Owning user ID.
    pub owner_id: i64,
    /// Display name.
    pub name: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Parent reference.
    pub parent: ParentRef,
    /// Public visibility flag.
    pub is_public: bool,
    /// Blob reference, if the node carries content.
    pub content_ref: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [NodeKind::Folder, NodeKind::File, NodeKind::Image] {
            assert_eq!(NodeKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_parsing_ignores_case() {
        assert_eq!(NodeKind::from_str("Folder").unwrap(), NodeKind::Folder);
        assert_eq!(NodeKind::from_str("FILE").unwrap(), NodeKind::File);
        assert_eq!(NodeKind::from_str("Image").unwrap(), NodeKind::Image);
    }

    #[test]
    fn test_kind_rejects_unknown() {
        for bad in ["directory", "blob", ""] {
            match NodeKind::from_str(bad) {
                Err(DepotError::Validation(msg)) => assert_eq!(msg, "Missing type"),
                other => panic!("expected validation error for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parent_ref_wire() {
        assert_eq!(ParentRef::from_wire(0), ParentRef::Root);
        assert_eq!(ParentRef::from_wire(42), ParentRef::Folder(42));
        assert_eq!(ParentRef::Root.as_wire(), 0);
        assert_eq!(ParentRef::Folder(42).as_wire(), 42);
    }

    #[test]
    fn test_parent_ref_db() {
        assert_eq!(ParentRef::Root.as_db(), None);
        assert_eq!(ParentRef::Folder(7).as_db(), Some(7));
        assert_eq!(ParentRef::from_db(None), ParentRef::Root);
        assert_eq!(ParentRef::from_db(Some(7)), ParentRef::Folder(7));
    }
}
