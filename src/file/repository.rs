//! Node repository: metadata CRUD for the file tree.

use sqlx::SqlitePool;

use super::node::{FileNode, NewNode, ParentRef};
use crate::{DepotError, Result};

/// Page size for node listings.
pub const PAGE_SIZE: u32 = 20;

/// Repository for file tree nodes.
pub struct NodeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> NodeRepository<'a> {
    /// Create a new NodeRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a node and return it with its assigned ID.
    pub async fn insert(&self, node: &NewNode) -> Result<FileNode> {
        let result = sqlx::query(
            "INSERT INTO nodes (owner_id, name, kind, parent_id, is_public, content_ref)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(node.owner_id)
        .bind(&node.name)
        .bind(node.kind.as_str())
        .bind(node.parent.as_db())
        .bind(node.is_public)
        .bind(&node.content_ref)
        .execute(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_any(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("node".to_string()))
    }

    /// Get a node by ID, scoped to its owner.
    pub async fn get(&self, owner_id: i64, id: i64) -> Result<Option<FileNode>> {
        let result = sqlx::query_as::<_, FileNode>(
            "SELECT id, owner_id, name, kind, parent_id, is_public, content_ref, created_at
             FROM nodes WHERE id = ? AND owner_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get a node by ID regardless of owner.
    pub async fn get_any(&self, id: i64) -> Result<Option<FileNode>> {
        let result = sqlx::query_as::<_, FileNode>(
            "SELECT id, owner_id, name, kind, parent_id, is_public, content_ref, created_at
             FROM nodes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(result)
    }

    /// List an owner's children of a parent, oldest first, one page at a time.
    pub async fn list(&self, owner_id: i64, parent: ParentRef, page: u32) -> Result<Vec<FileNode>> {
        let offset = (page as i64) * (PAGE_SIZE as i64);

        let query = match parent.as_db() {
            None => sqlx::query_as::<_, FileNode>(
                "SELECT id, owner_id, name, kind, parent_id, is_public, content_ref, created_at
                 FROM nodes WHERE owner_id = ? AND parent_id IS NULL
                 ORDER BY id LIMIT ? OFFSET ?",
            )
            .bind(owner_id)
            .bind(PAGE_SIZE as i64)
            .bind(offset),
            Some(parent_id) => sqlx::query_as::<_, FileNode>(
                "SELECT id, owner_id, name, kind, parent_id, is_public, content_ref, created_at
                 FROM nodes WHERE owner_id = ? AND parent_id = ?
                 ORDER BY id LIMIT ? OFFSET ?",
            )
            .bind(owner_id)
            .bind(parent_id)
            .bind(PAGE_SIZE as i64)
            .bind(offset),
        };

        let nodes = query
            .fetch_all(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(nodes)
    }

    /// Set a node's public flag, scoped to its owner.
    ///
    /// Returns the updated node, or `None` if no such node belongs to
    /// the owner.
    pub async fn set_public(&self, owner_id: i64, id: i64, public: bool) -> Result<Option<FileNode>> {
        let result = sqlx::query("UPDATE nodes SET is_public = ? WHERE id = ? AND owner_id = ?")
            .bind(public)
            .bind(id)
            .bind(owner_id)
            .execute(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(owner_id, id).await
    }

    /// Count all nodes.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM nodes")
            .fetch_one(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;
        Ok(count.0)
    }
}
