//! File service: node creation and content retrieval.
//!
//! Ties the node repository, the blob store and the derivative queue
//! together so handlers stay thin.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::debug;

use super::node::{FileNode, NewNode, NodeKind, ParentRef};
use super::repository::NodeRepository;
use super::storage::BlobStorage;
use crate::db::Database;
use crate::job::JobQueue;
use crate::{DepotError, Result};

/// Raw node creation input, before validation.
///
/// Fields arrive optional so that each missing one can be reported with
/// its own message.
#[derive(Debug, Clone, Default)]
pub struct CreateNodeInput {
    /// Display name.
    pub name: Option<String>,
    /// Node kind, as its wire string.
    pub kind: Option<String>,
    /// Wire parent ID; `0` is the root.
    pub parent_id: i64,
    /// Public visibility flag.
    pub is_public: bool,
    /// Base64-encoded content for file and image nodes.
    pub data: Option<String>,
}

/// Service coordinating node metadata, blobs and derivative jobs.
#[derive(Clone)]
pub struct FileService {
    db: Database,
    storage: Arc<BlobStorage>,
    jobs: Arc<JobQueue>,
}

impl FileService {
    /// Create a new service over the shared database, store and queue.
    pub fn new(db: Database, storage: Arc<BlobStorage>, jobs: Arc<JobQueue>) -> Self {
        Self { db, storage, jobs }
    }

    /// Validate and create a node for `owner_id`.
    ///
    /// For image nodes, a derivative job is enqueued after the node is
    /// stored; the request does not wait for it.
    pub async fn create(&self, owner_id: i64, input: CreateNodeInput) -> Result<FileNode> {
        let name = match input.name {
            Some(ref n) if !n.is_empty() => n.clone(),
            _ => return Err(DepotError::Validation("Missing name".to_string())),
        };

        let kind: NodeKind = match input.kind {
            Some(ref k) if !k.is_empty() => k.parse()?,
            _ => return Err(DepotError::Validation("Missing type".to_string())),
        };

        // Data presence is reported before any parent problem
        let data = match kind {
            NodeKind::Folder => None,
            NodeKind::File | NodeKind::Image => match input.data {
                Some(ref d) if !d.is_empty() => Some(d.clone()),
                _ => return Err(DepotError::Validation("Missing data".to_string())),
            },
        };

        let parent = ParentRef::from_wire(input.parent_id);
        if let ParentRef::Folder(parent_id) = parent {
            let repo = NodeRepository::new(self.db.pool());
            let parent_node = repo
                .get(owner_id, parent_id)
                .await?
                .ok_or_else(|| DepotError::Validation("Parent not found".to_string()))?;

            if parent_node.kind != NodeKind::Folder {
                return Err(DepotError::Validation("Parent is not a folder".to_string()));
            }
        }

        let content_ref = match data {
            None => None,
            Some(data) => {
                let bytes = BASE64
                    .decode(&data)
                    .map_err(|_| DepotError::Validation("Invalid data".to_string()))?;

                Some(self.storage.store(&bytes).await?)
            }
        };

        let insert = NodeRepository::new(self.db.pool())
            .insert(&NewNode {
                owner_id,
                name,
                kind,
                parent,
                is_public: input.is_public,
                content_ref: content_ref.clone(),
            })
            .await;

        let node = match insert {
            Ok(node) => node,
            Err(e) => {
                // Don't leave the blob orphaned on disk
                if let Some(ref blob_ref) = content_ref {
                    let _ = self.storage.remove(blob_ref).await;
                }
                return Err(e);
            }
        };

        debug!(node_id = node.id, kind = %node.kind, "Created node");

        if node.kind == NodeKind::Image {
            self.jobs.enqueue(node.id, owner_id);
        }

        Ok(node)
    }

    /// Fetch a node's content for an optional caller identity.
    ///
    /// Private nodes belonging to someone else answer as if they did not
    /// exist. When `size` names a derivative width, that variant is
    /// served instead of the original.
    pub async fn content(
        &self,
        identity: Option<i64>,
        id: i64,
        size: Option<u32>,
    ) -> Result<(FileNode, Vec<u8>)> {
        let repo = NodeRepository::new(self.db.pool());
        let node = repo
            .get_any(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("Not found".to_string()))?;

        if !node.is_public && identity != Some(node.owner_id) {
            return Err(DepotError::NotFound("Not found".to_string()));
        }

        if node.kind == NodeKind::Folder {
            return Err(DepotError::Validation(
                "A folder doesn't have content".to_string(),
            ));
        }

        let blob_ref = node
            .content_ref
            .as_deref()
            .ok_or_else(|| DepotError::NotFound("Not found".to_string()))?;

        let bytes = match size {
            Some(width) => self.storage.load_variant(blob_ref, width).await?,
            None => self.storage.load(blob_ref).await?,
        };

        Ok((node, bytes))
    }
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use tempfile::TempDir;

    async fn setup() -> (TempDir, FileService, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(BlobStorage::new(dir.path()).unwrap());
        let (jobs, _rx) = JobQueue::new();

        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("bob@dylan.com", "digest"))
            .await
            .unwrap();

        (dir, FileService::new(db, storage, jobs), user.id)
    }

    fn validation_msg(err: DepotError) -> String {
        match err {
            DepotError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other}"),
        }
    }

    fn file_input(name: &str, data: &str) -> CreateNodeInput {
        CreateNodeInput {
            name: Some(name.to_string()),
            kind: Some("file".to_string()),
            parent_id: 0,
            is_public: false,
            data: Some(data.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_folder() {
        let (_dir, service, owner) = setup().await;

        let node = service
            .create(
                owner,
                CreateNodeInput {
                    name: Some("docs".to_string()),
                    kind: Some("folder".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(node.kind, NodeKind::Folder);
        assert!(node.content_ref.is_none());
    }

    #[tokio::test]
    async fn test_create_file_stores_blob() {
        let (_dir, service, owner) = setup().await;
        let data = BASE64.encode(b"hello");

        let node = service.create(owner, file_input("hello.txt", &data)).await.unwrap();

        let blob_ref = node.content_ref.clone().unwrap();
        assert!(service.storage.exists(&blob_ref).await);

        let (_, bytes) = service.content(Some(owner), node.id, None).await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn test_create_missing_fields() {
        let (_dir, service, owner) = setup().await;

        let err = service
            .create(owner, CreateNodeInput::default())
            .await
            .unwrap_err();
        assert_eq!(validation_msg(err), "Missing name");

        let err = service
            .create(
                owner,
                CreateNodeInput {
                    name: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(validation_msg(err), "Missing type");

        let err = service
            .create(
                owner,
                CreateNodeInput {
                    name: Some("x".to_string()),
                    kind: Some("file".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(validation_msg(err), "Missing data");
    }

    #[tokio::test]
    async fn test_missing_data_reported_before_bad_parent() {
        let (_dir, service, owner) = setup().await;

        let err = service
            .create(
                owner,
                CreateNodeInput {
                    name: Some("x".to_string()),
                    kind: Some("file".to_string()),
                    parent_id: 999,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(validation_msg(err), "Missing data");
    }

    #[tokio::test]
    async fn test_create_kind_ignores_case() {
        let (_dir, service, owner) = setup().await;

        let node = service
            .create(
                owner,
                CreateNodeInput {
                    name: Some("docs".to_string()),
                    kind: Some("Folder".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(node.kind, NodeKind::Folder);

        let err = service
            .create(
                owner,
                CreateNodeInput {
                    name: Some("x".to_string()),
                    kind: Some("blob".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(validation_msg(err), "Missing type");
    }

    #[tokio::test]
    async fn test_failed_insert_removes_blob() {
        let (dir, service, _owner) = setup().await;
        let data = BASE64.encode(b"orphan");

        // A nonexistent owner violates the foreign key, failing the insert
        // after the blob was written
        let result = service.create(999, file_input("o.txt", &data)).await;
        assert!(result.is_err());

        let blobs = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(blobs, 0);
    }

    #[tokio::test]
    async fn test_create_invalid_base64() {
        let (_dir, service, owner) = setup().await;

        let err = service
            .create(owner, file_input("x", "not base64 !!!"))
            .await
            .unwrap_err();
        assert!(matches!(err, DepotError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_parent_checks() {
        let (_dir, service, owner) = setup().await;

        let err = service
            .create(
                owner,
                CreateNodeInput {
                    name: Some("x".to_string()),
                    kind: Some("folder".to_string()),
                    parent_id: 999,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(validation_msg(err), "Parent not found");

        let data = BASE64.encode(b"hi");
        let file = service.create(owner, file_input("f.txt", &data)).await.unwrap();

        let err = service
            .create(
                owner,
                CreateNodeInput {
                    name: Some("x".to_string()),
                    kind: Some("folder".to_string()),
                    parent_id: file.id,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(validation_msg(err), "Parent is not a folder");
    }

    #[tokio::test]
    async fn test_content_folder_rejected() {
        let (_dir, service, owner) = setup().await;

        let folder = service
            .create(
                owner,
                CreateNodeInput {
                    name: Some("docs".to_string()),
                    kind: Some("folder".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = service.content(Some(owner), folder.id, None).await.unwrap_err();
        assert_eq!(validation_msg(err), "A folder doesn't have content");
    }

    #[tokio::test]
    async fn test_content_private_hidden_from_others() {
        let (_dir, service, owner) = setup().await;
        let data = BASE64.encode(b"secret");
        let node = service.create(owner, file_input("s.txt", &data)).await.unwrap();

        // Anonymous
        let err = service.content(None, node.id, None).await.unwrap_err();
        assert!(matches!(err, DepotError::NotFound(_)));

        // Another user
        let err = service.content(Some(999), node.id, None).await.unwrap_err();
        assert!(matches!(err, DepotError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_content_public_readable_by_anyone() {
        let (_dir, service, owner) = setup().await;
        let data = BASE64.encode(b"open");

        let mut input = file_input("o.txt", &data);
        input.is_public = true;
        let node = service.create(owner, input).await.unwrap();

        let (_, bytes) = service.content(None, node.id, None).await.unwrap();
        assert_eq!(bytes, b"open");
    }

    #[tokio::test]
    async fn test_image_enqueues_job() {
        let (_dir, service, owner) = setup().await;
        let data = BASE64.encode(b"fake image bytes");

        let node = service
            .create(
                owner,
                CreateNodeInput {
                    name: Some("pic.png".to_string()),
                    kind: Some("image".to_string()),
                    parent_id: 0,
                    is_public: false,
                    data: Some(data),
                },
            )
            .await
            .unwrap();

        let job = service.jobs.job_for_file(node.id);
        assert!(job.is_some());
    }
}
