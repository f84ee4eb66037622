//! File tree: node model, metadata repository, blob storage and the
//! service that ties them together.

mod node;
mod repository;
mod service;
mod storage;

pub use node::{FileNode, NewNode, NodeKind, ParentRef};
pub use repository::{NodeRepository, PAGE_SIZE};
pub use service::{CreateNodeInput, FileService};
pub use storage::{BlobStorage, VARIANT_WIDTHS};
