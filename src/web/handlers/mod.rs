//! HTTP handlers and the shared application state.

pub mod app;
pub mod auth;
pub mod file;
pub mod user;

use std::sync::Arc;

use crate::auth::SessionStore;
use crate::db::Database;
use crate::file::{BlobStorage, FileService};
use crate::job::JobQueue;

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Session store.
    pub sessions: Arc<SessionStore>,
    /// Blob store.
    pub storage: Arc<BlobStorage>,
    /// Derivative job queue.
    pub jobs: Arc<JobQueue>,
}

impl AppState {
    /// Build a file service over the shared components.
    pub fn file_service(&self) -> FileService {
        FileService::new(self.db.clone(), self.storage.clone(), self.jobs.clone())
    }
}
