//! Depot is a small multi-user file management service.
//!
//! Users register with an email and password, exchange Basic
//! credentials for a session token, and manage a private tree of
//! folders, files and images over HTTP. Content is stored as flat
//! blobs; image uploads gain resized derivatives in the background.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod job;
pub mod logging;
pub mod web;

pub use auth::{hash_password, verify_password, Session, SessionStore};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{DepotError, Result};
pub use file::{BlobStorage, FileNode, FileService, NodeKind, NodeRepository, ParentRef};
pub use job::{DerivativeJob, DerivativeWorker, JobQueue, JobStatus};
pub use web::{AppState, WebServer};
