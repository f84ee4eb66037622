//! Depot server binary.

use std::sync::Arc;

use tracing::{info, warn};

use depot::web::{AppState, WebServer};
use depot::{BlobStorage, Config, Database, DerivativeWorker, JobQueue, Result, SessionStore};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load_with_env(CONFIG_PATH) {
        Ok(config) => config,
        Err(_) => {
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if depot::logging::init(&config.logging).is_err() {
        depot::logging::init_console_only(&config.logging.level);
        warn!("Falling back to console-only logging");
    }

    info!("Starting depot");

    let db = Database::open(&config.database.path).await?;
    let storage = Arc::new(BlobStorage::new(&config.storage.path)?);
    let sessions = Arc::new(SessionStore::with_ttl(config.session.ttl_secs as i64));

    let (jobs, rx) = JobQueue::new();
    DerivativeWorker::new(jobs.clone(), rx, db.clone(), storage.clone()).spawn();

    let state = Arc::new(AppState {
        db,
        sessions,
        storage,
        jobs,
    });

    WebServer::new(&config.server, state)?.run().await
}
