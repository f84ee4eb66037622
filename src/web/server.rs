//! HTTP server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{debug, info};

use super::handlers::AppState;
use super::router::create_router;
use crate::auth::SessionStore;
use crate::config::ServerConfig;
use crate::{DepotError, Result};

/// Interval between expired-session sweeps.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// The HTTP server.
pub struct WebServer {
    addr: SocketAddr,
    state: Arc<AppState>,
}

impl WebServer {
    /// Create a server from configuration.
    pub fn new(config: &ServerConfig, state: Arc<AppState>) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| DepotError::Config(format!("invalid listen address: {e}")))?;

        Ok(Self { addr, state })
    }

    /// Bind and serve until the process is stopped.
    pub async fn run(self) -> Result<()> {
        start_session_cleanup_task(self.state.sessions.clone());

        let listener = TcpListener::bind(self.addr).await?;
        info!("Listening on {}", self.addr);

        axum::serve(listener, create_router(self.state)).await?;
        Ok(())
    }
}

/// Spawn the hourly sweep of expired sessions.
pub fn start_session_cleanup_task(sessions: Arc<SessionStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        // First tick fires immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            let removed = sessions.cleanup().await;
            if removed > 0 {
                debug!(removed, "Swept expired sessions");
            }
        }
    });
}
