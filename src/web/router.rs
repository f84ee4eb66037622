//! Route table.

use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::routing::{get, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{app, auth, file, user, AppState};

/// Build the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let sessions = state.sessions.clone();

    Router::new()
        .route("/status", get(app::status))
        .route("/stats", get(app::stats))
        .route("/users", post(user::register))
        .route("/users/me", get(user::me))
        .route("/connect", get(auth::connect))
        .route("/disconnect", get(auth::disconnect))
        .route("/files", post(file::create_node).get(file::list_nodes))
        .route("/files/:id", get(file::get_node))
        .route("/files/:id/publish", put(file::publish))
        .route("/files/:id/unpublish", put(file::unpublish))
        .route("/files/:id/data", get(file::node_data))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(move |mut req: Request, next: Next| {
                    let sessions = sessions.clone();
                    async move {
                        // Make the session store visible to extractors
                        req.extensions_mut().insert(sessions);
                        next.run(req).await
                    }
                })),
        )
        .with_state(state)
}
