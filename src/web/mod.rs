//! HTTP layer: router, handlers, extractors and the server itself.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
