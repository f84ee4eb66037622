#![allow(dead_code)]

//! Shared setup for API tests.

use std::io::Cursor;
use std::sync::Arc;

use axum_test::TestServer;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tempfile::TempDir;

use depot::web::{create_router, AppState};
use depot::{BlobStorage, Database, DerivativeWorker, JobQueue, SessionStore};

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    _storage_dir: TempDir,
}

/// Build a full application on an in-memory database and a temporary
/// blob directory, with the derivative worker running.
pub async fn spawn_app() -> TestApp {
    let db = Database::open_in_memory().await.unwrap();
    let storage_dir = TempDir::new().unwrap();
    let storage = Arc::new(BlobStorage::new(storage_dir.path()).unwrap());
    let sessions = Arc::new(SessionStore::new());

    let (jobs, rx) = JobQueue::new();
    DerivativeWorker::new(jobs.clone(), rx, db.clone(), storage.clone()).spawn();

    let state = Arc::new(AppState {
        db,
        sessions,
        storage,
        jobs,
    });

    let server = TestServer::new(create_router(state.clone())).unwrap();

    TestApp {
        server,
        state,
        _storage_dir: storage_dir,
    }
}

/// Value for a Basic Authorization header.
pub fn basic_auth(email: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{email}:{password}")))
}

/// Register an account, returning its ID.
pub async fn register(app: &TestApp, email: &str, password: &str) -> i64 {
    let response = app
        .server
        .post("/users")
        .json(&serde_json::json!({ "email": email, "password": password }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<serde_json::Value>()["id"].as_i64().unwrap()
}

/// Open a session, returning the token.
pub async fn connect(app: &TestApp, email: &str, password: &str) -> String {
    let response = app
        .server
        .get("/connect")
        .add_header(axum::http::header::AUTHORIZATION, basic_auth(email, password))
        .await;

    response.assert_status_ok();
    response.json::<serde_json::Value>()["token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// A small valid PNG, base64-encoded for upload.
pub fn png_base64(width: u32, height: u32) -> String {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 200, 80]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    BASE64.encode(buf.into_inner())
}

/// The standard X-Token header name.
pub fn token_header() -> axum::http::HeaderName {
    axum::http::HeaderName::from_static("x-token")
}
