//! Database schema migrations for Depot.
//!
//! Each entry is applied once, in order, inside its own transaction.
//! Never edit an applied migration; append a new one instead.

/// Ordered list of schema migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    "CREATE TABLE users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        email       TEXT NOT NULL COLLATE NOCASE,
        password    TEXT NOT NULL,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE UNIQUE INDEX idx_users_email ON users(email);",
    // v2: file nodes
    "CREATE TABLE nodes (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id    INTEGER NOT NULL REFERENCES users(id),
        name        TEXT NOT NULL,
        kind        TEXT NOT NULL,
        parent_id   INTEGER,
        is_public   INTEGER NOT NULL DEFAULT 0,
        content_ref TEXT,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX idx_nodes_owner_parent ON nodes(owner_id, parent_id);",
];
