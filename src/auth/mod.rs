//! Authentication for Depot: password hashing and token sessions.

mod password;
mod session;

pub use password::{hash_password, verify_password, PasswordError};
pub use session::{Session, SessionStore, SESSION_TTL_SECS};
