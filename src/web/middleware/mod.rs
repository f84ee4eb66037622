//! Router middleware and request extractors.

pub mod auth;

pub use auth::{parse_basic_credentials, AuthUser, MaybeAuthUser, TOKEN_HEADER};
