//! Authentication

pub mod jwt;

pub use jwt::{require_auth, AuthUser, JwtValidator};
