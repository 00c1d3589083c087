//! Signed session tokens (access + refresh pairs) and request-scoped
//! identity propagation.

pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod services;
#[cfg(test)]
mod tests;

pub use config::AuthConfig;
pub use context::Context;
pub use error::{AuthError, Result};
pub use models::jwt::{Claims, TokenKind, TokenPair};
pub use services::jwt_service::{JwtService, SharedTokenService, TokenService};
