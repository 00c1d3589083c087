use thiserror::Error;

use crate::models::jwt::TokenKind;

/// Everything the token service can fail with.
///
/// Verification failures are deliberately collapsed into [`AuthError::InvalidToken`]
/// so callers cannot tell a bad signature from an expired token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth config: {0}")]
    Config(String),

    #[error("failed to sign {kind} token")]
    Signing {
        kind: TokenKind,
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    #[error("invalid token")]
    InvalidToken,
}

impl AuthError {
    /// True when the host should answer "unauthenticated" rather than report a fault.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, AuthError::InvalidToken)
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
