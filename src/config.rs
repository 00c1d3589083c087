use std::env;
use std::fmt;

use dotenv::dotenv;

use crate::error::{AuthError, Result};

pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
pub const ACCESS_EXPIRY_VAR: &str = "ACCESS_TOKEN_EXPIRY_HOURS";
pub const REFRESH_EXPIRY_VAR: &str = "REFRESH_TOKEN_EXPIRY_HOURS";

/// Token service settings. Zero hours means "use the default".
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub signing_key: String,
    pub access_token_expiry_hours: u32,
    pub refresh_token_expiry_hours: u32,
}

impl AuthConfig {
    pub fn new(
        signing_key: impl Into<String>,
        access_token_expiry_hours: u32,
        refresh_token_expiry_hours: u32,
    ) -> Self {
        Self {
            signing_key: signing_key.into(),
            access_token_expiry_hours,
            refresh_token_expiry_hours,
        }
    }

    /// Reads the config from the process environment, loading `.env` first.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let signing_key = lookup(SECRET_KEY_VAR).unwrap_or_default();
        let access_token_expiry_hours = parse_hours(&lookup, ACCESS_EXPIRY_VAR)?;
        let refresh_token_expiry_hours = parse_hours(&lookup, REFRESH_EXPIRY_VAR)?;

        Ok(Self {
            signing_key,
            access_token_expiry_hours,
            refresh_token_expiry_hours,
        })
    }
}

fn parse_hours<F>(lookup: &F, name: &str) -> Result<u32>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(0),
        Some(raw) if raw.trim().is_empty() => Ok(0),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AuthError::Config(format!("{name}: {e}"))),
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_key", &"<redacted>")
            .field("access_token_expiry_hours", &self.access_token_expiry_hours)
            .field("refresh_token_expiry_hours", &self.refresh_token_expiry_hours)
            .finish()
    }
}
