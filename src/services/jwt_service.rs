// src/services/jwt_service.rs
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, errors::Error as JwtError, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use tracing::{debug, instrument};

use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::models::jwt::{Claims, TokenKind, TokenPair};

pub const DEFAULT_ACCESS_EXPIRY_HOURS: u32 = 1;
pub const DEFAULT_REFRESH_EXPIRY_HOURS: u32 = 72;
/// Upper bound for either window (100 years); larger values cannot be stamped reliably.
pub const MAX_EXPIRY_HOURS: u32 = 24 * 365 * 100;

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;
const HMAC_FAMILY: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Issues and checks session tokens.
pub trait TokenService: Send + Sync {
    /// Signs a fresh, unlinked access/refresh pair for the given identity.
    fn create_tokens(&self, user_id: i64, role: &str) -> Result<TokenPair>;

    /// Checks algorithm, signature and expiry, and returns the embedded claims.
    fn verify_access_token(&self, token: &str) -> Result<Claims>;
}

/// Thread-safe shared reference to a token service.
pub type SharedTokenService = Arc<dyn TokenService>;

#[derive(Clone)]
pub struct JwtService {
    enc_key: EncodingKey,
    dec_key: DecodingKey,
    validation: Validation,
    access_validity: Duration,
    refresh_validity: Duration,
}

impl JwtService {
    pub fn new(config: AuthConfig) -> Result<Self> {
        if config.signing_key.is_empty() {
            return Err(AuthError::Config("signing key is required".to_string()));
        }

        let access_hours = match config.access_token_expiry_hours {
            0 => DEFAULT_ACCESS_EXPIRY_HOURS,
            hours => hours,
        };
        let refresh_hours = match config.refresh_token_expiry_hours {
            0 => DEFAULT_REFRESH_EXPIRY_HOURS,
            hours => hours,
        };
        for (name, hours) in [("access", access_hours), ("refresh", refresh_hours)] {
            if hours > MAX_EXPIRY_HOURS {
                return Err(AuthError::Config(format!(
                    "{name} token expiry of {hours}h exceeds {MAX_EXPIRY_HOURS}h"
                )));
            }
        }

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = HMAC_FAMILY.to_vec();
        validation.leeway = 0;
        // expiry is compared against the caller's clock in `verify_at`
        validation.validate_exp = false;

        Ok(Self {
            enc_key: EncodingKey::from_secret(config.signing_key.as_bytes()),
            dec_key: DecodingKey::from_secret(config.signing_key.as_bytes()),
            validation,
            access_validity: Duration::hours(i64::from(access_hours)),
            refresh_validity: Duration::hours(i64::from(refresh_hours)),
        })
    }

    pub fn access_validity(&self) -> Duration {
        self.access_validity
    }

    pub fn refresh_validity(&self) -> Duration {
        self.refresh_validity
    }

    /* ---------- PRIVATE HELPERS ---------- */

    pub(crate) fn issue_at(&self, user_id: i64, role: &str, now: DateTime<Utc>) -> Result<TokenPair> {
        let access_claims = Claims::new(user_id, role, now, self.access_validity);
        let access_token = self.sign(TokenKind::Access, &access_claims)?;

        let refresh_claims = Claims::new(user_id, role, now, self.refresh_validity);
        let refresh_token = self.sign(TokenKind::Refresh, &refresh_claims)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub(crate) fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
        let header = decode_header(token).map_err(|e| reject("malformed header", &e))?;

        // Never trust the declared algorithm: only the HMAC family may reach the key.
        if !HMAC_FAMILY.contains(&header.alg) {
            debug!(alg = ?header.alg, "Rejected token: unexpected signing method");
            return Err(AuthError::InvalidToken);
        }

        let claims = decode::<Claims>(token, &self.dec_key, &self.validation)
            .map_err(|e| reject("signature or payload", &e))?
            .claims;

        if claims.is_expired_at(now) {
            debug!(user_id = claims.user_id, exp = claims.exp, "Rejected token: expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }

    fn sign(&self, kind: TokenKind, claims: &Claims) -> Result<String> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.enc_key)
            .map_err(|source| AuthError::Signing { kind, source })
    }
}

fn reject(stage: &'static str, err: &JwtError) -> AuthError {
    debug!(stage, error = %err, "Rejected token");
    AuthError::InvalidToken
}

impl TokenService for JwtService {
    #[instrument(skip(self))]
    fn create_tokens(&self, user_id: i64, role: &str) -> Result<TokenPair> {
        self.issue_at(user_id, role, Utc::now())
    }

    #[instrument(skip_all)]
    fn verify_access_token(&self, token: &str) -> Result<Claims> {
        self.verify_at(token, Utc::now())
    }
}

impl fmt::Debug for JwtService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtService")
            .field("access_validity", &self.access_validity)
            .field("refresh_validity", &self.refresh_validity)
            .finish_non_exhaustive()
    }
}
