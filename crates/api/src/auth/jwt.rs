//! JWT token generation and validation.
//!
//! Tokens are HS256-signed JWTs containing a [`Claims`] payload. Sessions are
//! stateless: a token stays valid until it expires, so the default lifetime
//! is long (30 days) to match the mobile-first usage pattern.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lapor_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// The user's role name (`"student"`, `"staff"`, or `"admin"`).
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in days (default: 30).
    pub token_expiry_days: i64,
}

/// Default token expiry in days.
const DEFAULT_TOKEN_EXPIRY_DAYS: i64 = 30;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                 | Required | Default |
    /// |-------------------------|----------|---------|
    /// | `JWT_SECRET`            | **yes**  | --      |
    /// | `JWT_TOKEN_EXPIRY_DAYS` | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let token_expiry_days: i64 = std::env::var("JWT_TOKEN_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_TOKEN_EXPIRY_DAYS must be a valid i64");

        Self {
            secret,
            token_expiry_days,
        }
    }
}

/// Generate an HS256 token for the given user.
///
/// The token contains the user id, role, issue time, expiration, and a
/// unique `jti` claim.
pub fn generate_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.token_expiry_days * 24 * 60 * 60;

    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode a token, returning the embedded [`Claims`].
///
/// Validates the signature, expiration, and issued-at claims automatically.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}
