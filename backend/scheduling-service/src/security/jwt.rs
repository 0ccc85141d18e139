/// Bearer-token verification seam (HS256). The scheduling core never parses
/// tokens itself; it consumes the `(id, role)` pair this module yields.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Role;

/// Access token lifetime: 12 hours.
pub const TOKEN_TTL_SECS: i64 = 12 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, rendered as a string.
    pub sub: String,
    /// Actor role, verified once and trusted for the request lifetime.
    pub role: Role,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

static KEYS: OnceCell<(EncodingKey, DecodingKey)> = OnceCell::new();

/// Install the signing secret. Must run during startup before any token
/// operation; repeated calls keep the first secret.
pub fn initialize(secret: &str) {
    let _ = KEYS.set((
        EncodingKey::from_secret(secret.as_bytes()),
        DecodingKey::from_secret(secret.as_bytes()),
    ));
}

fn keys() -> Result<&'static (EncodingKey, DecodingKey)> {
    KEYS.get().ok_or_else(|| {
        AppError::Internal("JWT secret not initialized; call jwt::initialize at startup".into())
    })
}

pub fn generate_token(user_id: i64, role: Role) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
    };

    let (encoding_key, _) = keys()?;
    Ok(encode(&Header::default(), &claims, encoding_key)?)
}

pub fn validate_token(token: &str) -> Result<Claims> {
    let (_, decoding_key) = keys()?;
    let data = decode::<Claims>(token, decoding_key, &Validation::default())?;
    Ok(data.claims)
}
