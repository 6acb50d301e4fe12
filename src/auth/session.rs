//! Session token encoding and decoding using HS256.
//!
//! The logged-in username travels in a signed JWT stored in the
//! `session` cookie. A missing, expired or tampered token means anonymous.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

/// Cookie name for the session token.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Session claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: username
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Encode a session token for `username`.
pub fn encode_session(username: &str, secret: &str, expiry_secs: u64) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: username.to_string(),
        iat: now,
        exp: now + expiry_secs as i64,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode session token")
}

/// Decode and validate a session token.
pub fn decode_session(token: &str, secret: &str) -> Result<SessionClaims> {
    let token_data: TokenData<SessionClaims> = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode session token")?;

    Ok(token_data.claims)
}
