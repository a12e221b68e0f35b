//! Bearer token issuance and verification

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use parts_core::{PartsError, PartsResult};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Tokens live for one day and are never refreshed
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Claims carried by every bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Identity of the caller
    pub email: String,
    /// Issued at (Unix epoch)
    pub iat: i64,
    /// Expiration (Unix epoch)
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(email: impl Into<String>, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            email: email.into(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }
}

/// Signs and verifies HS256 tokens with the shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[hidden]")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(TOKEN_LIFETIME_HOURS),
        }
    }

    /// Issue a fresh token for `email`
    pub fn issue(&self, email: &str) -> PartsResult<String> {
        let claims = TokenClaims::new(email, self.lifetime);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PartsError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Check signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> PartsResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| PartsError::Forbidden(format!("Invalid token: {}", e)))
    }
}

/// Second whitespace-delimited segment of the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> PartsResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| PartsError::Unauthenticated("Missing Authorization header".to_string()))?;

    let value = value.to_str().map_err(|_| {
        PartsError::Unauthenticated("Authorization header is not valid ASCII".to_string())
    })?;

    value.split_whitespace().nth(1).ok_or_else(|| {
        PartsError::Unauthenticated("Authorization header carries no token".to_string())
    })
}
