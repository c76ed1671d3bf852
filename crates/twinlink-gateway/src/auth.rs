//! Password hashing and bearer tokens.
//!
//! Tokens are HS256 JWTs whose subject is the user's nickname. Hashes are
//! Argon2id PHC strings; both hashing and verification are CPU bound and
//! are run through [`tokio::task::spawn_blocking`] by the handlers.

use crate::error::AppError;
use crate::state::AppState;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jiff::Timestamp;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use typed_builder::TypedBuilder;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingToken,
    #[error("authorization header must be 'Bearer <token>'")]
    MalformedHeader,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("failed to issue token: {0}")]
    Issue(String),
    #[error("failed to hash password: {0}")]
    Hashing(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Nickname of the authenticated user.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone, TypedBuilder)]
pub struct AuthConfig {
    #[builder(setter(into))]
    secret: String,
    #[builder(default = Duration::from_secs(300))]
    token_ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Issues and verifies bearer tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(config: AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl_secs: i64::try_from(config.token_ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    pub fn issue(&self, nickname: &str) -> Result<String, AuthError> {
        self.issue_at(nickname, Timestamp::now())
    }

    pub(crate) fn issue_at(&self, nickname: &str, issued_at: Timestamp) -> Result<String, AuthError> {
        let iat = issued_at.as_second();
        let claims = Claims {
            sub: nickname.to_owned(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

/// Hashes `password` into an Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Returns `false` for a wrong password and for an unparsable hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// The caller identified by a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub nickname: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?;
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MalformedHeader)?;

        let claims = state.tokens().verify(token)?;
        Ok(AuthUser {
            nickname: claims.sub,
        })
    }
}
