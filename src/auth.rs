// ABOUTME: Session token issuance/validation and password hashing
// ABOUTME: HS256 JWT sessions with bcrypt hashing offloaded from the async executor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! # Authentication
//!
//! Session keys are HS256 `JWT`s carrying the user id, username and email.
//! Password hashing uses bcrypt inside `spawn_blocking` so a login never
//! stalls other requests on the runtime.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use socrai_core::errors::{AppError, AppResult};
use socrai_core::models::UserRecord;

/// Audience claim for session tokens
const TOKEN_AUDIENCE: &str = "socrai";

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// Login name
    pub username: String,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience (who the token is intended for)
    pub aud: String,
}

/// Issued session token
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// Encoded `JWT`
    pub token: String,
    /// Expiry instant
    pub expires_at: DateTime<Utc>,
}

/// Authentication manager for `JWT` tokens and password hashes
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor (minimum 4)
    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost.max(4);
        self
    }

    /// Session lifetime in hours
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    /// Generate a session token for a user
    ///
    /// # Errors
    ///
    /// Returns an internal error if encoding fails
    pub fn generate_token(&self, user: &UserRecord) -> AppResult<SessionToken> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            aud: TOKEN_AUDIENCE.to_owned(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign session token: {e}")))?;

        Ok(SessionToken { token, expires_at })
    }

    /// Validate a session token
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` for expired tokens and `AuthInvalid` for any
    /// other signature, audience or format problem.
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::auth_expired(),
                _ => AppError::auth_invalid(format!("Invalid session token: {e}")),
            })
    }

    /// Hash a password with bcrypt off the async executor
    ///
    /// # Errors
    ///
    /// Returns an internal error if hashing fails or the worker panics
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// Verify a password against a stored bcrypt hash
    ///
    /// # Errors
    ///
    /// Returns an internal error if the worker panics; a malformed hash
    /// verifies as `false`.
    pub async fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?;
        Ok(verified.unwrap_or(false))
    }
}

/// Generate a random `JWT` secret
///
/// # Errors
///
/// Returns an error if the operating system RNG fails
pub fn generate_jwt_secret() -> Result<[u8; 64]> {
    let mut secret = [0u8; 64];
    rand::rngs::OsRng.try_fill_bytes(&mut secret).map_err(|e| {
        tracing::error!("Failed to generate JWT secret: {}", e);
        anyhow::anyhow!("System RNG failure - cannot generate secure JWT secret")
    })?;
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use socrai_core::errors::ErrorCode;

    fn user() -> UserRecord {
        UserRecord {
            id: "0b6e0c9e-1111-4a4a-9c9c-222222222222".to_owned(),
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            password_hash: String::new(),
            created_at: "2026-01-01T00:00:00.000000Z".to_owned(),
            last_login: None,
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let manager = AuthManager::new(b"test-secret", 24);
        let session = manager.generate_token(&user()).unwrap();
        assert!(session.expires_at > Utc::now());

        let claims = manager.validate_token(&session.token).unwrap();
        assert_eq!(claims.sub, user().id);
        assert_eq!(claims.username, "ada");
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = AuthManager::new(b"secret-one", 24);
        let verifier = AuthManager::new(b"secret-two", 24);
        let session = issuer.generate_token(&user()).unwrap();
        let err = verifier.validate_token(&session.token).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }

    #[test]
    fn test_expired_token_reports_expiry() {
        let manager = AuthManager::new(b"test-secret", -1);
        let session = manager.generate_token(&user()).unwrap();
        let err = manager.validate_token(&session.token).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthExpired);
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let manager = AuthManager::new(b"test-secret", 24);
        let err = manager.validate_token("not.a.jwt").unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let manager = AuthManager::new(b"test-secret", 24).with_bcrypt_cost(4);
        let hash = manager.hash_password("correct horse").await.unwrap();
        assert!(manager.verify_password("correct horse", &hash).await.unwrap());
        assert!(!manager.verify_password("wrong horse", &hash).await.unwrap());
        assert!(!manager.verify_password("x", "not-a-hash").await.unwrap());
    }

    #[test]
    fn test_generated_secrets_differ() {
        assert_ne!(generate_jwt_secret().unwrap(), generate_jwt_secret().unwrap());
    }
}
