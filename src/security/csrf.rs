// ABOUTME: CSRF (Cross-Site Request Forgery) protection token generation and validation
// ABOUTME: Provides random expiring tokens, optionally bound to the user that requested them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! CSRF protection module
//!
//! Tokens are 256-bit random values rendered as hex. A token fetched before
//! login is anonymous and accepted for any user; a token fetched while
//! authenticated only validates for that user.
//!
//! Storage is a bounded LRU: once full, issuing a token evicts the oldest
//! one, so unauthenticated callers cannot grow the store without limit.

use lru::LruCache;
use rand::Rng;
use socrai_core::errors::{AppError, AppResult};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// CSRF token length in bytes (32 bytes = 256 bits)
const CSRF_TOKEN_LENGTH: usize = 32;

/// CSRF token expiration in seconds (30 minutes)
pub const CSRF_TOKEN_EXPIRY_SECS: i64 = 30 * 60;

/// Maximum number of live tokens held at once
pub const MAX_CSRF_TOKENS: NonZeroUsize = match NonZeroUsize::new(10_000) {
    Some(n) => n,
    None => unreachable!(),
};

/// CSRF token metadata (token itself is the cache key)
#[derive(Clone)]
struct CsrfToken {
    user_id: Option<String>,
    expires_at: chrono::DateTime<chrono::Utc>,
}

/// CSRF token manager with in-memory storage
pub struct CsrfTokenManager {
    tokens: Arc<RwLock<LruCache<String, CsrfToken>>>,
}

impl CsrfTokenManager {
    /// Create a new CSRF token manager holding up to [`MAX_CSRF_TOKENS`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_CSRF_TOKENS)
    }

    /// Create a manager with a custom token capacity
    #[must_use]
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Generate a new CSRF token, bound to `user_id` when given
    pub async fn generate_token(&self, user_id: Option<&str>) -> String {
        let random_bytes: Vec<u8> = (0..CSRF_TOKEN_LENGTH)
            .map(|_| rand::thread_rng().gen())
            .collect();

        let token = hex::encode(random_bytes);
        let expires_at = chrono::Utc::now() + chrono::Duration::seconds(CSRF_TOKEN_EXPIRY_SECS);

        let mut tokens = self.tokens.write().await;
        Self::cleanup_expired_tokens_locked(&mut tokens);
        // evicts the least recently issued token when full
        tokens.push(
            token.clone(),
            CsrfToken {
                user_id: user_id.map(ToOwned::to_owned),
                expires_at,
            },
        );
        drop(tokens);

        token
    }

    /// Validate a CSRF token for a user
    ///
    /// # Errors
    ///
    /// Returns `CsrfInvalid` if:
    /// - Token is not found
    /// - Token has expired
    /// - Token is bound to a different user
    pub async fn validate_token(&self, token: &str, user_id: &str) -> AppResult<()> {
        let csrf_token = {
            let tokens = self.tokens.read().await;
            tokens
                .peek(token)
                .ok_or_else(|| AppError::csrf_invalid("Invalid CSRF token"))?
                .clone()
        };

        if chrono::Utc::now() > csrf_token.expires_at {
            return Err(AppError::csrf_invalid("CSRF token expired"));
        }

        if let Some(owner) = csrf_token.user_id {
            if owner != user_id {
                return Err(AppError::csrf_invalid("CSRF token user mismatch"));
            }
        }

        Ok(())
    }

    /// Number of live tokens
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Whether no tokens are stored
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    fn cleanup_expired_tokens_locked(tokens: &mut LruCache<String, CsrfToken>) {
        let now = chrono::Utc::now();
        let expired: Vec<String> = tokens
            .iter()
            .filter(|(_, csrf_token)| csrf_token.expires_at <= now)
            .map(|(token, _)| token.clone())
            .collect();
        for token in &expired {
            tokens.pop(token);
        }
    }

    #[cfg(test)]
    async fn insert_with_expiry(
        &self,
        token: &str,
        user_id: Option<&str>,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) {
        self.tokens.write().await.push(
            token.to_owned(),
            CsrfToken {
                user_id: user_id.map(ToOwned::to_owned),
                expires_at,
            },
        );
    }
}

impl Default for CsrfTokenManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socrai_core::errors::ErrorCode;

    #[tokio::test]
    async fn test_token_shape() {
        let manager = CsrfTokenManager::new();
        let token = manager.generate_token(None).await;
        assert_eq!(token.len(), CSRF_TOKEN_LENGTH * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, manager.generate_token(None).await);
    }

    #[tokio::test]
    async fn test_bound_token_rejects_other_user() {
        let manager = CsrfTokenManager::new();
        let token = manager.generate_token(Some("user-a")).await;
        manager.validate_token(&token, "user-a").await.unwrap();

        let err = manager.validate_token(&token, "user-b").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CsrfInvalid);
    }

    #[tokio::test]
    async fn test_anonymous_token_accepts_any_user() {
        let manager = CsrfTokenManager::new();
        let token = manager.generate_token(None).await;
        manager.validate_token(&token, "user-a").await.unwrap();
        manager.validate_token(&token, "user-b").await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_and_expired_tokens_rejected() {
        let manager = CsrfTokenManager::new();
        assert!(manager.validate_token("deadbeef", "u").await.is_err());

        let past = chrono::Utc::now() - chrono::Duration::seconds(1);
        manager.insert_with_expiry("stale", None, past).await;
        let err = manager.validate_token("stale", "u").await.unwrap_err();
        assert_eq!(err.message, "CSRF token expired");

        // next insert sweeps the stale entry
        manager.generate_token(None).await;
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_anonymous_issuance_is_bounded() {
        let manager = CsrfTokenManager::with_capacity(NonZeroUsize::new(3).unwrap());
        let first = manager.generate_token(None).await;
        for _ in 0..50 {
            manager.generate_token(None).await;
        }
        assert_eq!(manager.len().await, 3);

        let err = manager.validate_token(&first, "u").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CsrfInvalid);

        let latest = manager.generate_token(Some("u")).await;
        manager.validate_token(&latest, "u").await.unwrap();
    }
}
