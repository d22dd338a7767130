// ABOUTME: CSRF validation middleware for state-changing HTTP requests
// ABOUTME: Validates the X-CSRF-Token (or X-CSRFToken) header against issued tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! CSRF validation middleware
//!
//! Applies to POST, PUT, DELETE and PATCH requests whose credentials the
//! browser attaches on its own (the session cookie).

use crate::security::csrf::CsrfTokenManager;
use axum::http::{HeaderMap, Method};
use socrai_core::errors::{AppError, AppResult};
use std::sync::Arc;

/// Header names accepted for the CSRF token
const CSRF_HEADERS: [&str; 2] = ["x-csrf-token", "x-csrftoken"];

/// CSRF validation middleware
#[derive(Clone)]
pub struct CsrfMiddleware {
    csrf_manager: Arc<CsrfTokenManager>,
}

impl CsrfMiddleware {
    /// Create new CSRF middleware
    #[must_use]
    pub const fn new(csrf_manager: Arc<CsrfTokenManager>) -> Self {
        Self { csrf_manager }
    }

    /// Validate CSRF token for state-changing requests
    ///
    /// # Errors
    ///
    /// Returns `CsrfInvalid` if:
    /// - CSRF token header is missing for state-changing request
    /// - CSRF token is invalid or expired
    /// - CSRF token is bound to another user
    pub async fn validate_csrf(
        &self,
        headers: &HeaderMap,
        method: &Method,
        user_id: &str,
    ) -> AppResult<()> {
        if !Self::requires_csrf_validation(method) {
            return Ok(());
        }

        let csrf_token = CSRF_HEADERS
            .iter()
            .find_map(|name| headers.get(*name).and_then(|h| h.to_str().ok()))
            .ok_or_else(|| {
                tracing::warn!(
                    user_id = %user_id,
                    method = %method,
                    "CSRF token missing for state-changing request"
                );
                AppError::csrf_invalid("CSRF token required for this operation")
            })?;

        self.csrf_manager
            .validate_token(csrf_token, user_id)
            .await
            .map_err(|e| {
                tracing::warn!(
                    user_id = %user_id,
                    method = %method,
                    error = %e,
                    "CSRF token validation failed"
                );
                e
            })?;

        tracing::debug!(user_id = %user_id, method = %method, "CSRF token validated");

        Ok(())
    }

    /// Check if request requires CSRF validation
    #[must_use]
    pub const fn requires_csrf_validation(method: &Method) -> bool {
        matches!(
            *method,
            Method::POST | Method::PUT | Method::DELETE | Method::PATCH
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use socrai_core::errors::ErrorCode;

    #[tokio::test]
    async fn test_safe_methods_skip_validation() {
        let middleware = CsrfMiddleware::new(Arc::new(CsrfTokenManager::new()));
        middleware
            .validate_csrf(&HeaderMap::new(), &Method::GET, "u")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_header_is_forbidden() {
        let middleware = CsrfMiddleware::new(Arc::new(CsrfTokenManager::new()));
        let err = middleware
            .validate_csrf(&HeaderMap::new(), &Method::POST, "u")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CsrfInvalid);
        assert_eq!(err.http_status(), 403);
    }

    #[tokio::test]
    async fn test_either_header_name_is_accepted() {
        let manager = Arc::new(CsrfTokenManager::new());
        let middleware = CsrfMiddleware::new(Arc::clone(&manager));

        for name in CSRF_HEADERS {
            let token = manager.generate_token(Some("u")).await;
            let mut headers = HeaderMap::new();
            headers.insert(name, HeaderValue::from_str(&token).unwrap());
            middleware
                .validate_csrf(&headers, &Method::PUT, "u")
                .await
                .unwrap();
        }
    }
}
