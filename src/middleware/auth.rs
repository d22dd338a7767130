// ABOUTME: Request authentication from Authorization header or session cookie
// ABOUTME: Resolves the owning user and enforces CSRF for cookie-authenticated mutations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! # Request Authentication
//!
//! Accepted credentials, in order of precedence:
//!
//! - `Authorization: Bearer <key>`
//! - `Authorization: Token <key>`
//! - the `auth_token` cookie set at login
//!
//! Only cookie credentials are subject to CSRF checks.

use super::CsrfMiddleware;
use crate::constants::cookies;
use crate::security::cookies::get_cookie_value;
use crate::server::ServerResources;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, Method};
use socrai_core::errors::{AppError, AppResult};
use socrai_core::models::UserRecord;
use std::sync::Arc;

/// How the request presented its credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// `Authorization` header
    Header,
    /// Session cookie
    Cookie,
}

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The owning account
    pub user: UserRecord,
    /// Credential transport
    pub method: AuthMethod,
}

/// Session authentication backed by the shared resources
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Pull the raw session key from the request, if any
    fn extract_token(headers: &HeaderMap) -> AppResult<Option<(String, AuthMethod)>> {
        if let Some(value) = headers.get(header::AUTHORIZATION) {
            let value = value
                .to_str()
                .map_err(|_| AppError::auth_invalid("Malformed authorization header"))?;
            let token = value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("Token "))
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .ok_or_else(|| {
                    AppError::auth_invalid("Authorization header must use Bearer or Token scheme")
                })?;
            return Ok(Some((token.to_owned(), AuthMethod::Header)));
        }

        Ok(get_cookie_value(headers, cookies::AUTH_TOKEN)
            .filter(|token| !token.is_empty())
            .map(|token| (token, AuthMethod::Cookie)))
    }

    /// Authenticate if credentials are present
    ///
    /// # Errors
    ///
    /// Returns an auth error when credentials are present but invalid, and
    /// `CsrfInvalid` for cookie-authenticated mutations without a valid token.
    pub async fn try_authenticate(
        resources: &ServerResources,
        headers: &HeaderMap,
        method: &Method,
    ) -> AppResult<Option<AuthContext>> {
        let Some((token, auth_method)) = Self::extract_token(headers)? else {
            return Ok(None);
        };

        let claims = resources.auth_manager.validate_token(&token)?;
        let user = resources
            .database
            .get_user(&claims.sub)
            .await?
            .ok_or_else(|| AppError::auth_invalid("User for session no longer exists"))?;

        if auth_method == AuthMethod::Cookie {
            CsrfMiddleware::new(Arc::clone(&resources.csrf_manager))
                .validate_csrf(headers, method, &user.id)
                .await?;
        }

        Ok(Some(AuthContext {
            user,
            method: auth_method,
        }))
    }

    /// Authenticate the request
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when no credentials are present, plus every
    /// error of [`Self::try_authenticate`].
    pub async fn authenticate(
        resources: &ServerResources,
        headers: &HeaderMap,
        method: &Method,
    ) -> AppResult<AuthContext> {
        Self::try_authenticate(resources, headers, method)
            .await?
            .ok_or_else(AppError::auth_required)
    }
}

/// Extractor for handlers that require an authenticated user
pub struct AuthUser(pub AuthContext);

#[async_trait]
impl FromRequestParts<Arc<ServerResources>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        resources: &Arc<ServerResources>,
    ) -> Result<Self, Self::Rejection> {
        AuthMiddleware::authenticate(resources, &parts.headers, &parts.method)
            .await
            .map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(name: header::HeaderName, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_token_schemes() {
        let (token, method) = AuthMiddleware::extract_token(&headers(
            header::AUTHORIZATION,
            "Bearer abc",
        ))
        .unwrap()
        .unwrap();
        assert_eq!((token.as_str(), method), ("abc", AuthMethod::Header));

        let (token, _) =
            AuthMiddleware::extract_token(&headers(header::AUTHORIZATION, "Token def"))
                .unwrap()
                .unwrap();
        assert_eq!(token, "def");

        let (token, method) =
            AuthMiddleware::extract_token(&headers(header::COOKIE, "auth_token=ghi"))
                .unwrap()
                .unwrap();
        assert_eq!((token.as_str(), method), ("ghi", AuthMethod::Cookie));
    }

    #[test]
    fn test_extract_token_rejects_unknown_scheme() {
        assert!(
            AuthMiddleware::extract_token(&headers(header::AUTHORIZATION, "Basic Zm9vOmJhcg=="))
                .is_err()
        );
        assert!(AuthMiddleware::extract_token(&HeaderMap::new())
            .unwrap()
            .is_none());
    }
}
