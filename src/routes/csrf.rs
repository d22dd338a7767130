// ABOUTME: CSRF token issuance route
// ABOUTME: Returns a fresh token in the body and a script-readable csrftoken cookie
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

use crate::constants::cookies;
use crate::middleware::AuthMiddleware;
use crate::security::cookies::readable_cookie;
use crate::security::csrf::CSRF_TOKEN_EXPIRY_SECS;
use crate::server::ServerResources;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use socrai_core::errors::AppError;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CsrfTokenResponse {
    csrf_token: String,
}

/// CSRF token routes
pub struct CsrfRoutes;

impl CsrfRoutes {
    /// Create the token endpoint
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/csrf-token", get(Self::handle_csrf_token))
            .with_state(resources)
    }

    /// Handle GET /csrf-token
    ///
    /// Authenticated callers receive a token bound to their account.
    async fn handle_csrf_token(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = AuthMiddleware::try_authenticate(&resources, &headers, &Method::GET).await?;
        let user_id = auth.as_ref().map(|ctx| ctx.user.id.as_str());

        let token = resources.csrf_manager.generate_token(user_id).await;
        let cookie = readable_cookie(
            cookies::CSRF_TOKEN,
            &token,
            CSRF_TOKEN_EXPIRY_SECS,
            resources.config.secure_cookies,
        );

        Ok((
            [(header::SET_COOKIE, cookie)],
            Json(CsrfTokenResponse { csrf_token: token }),
        )
            .into_response())
    }
}
