// ABOUTME: Standalone code analysis route handler
// ABOUTME: Validates the snippet and pill mode, then returns mentor feedback without persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

use super::json::JsonBody;
use crate::constants::defaults;
use crate::middleware::AuthUser;
use crate::server::ServerResources;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use socrai_core::errors::AppError;
use socrai_core::models::PillMode;
use std::sync::Arc;

/// Request to analyze a code snippet
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeCodeRequest {
    /// Source text
    pub code: Option<String>,
    /// Language of the snippet, `python` when absent
    pub language: Option<String>,
    /// Guidance tier, `green` when absent
    pub pill_mode: Option<String>,
}

/// Code analysis response
#[derive(Debug, Serialize)]
pub struct AnalyzeCodeResponse {
    /// Mentor feedback
    pub analysis: String,
}

/// Code analysis routes
pub struct AnalysisRoutes;

impl AnalysisRoutes {
    /// Create the analysis route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/analyze-code", post(Self::handle_analyze_code))
            .with_state(resources)
    }

    /// Handle POST /api/analyze-code
    async fn handle_analyze_code(
        State(resources): State<Arc<ServerResources>>,
        AuthUser(auth): AuthUser,
        JsonBody(request): JsonBody<AnalyzeCodeRequest>,
    ) -> Result<Json<AnalyzeCodeResponse>, AppError> {
        let code = request
            .code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
            .ok_or_else(|| AppError::invalid_field("code", "No code provided"))?;

        let pill_mode = request
            .pill_mode
            .as_deref()
            .map_or(Ok(PillMode::default()), str::parse::<PillMode>)?;

        let language = request
            .language
            .as_deref()
            .map(str::trim)
            .filter(|language| !language.is_empty())
            .unwrap_or(defaults::LANGUAGE);

        tracing::debug!(user_id = %auth.user.id, "Code analysis requested");

        let analysis = resources
            .code_analyzer
            .analyze(code, pill_mode, language)
            .await;

        Ok(Json(AnalyzeCodeResponse { analysis }))
    }
}
