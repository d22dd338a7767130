// ABOUTME: Profile "me" route handlers
// ABOUTME: Fetch-or-create the caller's mentoring preferences with partial updates

use super::json::JsonBody;
use crate::middleware::AuthUser;
use crate::server::ServerResources;
use crate::services::profile::{self, ProfileUpdate, ProfileView};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use socrai_core::errors::AppError;
use socrai_core::models::PillMode;
use std::sync::Arc;

/// Partial profile update payload
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    /// New guidance tier
    pub preferred_pill_mode: Option<String>,
    /// New language
    pub preferred_language: Option<String>,
}

impl UpdateProfileRequest {
    fn into_update(self) -> Result<ProfileUpdate, AppError> {
        let preferred_pill_mode = self
            .preferred_pill_mode
            .as_deref()
            .map(|value| {
                value.parse::<PillMode>().map_err(|_| {
                    AppError::invalid_field(
                        "preferred_pill_mode",
                        format!("\"{value}\" is not a valid choice."),
                    )
                })
            })
            .transpose()?;

        Ok(ProfileUpdate {
            preferred_pill_mode,
            preferred_language: self.preferred_language,
        })
    }
}

/// Profile routes
pub struct ProfileRoutes;

impl ProfileRoutes {
    /// Create the profile routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/profile/me",
                get(Self::handle_get_profile).put(Self::handle_update_profile),
            )
            .with_state(resources)
    }

    /// Handle GET /api/profile/me
    async fn handle_get_profile(
        State(resources): State<Arc<ServerResources>>,
        AuthUser(auth): AuthUser,
    ) -> Result<Json<ProfileView>, AppError> {
        profile::get_profile(&resources.database, &auth.user)
            .await
            .map(Json)
    }

    /// Handle PUT /api/profile/me
    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        AuthUser(auth): AuthUser,
        JsonBody(request): JsonBody<UpdateProfileRequest>,
    ) -> Result<Json<ProfileView>, AppError> {
        let update = request.into_update()?;
        profile::update_profile(&resources.database, &auth.user, &update)
            .await
            .map(Json)
    }
}
