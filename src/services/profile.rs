// ABOUTME: Profile "me" view combining mentoring preferences with account identity
// ABOUTME: Fetch-or-create then optional partial update of the two preference fields

use crate::database::Database;
use serde::{Deserialize, Serialize};
use socrai_core::errors::{AppError, AppResult};
use socrai_core::models::{PillMode, ProfileRecord, UserRecord};

/// Account identity embedded in the profile view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUser {
    /// User ID
    pub id: String,
    /// Login name
    pub username: String,
    /// Email address
    pub email: String,
}

/// Profile as returned by `/api/profile/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    /// Profile ID
    pub id: String,
    /// Owning account
    pub user: ProfileUser,
    /// Preferred guidance tier
    pub preferred_pill_mode: PillMode,
    /// Preferred language
    pub preferred_language: String,
}

impl ProfileView {
    fn assemble(profile: ProfileRecord, user: &UserRecord) -> Self {
        Self {
            id: profile.id,
            user: ProfileUser {
                id: user.id.clone(),
                username: user.username.clone(),
                email: user.email.clone(),
            },
            preferred_pill_mode: profile.preferred_pill_mode,
            preferred_language: profile.preferred_language,
        }
    }
}

/// Partial preference update; absent fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New guidance tier
    pub preferred_pill_mode: Option<PillMode>,
    /// New language
    pub preferred_language: Option<String>,
}

/// Fetch the caller's profile, creating defaults on first access
///
/// # Errors
///
/// Returns database errors from the lookup or insert.
pub async fn get_profile(database: &Database, user: &UserRecord) -> AppResult<ProfileView> {
    let profile = database.get_or_create_profile(&user.id).await?;
    Ok(ProfileView::assemble(profile, user))
}

/// Fetch-or-create the caller's profile and apply `update`
///
/// # Errors
///
/// Returns `InvalidInput` for a blank or overlong language, or database errors.
pub async fn update_profile(
    database: &Database,
    user: &UserRecord,
    update: &ProfileUpdate,
) -> AppResult<ProfileView> {
    let language = update
        .preferred_language
        .as_deref()
        .map(str::trim)
        .map(|language| {
            if language.is_empty() {
                Err(AppError::invalid_field(
                    "preferred_language",
                    "This field may not be blank.",
                ))
            } else if language.chars().count() > crate::constants::limits::LANGUAGE_MAX_CHARS {
                Err(AppError::invalid_field(
                    "preferred_language",
                    format!(
                        "Ensure this field has no more than {} characters.",
                        crate::constants::limits::LANGUAGE_MAX_CHARS
                    ),
                ))
            } else {
                Ok(language)
            }
        })
        .transpose()?;

    let profile = database
        .update_profile(&user.id, update.preferred_pill_mode, language)
        .await?;
    Ok(ProfileView::assemble(profile, user))
}
