// ABOUTME: Account registration, login, logout and current-user route handlers
// ABOUTME: Validates credentials with field-level detail and issues cookie-backed sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! Authentication routes
//!
//! Registration requires first and last name in addition to the usual
//! username, email and password pair. Login accepts either the email or the
//! username and returns the session key in the body as well as an HttpOnly
//! cookie.

use super::json::JsonBody;
use crate::constants::{cookies, limits, RESERVED_USERNAMES};
use crate::database::NewUser;
use crate::middleware::AuthUser;
use crate::security::cookies::{expired_cookie, readable_cookie, session_cookie};
use crate::security::csrf::CSRF_TOKEN_EXPIRY_SECS;
use crate::server::ServerResources;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use socrai_core::errors::{AppError, FieldErrors};
use socrai_core::models::UserRecord;
use std::sync::Arc;
use tracing::info;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";

/// Registration payload
///
/// Every field is optional at the type level so missing fields are reported
/// individually instead of as a body parse error.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    /// Login name
    pub username: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Password
    pub password1: Option<String>,
    /// Password confirmation
    pub password2: Option<String>,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
}

/// Registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Identifier of the created account
    pub user_id: String,
    /// Human-readable confirmation
    pub message: String,
}

/// Login payload; either `email` or `username` identifies the account
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: Option<String>,
    /// Login name
    pub username: Option<String>,
    /// Password
    pub password: Option<String>,
}

/// Public account details
#[derive(Debug, Serialize)]
pub struct UserDetails {
    /// User ID
    pub id: String,
    /// Login name
    pub username: String,
    /// Email address
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

impl From<&UserRecord> for UserDetails {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session key, also set as the `auth_token` cookie
    pub key: String,
    /// CSRF token bound to the new session
    pub csrf_token: String,
    /// Session expiry (RFC 3339)
    pub expires_at: String,
    /// Logged in account
    pub user: UserDetails,
}

/// Validated registration fields
struct Registration {
    username: String,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

fn required_field(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> String {
    match value.map(str::trim) {
        None => {
            errors.add(field, REQUIRED);
            String::new()
        }
        Some("") => {
            errors.add(field, BLANK);
            String::new()
        }
        Some(value) => value.to_owned(),
    }
}

/// Minimal shape check: a local part, an `@`, and a dotted domain
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn validate_password(errors: &mut FieldErrors, password: &str, username: &str) {
    if password.chars().count() < limits::PASSWORD_MIN_CHARS {
        errors.add(
            "password1",
            format!(
                "This password is too short. It must contain at least {} characters.",
                limits::PASSWORD_MIN_CHARS
            ),
        );
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        errors.add("password1", "This password is entirely numeric.");
    }
    if !username.is_empty() && password.eq_ignore_ascii_case(username) {
        errors.add("password1", "The password is too similar to the username.");
    }
}

impl RegisterRequest {
    /// Shape and policy checks that need no database access
    fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = required_field(&mut errors, "username", self.username.as_deref());
        let email = required_field(&mut errors, "email", self.email.as_deref());
        let first_name = required_field(&mut errors, "first_name", self.first_name.as_deref());
        let last_name = required_field(&mut errors, "last_name", self.last_name.as_deref());

        if !username.is_empty() {
            if username.chars().count() > limits::USERNAME_MAX_CHARS {
                errors.add(
                    "username",
                    format!(
                        "Ensure this field has no more than {} characters.",
                        limits::USERNAME_MAX_CHARS
                    ),
                );
            }
            if !is_valid_username(&username) {
                errors.add(
                    "username",
                    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
                );
            }
            if RESERVED_USERNAMES
                .iter()
                .any(|reserved| reserved.eq_ignore_ascii_case(&username))
            {
                errors.add("username", "This username is reserved.");
            }
        }

        if !email.is_empty() && !is_valid_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }

        let password = match (self.password1.as_deref(), self.password2.as_deref()) {
            (None, _) => {
                errors.add("password1", REQUIRED);
                String::new()
            }
            (Some(""), _) => {
                errors.add("password1", BLANK);
                String::new()
            }
            (Some(password), confirmation) => {
                match confirmation {
                    None => errors.add("password2", REQUIRED),
                    Some(confirmation) if confirmation != password => {
                        errors.add("password2", "The two password fields didn't match.");
                    }
                    Some(_) => validate_password(&mut errors, password, &username),
                }
                password.to_owned()
            }
        };

        if errors.is_empty() {
            Ok(Registration {
                username,
                email,
                password,
                first_name,
                last_name,
            })
        } else {
            Err(errors)
        }
    }
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/registration", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/logout", post(Self::handle_logout))
            .route("/api/auth/user", get(Self::handle_current_user))
            .with_state(resources)
    }

    /// Handle POST /api/auth/registration
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        JsonBody(request): JsonBody<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let registration = request.validate().map_err(FieldErrors::into_error)?;

        let database = &resources.database;
        let mut conflicts = FieldErrors::new();
        if database
            .get_user_by_username(&registration.username)
            .await?
            .is_some()
        {
            conflicts.add("username", "A user with that username already exists.");
        }
        if database
            .get_user_by_email(&registration.email)
            .await?
            .is_some()
        {
            conflicts.add("email", "A user is already registered with this e-mail address.");
        }
        if !conflicts.is_empty() {
            let details = serde_json::to_value(&conflicts)?;
            return Err(AppError::already_exists("Account already exists").with_details(details));
        }

        let password_hash = resources
            .auth_manager
            .hash_password(&registration.password)
            .await?;

        let user = database
            .create_user(&NewUser {
                username: &registration.username,
                email: &registration.email,
                first_name: &registration.first_name,
                last_name: &registration.last_name,
                password_hash: &password_hash,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");

        Ok((
            StatusCode::CREATED,
            Json(RegisterResponse {
                user_id: user.id,
                message: "User registered successfully".to_owned(),
            }),
        )
            .into_response())
    }

    /// Handle POST /api/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        JsonBody(request): JsonBody<LoginRequest>,
    ) -> Result<Response, AppError> {
        let password = request.password.as_deref().unwrap_or_default();
        let identifier = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(|email| (email, true))
            .or_else(|| {
                request
                    .username
                    .as_deref()
                    .map(str::trim)
                    .filter(|username| !username.is_empty())
                    .map(|username| (username, false))
            });

        let Some((identifier, is_email)) = identifier.filter(|_| !password.is_empty()) else {
            return Err(AppError::invalid_input(
                "Must include either \"username\" or \"email\" and \"password\".",
            ));
        };

        let user = if is_email {
            resources.database.get_user_by_email(identifier).await?
        } else {
            resources.database.get_user_by_username(identifier).await?
        };

        let invalid = || AppError::auth_invalid("Unable to log in with provided credentials.");
        let user = user.ok_or_else(invalid)?;
        if !resources
            .auth_manager
            .verify_password(password, &user.password_hash)
            .await?
        {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(invalid());
        }

        resources.database.update_last_login(&user.id).await?;

        let session = resources.auth_manager.generate_token(&user)?;
        let csrf_token = resources.csrf_manager.generate_token(Some(&user.id)).await;
        let secure = resources.config.secure_cookies;
        let max_age = resources.auth_manager.token_expiry_hours() * 3600;

        info!(user_id = %user.id, "User logged in");

        Ok((
            AppendHeaders([
                (
                    header::SET_COOKIE,
                    session_cookie(cookies::AUTH_TOKEN, &session.token, max_age, secure),
                ),
                (
                    header::SET_COOKIE,
                    readable_cookie(
                        cookies::CSRF_TOKEN,
                        &csrf_token,
                        CSRF_TOKEN_EXPIRY_SECS,
                        secure,
                    ),
                ),
            ]),
            Json(LoginResponse {
                key: session.token,
                csrf_token,
                expires_at: session.expires_at.to_rfc3339(),
                user: UserDetails::from(&user),
            }),
        )
            .into_response())
    }

    /// Handle POST /api/auth/logout
    ///
    /// Sessions are stateless; logging out drops the cookie.
    async fn handle_logout() -> Response {
        (
            [(header::SET_COOKIE, expired_cookie(cookies::AUTH_TOKEN))],
            Json(serde_json::json!({ "detail": "Successfully logged out." })),
        )
            .into_response()
    }

    /// Handle GET /api/auth/user
    async fn handle_current_user(AuthUser(auth): AuthUser) -> Json<UserDetails> {
        Json(UserDetails::from(&auth.user))
    }
}
