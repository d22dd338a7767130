// ABOUTME: HTTP middleware for authentication, CSRF validation and CORS
// ABOUTME: Request-scoped checks shared by every authenticated route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

/// Session authentication and the `AuthUser` extractor
pub mod auth;
/// CORS layer configuration
pub mod cors;
/// CSRF validation for cookie-authenticated mutations
pub mod csrf;

pub use auth::{AuthContext, AuthMethod, AuthMiddleware, AuthUser};
pub use csrf::CsrfMiddleware;
