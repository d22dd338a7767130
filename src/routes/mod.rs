// ABOUTME: Route module organization for the SocrAI HTTP API
// ABOUTME: Groups handlers by domain; each module exposes a routes() builder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! Route module for the SocrAI server
//!
//! Each domain module contains route definitions and thin handlers that
//! delegate to the database and service layers.

/// Standalone code analysis route
pub mod analysis;
/// Registration, login, logout and current user
pub mod auth;
/// Conversation and send-message routes
pub mod chat;
/// CSRF token issuance
pub mod csrf;
/// Health check
pub mod health;
/// JSON body extractor with standard error envelope
pub mod json;
/// Profile "me" routes
pub mod profile;

pub use analysis::AnalysisRoutes;
pub use auth::AuthRoutes;
pub use chat::ChatRoutes;
pub use csrf::CsrfRoutes;
pub use health::HealthRoutes;
pub use profile::ProfileRoutes;
