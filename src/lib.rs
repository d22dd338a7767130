// ABOUTME: Main library entry point for the SocrAI mentor API
// ABOUTME: Conversations, code analysis and profiles backed by pill-mode guided LLM prompts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

#![deny(unsafe_code)]

//! # SocrAI Server
//!
//! Backend for a Socratic coding mentor. Learners open conversations tagged
//! with a pill mode (green, blue or red) and a target language, and receive
//! replies that guide them toward a solution instead of handing it over.
//!
//! ## Architecture
//!
//! - **Routes**: thin axum handlers per domain
//! - **Services**: response generation, code analysis, turn orchestration
//! - **LLM**: provider trait, `OpenAI`-compatible client, prompt registry
//! - **Database**: `SQLite` schema for users, conversations, messages, profiles
//! - **Auth**: bcrypt password hashes and HS256 session tokens, CSRF tokens
//!   for cookie sessions
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use socrai_server::config::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     socrai_server::server::serve(config).await
//! }
//! ```

/// Password hashing and session tokens
pub mod auth;

/// Environment configuration
pub mod config;

/// Application constants and defaults
pub mod constants;

/// `SQLite` persistence
pub mod database;

/// Language model provider and prompt registry
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Request authentication, CSRF and CORS
pub mod middleware;

/// HTTP route handlers
pub mod routes;

/// Cookie and CSRF primitives
pub mod security;

/// Router assembly and serving
pub mod server;

/// Domain services
pub mod services;

/// Unified error handling (re-exported from `socrai-core`)
pub use socrai_core::errors;

/// Domain models (re-exported from `socrai-core`)
pub use socrai_core::models;
