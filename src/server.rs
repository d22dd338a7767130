// ABOUTME: Shared server resources, router assembly and HTTP serving
// ABOUTME: Wires database, auth, CSRF and LLM services into one axum application
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! # Server
//!
//! [`ServerResources`] is created once at startup and shared with every
//! handler through axum state, so no handler constructs its own database
//! handle or model client.

use crate::auth::{generate_jwt_secret, AuthManager};
use crate::config::ServerConfig;
use crate::constants::limits;
use crate::database::Database;
use crate::llm::{LlmProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider};
use crate::middleware::cors::setup_cors;
use crate::routes::{
    AnalysisRoutes, AuthRoutes, ChatRoutes, CsrfRoutes, HealthRoutes, ProfileRoutes,
};
use crate::security::csrf::CsrfTokenManager;
use crate::services::{CodeAnalyzer, ResponseGenerator};
use anyhow::{Context, Result};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Centralized resource container shared by all handlers
#[derive(Clone)]
pub struct ServerResources {
    /// Persistent store
    pub database: Arc<Database>,
    /// Session tokens and password hashing
    pub auth_manager: Arc<AuthManager>,
    /// Issued CSRF tokens
    pub csrf_manager: Arc<CsrfTokenManager>,
    /// Upstream language model
    pub llm: Arc<dyn LlmProvider>,
    /// Conversation turn generator
    pub response_generator: Arc<ResponseGenerator>,
    /// One-shot code reviewer
    pub code_analyzer: Arc<CodeAnalyzer>,
    /// Effective configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create server resources around an opened database and a provider
    #[must_use]
    pub fn new(
        database: Database,
        auth_manager: AuthManager,
        llm: Arc<dyn LlmProvider>,
        config: Arc<ServerConfig>,
    ) -> Self {
        let database = Arc::new(database);
        let response_generator = Arc::new(ResponseGenerator::new(
            Arc::clone(&database),
            Arc::clone(&llm),
            config.history_window,
        ));
        let code_analyzer = Arc::new(CodeAnalyzer::new(Arc::clone(&llm)));

        Self {
            database,
            auth_manager: Arc::new(auth_manager),
            csrf_manager: Arc::new(CsrfTokenManager::new()),
            llm,
            response_generator,
            code_analyzer,
            config,
        }
    }

    /// Build every resource from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened, the signing secret
    /// cannot be generated, or the HTTP client cannot be built.
    pub async fn from_config(config: Arc<ServerConfig>) -> Result<Self> {
        ensure_database_dir(&config.database_url)?;
        let database = Database::new(&config.database_url).await?;

        let auth_manager = if let Some(secret) = config.jwt_secret.as_deref() {
            AuthManager::new(secret.as_bytes(), config.jwt_expiry_hours)
        } else {
            warn!("Using a per-process session secret; sessions end on restart");
            AuthManager::new(&generate_jwt_secret()?, config.jwt_expiry_hours)
        };

        let provider = OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::from(&config.llm))?;
        info!(
            provider = provider.name(),
            model = provider.default_model(),
            history_window = ?config.history_window,
            "Language model provider configured"
        );

        Ok(Self::new(database, auth_manager, Arc::new(provider), config))
    }
}

/// Create the parent directory of a file-backed `SQLite` URL
fn ensure_database_dir(database_url: &str) -> Result<()> {
    if database_url.contains(":memory:") {
        return Ok(());
    }
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
    }
    Ok(())
}

/// Assemble all routes with the shared middleware stack
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config.cors_allowed_origins);

    Router::new()
        .merge(HealthRoutes::routes())
        .merge(CsrfRoutes::routes(Arc::clone(&resources)))
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(ChatRoutes::routes(Arc::clone(&resources)))
        .merge(AnalysisRoutes::routes(Arc::clone(&resources)))
        .merge(ProfileRoutes::routes(resources))
        .layer(RequestBodyLimitLayer::new(limits::MAX_REQUEST_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Bind the configured address and serve until interrupted
///
/// # Errors
///
/// Returns an error if resources cannot be built or the listener fails.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.http_port);
    let resources = Arc::new(ServerResources::from_config(Arc::new(config)).await?);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP server listening on http://{addr}");

    axum::serve(listener, build_router(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}
