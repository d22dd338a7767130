// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory resources, a scripted model provider and user helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `socrai_server`

use anyhow::Result;
use async_trait::async_trait;
use socrai_server::{
    auth::AuthManager,
    config::{HistoryWindow, ServerConfig},
    database::{Database, NewUser},
    errors::AppError,
    llm::{ChatRequest, ChatResponse, LlmProvider},
    models::UserRecord,
    server::{build_router, ServerResources},
};
use std::sync::{Arc, Mutex, Once};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Password used for every test account
pub const TEST_PASSWORD: &str = "mentor-passphrase-42";

/// Model fake that records requests and answers from a script
pub struct ScriptedProvider {
    outcome: Mutex<Result<String, String>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    /// Provider that always answers with `reply`
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(Ok(reply.to_owned())),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Provider whose every call fails with `message`
    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(Err(message.to_owned())),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Change the scripted reply for subsequent calls
    pub fn set_reply(&self, reply: &str) {
        *self.outcome.lock().unwrap() = Ok(reply.to_owned());
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        match &*self.outcome.lock().unwrap() {
            Ok(reply) => Ok(ChatResponse {
                content: reply.clone(),
                model: "scripted-model".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            }),
            Err(message) => Err(AppError::external_service("OpenAI", message.clone())),
        }
    }
}

/// In-memory resources around `provider` with the given history window
pub async fn create_test_resources_with_window(
    provider: Arc<ScriptedProvider>,
    history_window: HistoryWindow,
) -> Result<Arc<ServerResources>> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;
    let auth_manager = AuthManager::new(b"integration-test-secret", 24).with_bcrypt_cost(4);
    let config = Arc::new(ServerConfig {
        database_url: "sqlite::memory:".to_owned(),
        history_window,
        ..ServerConfig::default()
    });

    Ok(Arc::new(ServerResources::new(
        database,
        auth_manager,
        provider,
        config,
    )))
}

/// In-memory resources with unbounded history
pub async fn create_test_resources(
    provider: Arc<ScriptedProvider>,
) -> Result<Arc<ServerResources>> {
    create_test_resources_with_window(provider, HistoryWindow::All).await
}

/// Full application router over `resources`
pub fn test_app(resources: &Arc<ServerResources>) -> axum::Router {
    build_router(Arc::clone(resources))
}

/// Create an account directly in the database
pub async fn create_test_user(
    resources: &ServerResources,
    username: &str,
) -> Result<UserRecord> {
    let password_hash = resources.auth_manager.hash_password(TEST_PASSWORD).await?;
    let email = format!("{username}@example.com");
    let user = resources
        .database
        .create_user(&NewUser {
            username,
            email: &email,
            first_name: "Test",
            last_name: "Learner",
            password_hash: &password_hash,
        })
        .await?;
    Ok(user)
}

/// Create an account and return it with a session key
pub async fn create_authenticated_user(
    resources: &ServerResources,
    username: &str,
) -> Result<(UserRecord, String)> {
    let user = create_test_user(resources, username).await?;
    let session = resources.auth_manager.generate_token(&user)?;
    Ok((user, session.token))
}
