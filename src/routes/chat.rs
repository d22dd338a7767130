// ABOUTME: Conversation route handlers for the mentor chat
// ABOUTME: Owner-scoped conversation list/create/retrieve and the send-message turn
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! Conversation routes
//!
//! Every lookup is scoped to the authenticated owner, so a conversation of
//! another user answers with 404 exactly like a missing one.

use super::json::JsonBody;
use crate::constants::{defaults, limits};
use crate::middleware::AuthUser;
use crate::server::ServerResources;
use crate::services::chat_orchestration;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use socrai_core::errors::{AppError, FieldErrors};
use socrai_core::models::{ConversationRecord, ConversationSummary, MessageRecord, PillMode};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a conversation
#[derive(Debug, Default, Deserialize)]
pub struct CreateConversationRequest {
    /// Optional title
    pub title: Option<String>,
    /// Guidance tier, `green` when absent
    pub pill_mode: Option<String>,
    /// Target language, `python` when absent
    pub language: Option<String>,
}

/// Query parameters for listing conversations
#[derive(Debug, Default, Deserialize)]
pub struct ListConversationsQuery {
    /// Page size, unbounded when absent
    pub limit: Option<u32>,
    /// Rows to skip
    pub offset: Option<u32>,
}

/// Conversation list response
#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    /// Conversations, most recently updated first
    pub conversations: Vec<ConversationSummary>,
    /// Total conversations owned by the caller
    pub total: i64,
}

/// Conversation metadata
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    /// Conversation ID
    pub id: String,
    /// Title, empty when not given
    pub title: String,
    /// Guidance tier
    pub pill_mode: PillMode,
    /// Target language
    pub language: String,
    /// Creation timestamp
    pub created_at: String,
    /// Last message timestamp
    pub updated_at: String,
}

impl From<ConversationRecord> for ConversationResponse {
    fn from(conversation: ConversationRecord) -> Self {
        Self {
            id: conversation.id,
            title: conversation.title,
            pill_mode: conversation.pill_mode,
            language: conversation.language,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}

/// One message as exposed over HTTP
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Message ID
    pub id: String,
    /// Author role
    pub role: String,
    /// Text content
    pub content: String,
    /// Creation timestamp
    pub created_at: String,
}

impl From<MessageRecord> for MessageResponse {
    fn from(message: MessageRecord) -> Self {
        Self {
            id: message.id,
            role: message.role.as_str().to_owned(),
            content: message.content,
            created_at: message.created_at,
        }
    }
}

/// Conversation with its ordered messages
#[derive(Debug, Serialize)]
pub struct ConversationDetailResponse {
    /// Conversation metadata
    #[serde(flatten)]
    pub conversation: ConversationResponse,
    /// Messages in creation order
    pub messages: Vec<MessageResponse>,
}

/// Request to send a message
#[derive(Debug, Default, Deserialize)]
pub struct SendMessageRequest {
    /// Message text
    pub content: Option<String>,
}

/// Both messages of a completed turn
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    /// The learner's message
    pub user_message: MessageResponse,
    /// The mentor's reply
    pub ai_message: MessageResponse,
}

/// Validated conversation fields
#[derive(Debug)]
struct NewConversation {
    title: String,
    pill_mode: PillMode,
    language: String,
}

impl CreateConversationRequest {
    fn validate(&self) -> Result<NewConversation, AppError> {
        let mut errors = FieldErrors::new();

        let title = self.title.as_deref().unwrap_or_default().trim().to_owned();
        if title.chars().count() > limits::TITLE_MAX_CHARS {
            errors.add(
                "title",
                format!(
                    "Ensure this field has no more than {} characters.",
                    limits::TITLE_MAX_CHARS
                ),
            );
        }

        let pill_mode = match self.pill_mode.as_deref() {
            None => PillMode::default(),
            Some(value) => value.parse().unwrap_or_else(|_| {
                errors.add("pill_mode", format!("\"{value}\" is not a valid choice."));
                PillMode::default()
            }),
        };

        let language = self
            .language
            .as_deref()
            .unwrap_or(defaults::LANGUAGE)
            .trim()
            .to_owned();
        if language.is_empty() {
            errors.add("language", "This field may not be blank.");
        } else if language.chars().count() > limits::LANGUAGE_MAX_CHARS {
            errors.add(
                "language",
                format!(
                    "Ensure this field has no more than {} characters.",
                    limits::LANGUAGE_MAX_CHARS
                ),
            );
        }

        errors.into_result()?;
        Ok(NewConversation {
            title,
            pill_mode,
            language,
        })
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Conversation routes
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all conversation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/conversations",
                get(Self::handle_list_conversations).post(Self::handle_create_conversation),
            )
            .route("/api/conversations/:id", get(Self::handle_get_conversation))
            .route(
                "/api/conversations/:id/messages",
                get(Self::handle_get_messages),
            )
            .route(
                "/api/conversations/:id/send_message",
                post(Self::handle_send_message),
            )
            .with_state(resources)
    }

    async fn owned_conversation(
        resources: &ServerResources,
        conversation_id: &str,
        user_id: &str,
    ) -> Result<ConversationRecord, AppError> {
        resources
            .database
            .get_conversation(conversation_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Conversation"))
    }

    /// Handle GET /api/conversations
    async fn handle_list_conversations(
        State(resources): State<Arc<ServerResources>>,
        AuthUser(auth): AuthUser,
        Query(query): Query<ListConversationsQuery>,
    ) -> Result<Json<ConversationListResponse>, AppError> {
        let conversations = resources
            .database
            .list_conversations(
                &auth.user.id,
                query.limit.map(i64::from),
                i64::from(query.offset.unwrap_or(0)),
            )
            .await?;
        let total = resources.database.count_conversations(&auth.user.id).await?;

        Ok(Json(ConversationListResponse {
            conversations,
            total,
        }))
    }

    /// Handle POST /api/conversations
    async fn handle_create_conversation(
        State(resources): State<Arc<ServerResources>>,
        AuthUser(auth): AuthUser,
        JsonBody(request): JsonBody<CreateConversationRequest>,
    ) -> Result<Response, AppError> {
        let new = request.validate()?;
        let conversation = resources
            .database
            .create_conversation(&auth.user.id, &new.title, new.pill_mode, &new.language)
            .await?;

        info!(
            conversation_id = %conversation.id,
            user_id = %auth.user.id,
            pill_mode = %conversation.pill_mode,
            language = %conversation.language,
            "Conversation created"
        );

        Ok((
            StatusCode::CREATED,
            Json(ConversationResponse::from(conversation)),
        )
            .into_response())
    }

    /// Handle GET /api/conversations/:id
    async fn handle_get_conversation(
        State(resources): State<Arc<ServerResources>>,
        AuthUser(auth): AuthUser,
        Path(conversation_id): Path<String>,
    ) -> Result<Json<ConversationDetailResponse>, AppError> {
        let conversation =
            Self::owned_conversation(&resources, &conversation_id, &auth.user.id).await?;
        let messages = resources.database.get_messages(&conversation.id).await?;

        Ok(Json(ConversationDetailResponse {
            conversation: ConversationResponse::from(conversation),
            messages: messages.into_iter().map(MessageResponse::from).collect(),
        }))
    }

    /// Handle GET /api/conversations/:id/messages
    async fn handle_get_messages(
        State(resources): State<Arc<ServerResources>>,
        AuthUser(auth): AuthUser,
        Path(conversation_id): Path<String>,
    ) -> Result<Json<Vec<MessageResponse>>, AppError> {
        let conversation =
            Self::owned_conversation(&resources, &conversation_id, &auth.user.id).await?;
        let messages = resources.database.get_messages(&conversation.id).await?;

        Ok(Json(
            messages.into_iter().map(MessageResponse::from).collect(),
        ))
    }

    /// Handle POST /api/conversations/:id/send_message
    async fn handle_send_message(
        State(resources): State<Arc<ServerResources>>,
        AuthUser(auth): AuthUser,
        Path(conversation_id): Path<String>,
        JsonBody(request): JsonBody<SendMessageRequest>,
    ) -> Result<Response, AppError> {
        let content = match request.content.as_deref() {
            None => Err(AppError::invalid_field("content", "This field is required.")),
            Some(content) if content.trim().is_empty() => Err(AppError::invalid_field(
                "content",
                "This field may not be blank.",
            )),
            Some(content) => Ok(content),
        }?;

        let turn = chat_orchestration::send_message(
            &resources.database,
            &resources.response_generator,
            &conversation_id,
            &auth.user.id,
            content,
        )
        .await?;

        Ok((
            StatusCode::CREATED,
            Json(SendMessageResponse {
                user_message: MessageResponse::from(turn.user_message),
                ai_message: MessageResponse::from(turn.ai_message),
            }),
        )
            .into_response())
    }
}
