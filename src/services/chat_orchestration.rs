// ABOUTME: Chat orchestration domain service for the send-message turn
// ABOUTME: Verifies ownership, persists the user message, generates and persists the reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

use super::ResponseGenerator;
use crate::database::Database;
use socrai_core::errors::{AppError, AppResult};
use socrai_core::models::{ConversationRecord, MessageRecord, MessageRole};

/// Result of persisting a user message
pub struct UserMessageResult {
    /// The persisted user message
    pub message: MessageRecord,
    /// The conversation record (for pill mode and language)
    pub conversation: ConversationRecord,
}

/// Both messages produced by one conversation turn
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// The learner's message
    pub user_message: MessageRecord,
    /// The mentor's reply
    pub ai_message: MessageRecord,
}

/// Verify conversation ownership and persist user message.
///
/// Business rules:
/// - Conversation must exist and belong to the user
/// - Message is persisted before the model call
///
/// # Errors
///
/// Returns `ResourceNotFound` if the conversation does not exist or belongs to another user.
/// Returns database errors on message persistence failure.
pub async fn persist_user_message(
    database: &Database,
    conversation_id: &str,
    user_id: &str,
    content: &str,
) -> AppResult<UserMessageResult> {
    let conversation = database
        .get_conversation(conversation_id, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Conversation"))?;

    let message = database
        .add_message(conversation_id, MessageRole::User, content)
        .await?;

    Ok(UserMessageResult {
        message,
        conversation,
    })
}

/// Persist the mentor reply for a conversation.
///
/// # Errors
///
/// Returns database errors on message persistence failure.
pub async fn persist_assistant_response(
    database: &Database,
    conversation_id: &str,
    content: &str,
) -> AppResult<MessageRecord> {
    database
        .add_message(conversation_id, MessageRole::Assistant, content)
        .await
}

/// Run one full turn: user message in, mentor reply out, both persisted.
///
/// A failed model call still yields a persisted assistant message carrying
/// the apology text.
///
/// # Errors
///
/// Returns `ResourceNotFound` for conversations the user does not own, or
/// database errors from persistence.
pub async fn send_message(
    database: &Database,
    generator: &ResponseGenerator,
    conversation_id: &str,
    user_id: &str,
    content: &str,
) -> AppResult<TurnResult> {
    let UserMessageResult {
        message: user_message,
        conversation,
    } = persist_user_message(database, conversation_id, user_id, content).await?;

    let reply = generator
        .generate(
            &conversation.id,
            content,
            conversation.pill_mode,
            &conversation.language,
        )
        .await?;

    let ai_message = persist_assistant_response(database, &conversation.id, &reply).await?;

    Ok(TurnResult {
        user_message,
        ai_message,
    })
}
