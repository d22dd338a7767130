// ABOUTME: Builds the model request for one conversation turn and calls the provider
// ABOUTME: Failures from the model call become an apology string instead of an error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! # Response Generator
//!
//! Request layout for a turn:
//!
//! 1. system prompt for the pill mode plus the language clause
//! 2. stored history, oldest first, limited by the configured window
//! 3. the new user message, unless history already ends with a user message
//! 4. a trailing system reminder about response style

use crate::config::HistoryWindow;
use crate::constants::llm_tuning;
use crate::database::Database;
use crate::llm::{prompts, ChatMessage, ChatRequest, LlmProvider};
use socrai_core::errors::{AppError, AppResult};
use socrai_core::models::{MessageRecord, MessageRole, PillMode};
use std::sync::Arc;
use tracing::{error, info};

/// Mentor system prompt for a mode and language
#[must_use]
pub fn system_prompt(pill_mode: PillMode, language: &str) -> String {
    let mut prompt = prompts::template(pill_mode).to_owned();
    prompt.push_str(&prompts::language_clause(language));
    prompt
}

/// Assemble the ordered message list for a turn
#[must_use]
pub fn build_turn_messages(
    pill_mode: PillMode,
    language: &str,
    history: &[MessageRecord],
    user_message: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 3);
    messages.push(ChatMessage::system(system_prompt(pill_mode, language)));
    messages.extend(
        history
            .iter()
            .map(|m| ChatMessage::new(m.role, m.content.clone())),
    );

    let ends_with_user = history.last().is_some_and(|m| m.role == MessageRole::User);
    if !ends_with_user {
        messages.push(ChatMessage::user(user_message));
    }

    messages.push(ChatMessage::system(prompts::TURN_REMINDER));
    messages
}

/// User-facing text substituted for a failed turn
#[must_use]
pub fn apology(error: &AppError) -> String {
    format!(
        "I apologize, but I'm having trouble generating a response right now. Please try again later. Error: {}",
        error.message
    )
}

/// Generates mentor replies for conversation turns
#[derive(Clone)]
pub struct ResponseGenerator {
    database: Arc<Database>,
    llm: Arc<dyn LlmProvider>,
    history_window: HistoryWindow,
}

impl ResponseGenerator {
    /// Create a generator over the shared database and provider
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        llm: Arc<dyn LlmProvider>,
        history_window: HistoryWindow,
    ) -> Self {
        Self {
            database,
            llm,
            history_window,
        }
    }

    async fn load_history(&self, conversation_id: &str) -> AppResult<Vec<MessageRecord>> {
        match self.history_window.limit() {
            None => self.database.get_messages(conversation_id).await,
            Some(limit) => {
                self.database
                    .get_recent_messages(conversation_id, limit)
                    .await
            }
        }
    }

    /// Produce the assistant reply for a turn
    ///
    /// Model failures are logged and returned as [`apology`] text; only
    /// history loading can fail.
    ///
    /// # Errors
    ///
    /// Returns a database error if the conversation history cannot be read.
    pub async fn generate(
        &self,
        conversation_id: &str,
        user_message: &str,
        pill_mode: PillMode,
        language: &str,
    ) -> AppResult<String> {
        let history = self.load_history(conversation_id).await?;
        let messages = build_turn_messages(pill_mode, language, &history, user_message);

        info!(
            conversation_id = %conversation_id,
            pill_mode = %pill_mode,
            language = %language,
            history_len = history.len(),
            message_count = messages.len(),
            "Generating mentor response"
        );

        let request = ChatRequest::new(messages)
            .with_temperature(llm_tuning::CHAT_TEMPERATURE)
            .with_max_tokens(llm_tuning::CHAT_MAX_TOKENS);

        match self.llm.complete(&request).await {
            Ok(response) => Ok(response.content),
            Err(e) => {
                error!(
                    conversation_id = %conversation_id,
                    provider = self.llm.name(),
                    error = %e,
                    "Error generating AI response"
                );
                Ok(apology(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(role: MessageRole, content: &str) -> MessageRecord {
        MessageRecord {
            id: content.to_owned(),
            conversation_id: "c".to_owned(),
            role,
            content: content.to_owned(),
            created_at: "2026-01-01T00:00:00.000000Z".to_owned(),
        }
    }

    #[test]
    fn test_empty_history_appends_new_message() {
        let messages = build_turn_messages(PillMode::Green, "python", &[], "hello");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[1], ChatMessage::user("hello"));
        assert_eq!(messages[2], ChatMessage::system(prompts::TURN_REMINDER));
    }

    #[test]
    fn test_history_ending_with_user_is_not_duplicated() {
        let history = vec![
            message(MessageRole::User, "a"),
            message(MessageRole::Assistant, "b"),
            message(MessageRole::User, "c"),
        ];
        let messages = build_turn_messages(PillMode::Blue, "go", &history, "c");
        // system + 3 history + reminder
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[3], ChatMessage::user("c"));
        assert_eq!(messages[4].role, MessageRole::System);
    }

    #[test]
    fn test_history_ending_with_assistant_gets_new_message() {
        let history = vec![
            message(MessageRole::User, "a"),
            message(MessageRole::Assistant, "b"),
        ];
        let messages = build_turn_messages(PillMode::Red, "rust", &history, "next");
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1], ChatMessage::user("a"));
        assert_eq!(messages[2], ChatMessage::assistant("b"));
        assert_eq!(messages[3], ChatMessage::user("next"));
    }

    #[test]
    fn test_system_prompt_carries_language_clause() {
        let prompt = system_prompt(PillMode::Blue, "go");
        assert!(prompt.starts_with(prompts::template(PillMode::Blue)));
        assert!(prompt.ends_with(
            "\n\nThe user is coding in go. Provide guidance specific to this language when appropriate."
        ));
    }

    #[test]
    fn test_apology_embeds_error_text() {
        let text = apology(&AppError::external_service("OpenAI", "quota exceeded"));
        assert!(text.starts_with("I apologize, but I'm having trouble generating a response"));
        assert!(text.ends_with("Error: OpenAI: quota exceeded"));
    }
}
