// ABOUTME: Database operations for mentor conversations and messages
// ABOUTME: Owner-scoped conversation CRUD with append-only, creation-ordered message history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

use super::{format_timestamp, now_timestamp, parse_timestamp, Database};
use anyhow::Result;
use chrono::{Duration, Utc};
use socrai_core::errors::{AppError, AppResult};
use socrai_core::models::{
    ConversationRecord, ConversationSummary, MessageRecord, MessageRole, PillMode,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_conversation(row: &SqliteRow) -> AppResult<ConversationRecord> {
    let pill_mode: String = row.get("pill_mode");
    Ok(ConversationRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        pill_mode: pill_mode
            .parse()
            .map_err(|_| AppError::database(format!("Unknown stored pill mode: {pill_mode}")))?,
        language: row.get("language"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn row_to_message(row: &SqliteRow) -> AppResult<MessageRecord> {
    let role: String = row.get("role");
    Ok(MessageRecord {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        role: role.parse()?,
        content: row.get("content"),
        created_at: row.get("created_at"),
    })
}

impl Database {
    /// Create conversation and message tables
    pub(super) async fn migrate_chat(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title TEXT NOT NULL DEFAULT '',
                pill_mode TEXT NOT NULL DEFAULT 'green' CHECK (pill_mode IN ('green', 'blue', 'red')),
                language TEXT NOT NULL DEFAULT 'python',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
                role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system')),
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_conversations_user_updated ON conversations(user_id, updated_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_conversation_created ON messages(conversation_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ========================================================================
    // Conversation Operations
    // ========================================================================

    /// Create a new conversation
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create_conversation(
        &self,
        user_id: &str,
        title: &str,
        pill_mode: PillMode,
        language: &str,
    ) -> AppResult<ConversationRecord> {
        let id = Uuid::new_v4().to_string();
        let now = now_timestamp();

        sqlx::query(
            r"
            INSERT INTO conversations (id, user_id, title, pill_mode, language, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ",
        )
        .bind(&id)
        .bind(user_id)
        .bind(title)
        .bind(pill_mode.as_str())
        .bind(language)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create conversation: {e}")))?;

        Ok(ConversationRecord {
            id,
            user_id: user_id.to_owned(),
            title: title.to_owned(),
            pill_mode,
            language: language.to_owned(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get a conversation owned by `user_id`
    ///
    /// Conversations of other users are indistinguishable from missing ones.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_conversation(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> AppResult<Option<ConversationRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, title, pill_mode, language, created_at, updated_at
            FROM conversations
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get conversation: {e}")))?;

        row.as_ref().map(row_to_conversation).transpose()
    }

    /// List a user's conversations, most recently updated first
    ///
    /// `limit` of `None` returns every conversation after `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_conversations(
        &self,
        user_id: &str,
        limit: Option<i64>,
        offset: i64,
    ) -> AppResult<Vec<ConversationSummary>> {
        let rows = sqlx::query(
            r"
            SELECT c.id, c.title, c.pill_mode, c.language, c.created_at, c.updated_at,
                   COUNT(m.id) as message_count
            FROM conversations c
            LEFT JOIN messages m ON m.conversation_id = c.id
            WHERE c.user_id = $1
            GROUP BY c.id
            ORDER BY c.updated_at DESC, c.rowid DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(limit.unwrap_or(-1))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list conversations: {e}")))?;

        rows.iter()
            .map(|r| {
                let pill_mode: String = r.get("pill_mode");
                Ok(ConversationSummary {
                    id: r.get("id"),
                    title: r.get("title"),
                    pill_mode: pill_mode.parse().map_err(|_| {
                        AppError::database(format!("Unknown stored pill mode: {pill_mode}"))
                    })?,
                    language: r.get("language"),
                    message_count: r.get("message_count"),
                    created_at: r.get("created_at"),
                    updated_at: r.get("updated_at"),
                })
            })
            .collect()
    }

    /// Count a user's conversations
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn count_conversations(&self, user_id: &str) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as total FROM conversations WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count conversations: {e}")))?;

        Ok(row.get("total"))
    }

    // ========================================================================
    // Message Operations
    // ========================================================================

    /// Append a message and advance the conversation's `updated_at`
    ///
    /// The new `updated_at` is strictly greater than the previous value even
    /// when the clock has not moved since the last write.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the conversation does not exist, or a
    /// database error if a statement fails.
    pub async fn add_message(
        &self,
        conversation_id: &str,
        role: MessageRole,
        content: &str,
    ) -> AppResult<MessageRecord> {
        let id = Uuid::new_v4().to_string();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        // Writing first takes the write lock up front, so concurrent senders
        // wait on the busy timeout instead of failing a lock upgrade.
        let previous: Option<String> = sqlx::query_scalar(
            "UPDATE conversations SET updated_at = updated_at WHERE id = $1 RETURNING updated_at",
        )
        .bind(conversation_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to lock conversation: {e}")))?;
        let previous = previous.ok_or_else(|| AppError::not_found("Conversation"))?;

        let now = Utc::now();
        let created_at = format_timestamp(now);
        let updated_at = match parse_timestamp(&previous) {
            Some(prev) if prev >= now => format_timestamp(prev + Duration::microseconds(1)),
            _ => created_at.clone(),
        };

        sqlx::query(
            r"
            INSERT INTO messages (id, conversation_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&id)
        .bind(conversation_id)
        .bind(role.as_str())
        .bind(content)
        .bind(&created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to add message: {e}")))?;

        sqlx::query("UPDATE conversations SET updated_at = $1 WHERE id = $2")
            .bind(&updated_at)
            .bind(conversation_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to update conversation timestamp: {e}"))
            })?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit message: {e}")))?;

        Ok(MessageRecord {
            id,
            conversation_id: conversation_id.to_owned(),
            role,
            content: content.to_owned(),
            created_at,
        })
    }

    /// Get all messages for a conversation in chronological order
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_messages(&self, conversation_id: &str) -> AppResult<Vec<MessageRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, conversation_id, role, content, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get messages: {e}")))?;

        rows.iter().map(row_to_message).collect()
    }

    /// Get the most recent `limit` messages, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_recent_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> AppResult<Vec<MessageRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, conversation_id, role, content, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, rowid DESC
            LIMIT $2
            ",
        )
        .bind(conversation_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recent messages: {e}")))?;

        let mut messages = rows
            .iter()
            .map(row_to_message)
            .collect::<AppResult<Vec<_>>>()?;
        messages.reverse();
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::NewUser;

    async fn setup() -> (Database, String) {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let user = db
            .create_user(&NewUser {
                username: "learner",
                email: "learner@example.com",
                first_name: "Lea",
                last_name: "Rner",
                password_hash: "hash",
            })
            .await
            .unwrap();
        (db, user.id)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_all_persist() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("chat.db").display());
        let db = Database::new(&url).await.unwrap();
        let owner = db
            .create_user(&NewUser {
                username: "racer",
                email: "racer@example.com",
                first_name: "Ra",
                last_name: "Cer",
                password_hash: "hash",
            })
            .await
            .unwrap()
            .id;
        let conv = db
            .create_conversation(&owner, "", PillMode::Green, "python")
            .await
            .unwrap();

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let db = db.clone();
                let conv_id = conv.id.clone();
                tokio::spawn(async move {
                    db.add_message(&conv_id, MessageRole::User, &format!("message {i}"))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let messages = db.get_messages(&conv.id).await.unwrap();
        assert_eq!(messages.len(), 40);
        let updated = db.get_conversation(&conv.id, &owner).await.unwrap().unwrap();
        assert!(messages.iter().all(|m| m.created_at <= updated.updated_at));
    }

    #[tokio::test]
    async fn test_conversation_is_owner_scoped() {
        let (db, owner) = setup().await;
        let conv = db
            .create_conversation(&owner, "Slices", PillMode::Blue, "go")
            .await
            .unwrap();

        let found = db.get_conversation(&conv.id, &owner).await.unwrap().unwrap();
        assert_eq!(found.pill_mode, PillMode::Blue);
        assert_eq!(found.language, "go");

        assert!(db
            .get_conversation(&conv.id, "someone-else")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_messages_keep_insertion_order_and_bump_updated_at() {
        let (db, owner) = setup().await;
        let conv = db
            .create_conversation(&owner, "", PillMode::Green, "python")
            .await
            .unwrap();

        let mut last_updated = conv.updated_at.clone();
        for (i, role) in [MessageRole::User, MessageRole::Assistant, MessageRole::User]
            .into_iter()
            .enumerate()
        {
            db.add_message(&conv.id, role, &format!("m{i}")).await.unwrap();
            let now = db.get_conversation(&conv.id, &owner).await.unwrap().unwrap();
            assert!(now.updated_at > last_updated);
            last_updated = now.updated_at;
        }

        let contents: Vec<String> = db
            .get_messages(&conv.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["m0", "m1", "m2"]);

        let recent = db.get_recent_messages(&conv.id, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "m1");
        assert_eq!(recent[1].content, "m2");
    }

    #[tokio::test]
    async fn test_list_orders_by_recent_activity() {
        let (db, owner) = setup().await;
        let first = db
            .create_conversation(&owner, "first", PillMode::Green, "python")
            .await
            .unwrap();
        let second = db
            .create_conversation(&owner, "second", PillMode::Red, "rust")
            .await
            .unwrap();
        db.add_message(&first.id, MessageRole::User, "hello")
            .await
            .unwrap();

        let listed = db.list_conversations(&owner, None, 0).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[0].message_count, 1);
        assert_eq!(listed[1].id, second.id);
        assert_eq!(listed[1].message_count, 0);

        let paged = db.list_conversations(&owner, Some(1), 1).await.unwrap();
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].id, second.id);
        assert_eq!(db.count_conversations(&owner).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_add_message_to_missing_conversation() {
        let (db, _) = setup().await;
        let err = db
            .add_message("missing", MessageRole::User, "hi")
            .await
            .unwrap_err();
        assert_eq!(err.code, socrai_core::errors::ErrorCode::ResourceNotFound);
    }
}
