// ABOUTME: Mentoring profile database operations
// ABOUTME: Get-or-create and partial update of per-user pill mode and language preferences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

use super::{now_timestamp, Database};
use crate::constants::defaults;
use anyhow::Result;
use socrai_core::errors::{AppError, AppResult};
use socrai_core::models::{PillMode, ProfileRecord};
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the profiles table
    pub(super) async fn migrate_profiles(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_profiles (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
                preferred_pill_mode TEXT NOT NULL DEFAULT 'green' CHECK (preferred_pill_mode IN ('green', 'blue', 'red')),
                preferred_language TEXT NOT NULL DEFAULT 'python',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch the user's profile, creating it with defaults when absent
    ///
    /// Concurrent first access resolves to a single row.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_or_create_profile(&self, user_id: &str) -> AppResult<ProfileRecord> {
        let now = now_timestamp();

        sqlx::query(
            r"
            INSERT INTO user_profiles (id, user_id, preferred_pill_mode, preferred_language, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT(user_id) DO NOTHING
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(PillMode::default().as_str())
        .bind(defaults::LANGUAGE)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create profile: {e}")))?;

        self.fetch_profile(user_id).await
    }

    /// Apply a partial preference update, creating the profile first if needed
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn update_profile(
        &self,
        user_id: &str,
        pill_mode: Option<PillMode>,
        language: Option<&str>,
    ) -> AppResult<ProfileRecord> {
        let current = self.get_or_create_profile(user_id).await?;
        if pill_mode.is_none() && language.is_none() {
            return Ok(current);
        }

        let pill_mode = pill_mode.unwrap_or(current.preferred_pill_mode);
        let language = language.unwrap_or(&current.preferred_language);

        sqlx::query(
            r"
            UPDATE user_profiles
            SET preferred_pill_mode = $1, preferred_language = $2, updated_at = $3
            WHERE user_id = $4
            ",
        )
        .bind(pill_mode.as_str())
        .bind(language)
        .bind(now_timestamp())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update profile: {e}")))?;

        self.fetch_profile(user_id).await
    }

    async fn fetch_profile(&self, user_id: &str) -> AppResult<ProfileRecord> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, preferred_pill_mode, preferred_language, created_at, updated_at
            FROM user_profiles
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get profile: {e}")))?;

        let pill_mode: String = row.get("preferred_pill_mode");
        Ok(ProfileRecord {
            id: row.get("id"),
            user_id: row.get("user_id"),
            preferred_pill_mode: PillMode::from_str_or_default(&pill_mode),
            preferred_language: row.get("preferred_language"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}
