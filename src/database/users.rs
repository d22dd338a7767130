// ABOUTME: User account database operations
// ABOUTME: Handles registration storage, lookup by id, email or username, and login bookkeeping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

use super::{map_write_error, now_timestamp, Database};
use anyhow::Result;
use socrai_core::errors::{AppError, AppResult};
use socrai_core::models::UserRecord;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Fields required to create an account
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    /// Login name
    pub username: &'a str,
    /// Email address
    pub email: &'a str,
    /// Given name
    pub first_name: &'a str,
    /// Family name
    pub last_name: &'a str,
    /// Pre-computed bcrypt hash
    pub password_hash: &'a str,
}

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, created_at, last_login";

fn row_to_user(row: &SqliteRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
        last_login: row.get("last_login"),
    }
}

impl Database {
    /// Create the users table
    pub(super) async fn migrate_users(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE COLLATE NOCASE,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_login TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the username or email is taken,
    /// or a database error if the insert fails.
    pub async fn create_user(&self, user: &NewUser<'_>) -> AppResult<UserRecord> {
        let id = Uuid::new_v4().to_string();
        let now = now_timestamp();

        sqlx::query(
            r"
            INSERT INTO users (id, username, email, first_name, last_name, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&id)
        .bind(user.username)
        .bind(user.email)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("User", &e))?;

        Ok(UserRecord {
            id,
            username: user.username.to_owned(),
            email: user.email.to_owned(),
            first_name: user.first_name.to_owned(),
            last_name: user.last_name.to_owned(),
            password_hash: user.password_hash.to_owned(),
            created_at: now,
            last_login: None,
        })
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user(&self, user_id: &str) -> AppResult<Option<UserRecord>> {
        self.fetch_user_where("id = $1", user_id).await
    }

    /// Get a user by email (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        self.fetch_user_where("email = $1", email).await
    }

    /// Get a user by username (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        self.fetch_user_where("username = $1", username).await
    }

    async fn fetch_user_where(&self, predicate: &str, value: &str) -> AppResult<Option<UserRecord>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        Ok(row.as_ref().map(row_to_user))
    }

    /// Record a successful login
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_last_login(&self, user_id: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
            .bind(now_timestamp())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update last login: {e}")))?;

        Ok(())
    }
}
