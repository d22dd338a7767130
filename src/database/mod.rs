// ABOUTME: SQLite database handle, connection setup and schema migrations
// ABOUTME: Owns the pool shared by user, conversation and profile queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! # Database Management
//!
//! Persistence for users, conversations, messages and mentoring profiles.
//! The schema is created idempotently when the handle is opened.
//!
//! Timestamps are RFC 3339 UTC strings with microsecond precision, so
//! comparing them as text matches chronological order.

mod chat;
mod profiles;
mod users;

pub use users::NewUser;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use socrai_core::errors::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

/// How long a writer waits for another connection's write lock
const BUSY_TIMEOUT_SECS: u64 = 5;

/// Database manager for users, conversations and profiles
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (creating if missing) the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, or a
    /// migration statement fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {database_url}"))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

        // Each in-memory connection is its own database.
        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            5
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to {database_url}"))?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_users().await?;
        self.migrate_chat().await?;
        self.migrate_profiles().await?;
        Ok(())
    }
}

/// Current time in the stored timestamp format
pub(crate) fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub(crate) fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|time| time.with_timezone(&Utc))
}

/// Map a query failure, turning unique constraint violations into conflicts
fn map_write_error(context: &str, error: &sqlx::Error) -> AppError {
    if let Some(db_error) = error.as_database_error() {
        if db_error.is_unique_violation() {
            return AppError::already_exists(format!("{context}: already exists"));
        }
    }
    AppError::database(format!("{context}: {error}"))
}
