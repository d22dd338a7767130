// ABOUTME: User account and mentoring profile records
// ABOUTME: Profile holds the preferred pill mode and language, one per user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

use super::PillMode;
use serde::{Deserialize, Serialize};

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique user ID
    pub id: String,
    /// Unique login name
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// bcrypt hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Registration time (RFC 3339)
    pub created_at: String,
    /// Last successful login (RFC 3339)
    pub last_login: Option<String>,
}

/// Per-user mentoring preferences, created lazily on first access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Unique profile ID
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Preferred guidance tier
    pub preferred_pill_mode: PillMode,
    /// Preferred programming language
    pub preferred_language: String,
    /// Creation time (RFC 3339)
    pub created_at: String,
    /// Last modification time (RFC 3339)
    pub updated_at: String,
}
