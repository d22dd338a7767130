// ABOUTME: Application constants for environment names, defaults and model tuning
// ABOUTME: Centralizes the fixed values shared by configuration, services and routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

/// Service identity
pub mod service_names {
    /// Service name reported by logs and `/health`
    pub const SOCRAI_SERVER: &str = "socrai-server";
    /// Label used when wrapping upstream model failures
    pub const LLM_SERVICE: &str = "OpenAI";
}

/// Environment variable names
pub mod env_config {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// HTTP bind address
    pub const HOST: &str = "HOST";
    /// SQLite connection URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// HS256 signing secret for session tokens
    pub const JWT_SECRET: &str = "JWT_SECRET";
    /// Session lifetime in hours
    pub const JWT_EXPIRY_HOURS: &str = "JWT_EXPIRY_HOURS";
    /// Comma separated allowed origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Upstream model API key
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// Upstream model base URL
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    /// Model identifier
    pub const LLM_MODEL: &str = "SOCRAI_LLM_MODEL";
    /// Upstream request timeout in seconds
    pub const LLM_TIMEOUT_SECS: &str = "SOCRAI_LLM_TIMEOUT_SECS";
    /// Number of most recent messages sent as history (`all` for unbounded)
    pub const HISTORY_WINDOW: &str = "SOCRAI_HISTORY_WINDOW";
    /// Whether cookies carry the `Secure` attribute
    pub const SECURE_COOKIES: &str = "SECURE_COOKIES";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}

/// Default configuration values
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8000;
    /// Default bind address
    pub const HOST: &str = "127.0.0.1";
    /// Default database location
    pub const DATABASE_URL: &str = "sqlite:./data/socrai.db";
    /// Default session lifetime
    pub const JWT_EXPIRY_HOURS: i64 = 24;
    /// Default upstream base URL
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
    /// Default model
    pub const LLM_MODEL: &str = "gpt-4o-mini";
    /// Default upstream timeout
    pub const LLM_TIMEOUT_SECS: u64 = 120;
    /// Default language for conversations and profiles
    pub const LANGUAGE: &str = "python";
}

/// Sampling parameters for model calls
pub mod llm_tuning {
    /// Temperature for conversation turns
    pub const CHAT_TEMPERATURE: f32 = 0.5;
    /// Output cap for conversation turns
    pub const CHAT_MAX_TOKENS: u32 = 2000;
    /// Temperature for code analysis
    pub const ANALYSIS_TEMPERATURE: f32 = 0.7;
    /// Output cap for code analysis
    pub const ANALYSIS_MAX_TOKENS: u32 = 2000;
}

/// Field length and request limits
pub mod limits {
    /// Maximum conversation title length
    pub const TITLE_MAX_CHARS: usize = 255;
    /// Maximum language name length
    pub const LANGUAGE_MAX_CHARS: usize = 50;
    /// Maximum username length
    pub const USERNAME_MAX_CHARS: usize = 150;
    /// Minimum password length
    pub const PASSWORD_MIN_CHARS: usize = 8;
    /// Maximum accepted request body
    pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;
}

/// Cookie names
pub mod cookies {
    /// HttpOnly session cookie
    pub const AUTH_TOKEN: &str = "auth_token";
    /// Script-readable CSRF cookie
    pub const CSRF_TOKEN: &str = "csrftoken";
}

/// Usernames that cannot be registered
pub const RESERVED_USERNAMES: &[&str] = &["admin", "accounts", "onlyauthor"];
