// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database, session, CORS and model settings from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! Environment-based configuration management for production deployment

use crate::constants::{defaults, env_config};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use tracing::{info, warn};

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// How much stored conversation history accompanies each model call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryWindow {
    /// Every stored message
    #[default]
    All,
    /// Only the most recent N messages, still oldest first
    Recent(usize),
}

impl HistoryWindow {
    /// Parse `all`, an empty string, or a positive integer
    ///
    /// # Errors
    ///
    /// Returns an error for zero or non-numeric values.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let count: usize = trimmed
            .parse()
            .with_context(|| format!("Invalid history window: {trimmed}"))?;
        if count == 0 {
            bail!("History window must be at least 1");
        }
        Ok(Self::Recent(count))
    }

    /// Upper bound on history entries, `None` when unbounded
    #[must_use]
    pub const fn limit(self) -> Option<usize> {
        match self {
            Self::All => None,
            Self::Recent(count) => Some(count),
        }
    }
}

/// Upstream language model settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key, absent for unauthenticated local endpoints
    pub api_key: Option<String>,
    /// Base URL of the chat completions API
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: defaults::OPENAI_BASE_URL.to_owned(),
            model: defaults::LLM_MODEL.to_owned(),
            timeout_secs: defaults::LLM_TIMEOUT_SECS,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP API port
    pub http_port: u16,
    /// SQLite connection URL
    pub database_url: String,
    /// Deployment environment
    pub environment: Environment,
    /// Session signing secret, generated per process when absent
    pub jwt_secret: Option<String>,
    /// Session lifetime in hours
    pub jwt_expiry_hours: i64,
    /// Allowed CORS origins, empty for same-origin only
    pub cors_allowed_origins: Vec<String>,
    /// Whether cookies carry the `Secure` attribute
    pub secure_cookies: bool,
    /// History sent with each conversation turn
    pub history_window: HistoryWindow,
    /// Upstream model settings
    pub llm: LlmConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_owned(),
            http_port: defaults::HTTP_PORT,
            database_url: defaults::DATABASE_URL.to_owned(),
            environment: Environment::Development,
            jwt_secret: None,
            jwt_expiry_hours: defaults::JWT_EXPIRY_HOURS,
            cors_allowed_origins: Vec::new(),
            secure_cookies: false,
            history_window: HistoryWindow::All,
            llm: LlmConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str_or_default(
            &env::var(env_config::ENVIRONMENT).unwrap_or_default(),
        );

        let http_port = match env::var(env_config::HTTP_PORT) {
            Ok(value) => value
                .parse()
                .with_context(|| format!("Invalid {}: {value}", env_config::HTTP_PORT))?,
            Err(_) => defaults::HTTP_PORT,
        };

        let jwt_expiry_hours = match env::var(env_config::JWT_EXPIRY_HOURS) {
            Ok(value) => value
                .parse()
                .with_context(|| format!("Invalid {}: {value}", env_config::JWT_EXPIRY_HOURS))?,
            Err(_) => defaults::JWT_EXPIRY_HOURS,
        };

        let jwt_secret = env::var(env_config::JWT_SECRET)
            .ok()
            .filter(|secret| !secret.is_empty());
        if jwt_secret.is_none() {
            warn!(
                "{} not set; sessions will not survive a restart",
                env_config::JWT_SECRET
            );
        }

        let secure_cookies = match env::var(env_config::SECURE_COOKIES) {
            Ok(value) => parse_bool(&value)
                .with_context(|| format!("Invalid {}: {value}", env_config::SECURE_COOKIES))?,
            Err(_) => environment.is_production(),
        };

        let history_window = match env::var(env_config::HISTORY_WINDOW) {
            Ok(value) => HistoryWindow::parse(&value)?,
            Err(_) => HistoryWindow::All,
        };

        let timeout_secs = match env::var(env_config::LLM_TIMEOUT_SECS) {
            Ok(value) => value
                .parse()
                .with_context(|| format!("Invalid {}: {value}", env_config::LLM_TIMEOUT_SECS))?,
            Err(_) => defaults::LLM_TIMEOUT_SECS,
        };

        let llm = LlmConfig {
            api_key: env::var(env_config::OPENAI_API_KEY)
                .ok()
                .filter(|key| !key.is_empty()),
            base_url: env::var(env_config::OPENAI_BASE_URL)
                .unwrap_or_else(|_| defaults::OPENAI_BASE_URL.to_owned()),
            model: env::var(env_config::LLM_MODEL)
                .unwrap_or_else(|_| defaults::LLM_MODEL.to_owned()),
            timeout_secs,
        };
        if llm.api_key.is_none() {
            warn!(
                "{} not set; mentor responses will carry the upstream error",
                env_config::OPENAI_API_KEY
            );
        }

        let config = Self {
            host: env::var(env_config::HOST).unwrap_or_else(|_| defaults::HOST.to_owned()),
            http_port,
            database_url: env::var(env_config::DATABASE_URL)
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_owned()),
            environment,
            jwt_secret,
            jwt_expiry_hours,
            cors_allowed_origins: parse_origins(
                &env::var(env_config::CORS_ALLOWED_ORIGINS).unwrap_or_default(),
            ),
            secure_cookies,
            history_window,
            llm,
        };

        info!(
            environment = %config.environment,
            http_port = config.http_port,
            model = %config.llm.model,
            history_window = ?config.history_window,
            "Configuration loaded"
        );

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got {other}"),
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_history_window_parse() {
        assert_eq!(HistoryWindow::parse("").unwrap(), HistoryWindow::All);
        assert_eq!(HistoryWindow::parse("ALL").unwrap(), HistoryWindow::All);
        assert_eq!(HistoryWindow::parse(" 10 ").unwrap(), HistoryWindow::Recent(10));
        assert!(HistoryWindow::parse("0").is_err());
        assert!(HistoryWindow::parse("ten").is_err());
        assert_eq!(HistoryWindow::Recent(3).limit(), Some(3));
        assert_eq!(HistoryWindow::All.limit(), None);
    }

    #[test]
    fn test_parse_origins_skips_blanks() {
        assert_eq!(
            parse_origins("https://a.example, ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        for key in [
            env_config::HTTP_PORT,
            env_config::DATABASE_URL,
            env_config::HISTORY_WINDOW,
            env_config::LLM_MODEL,
            env_config::SECURE_COOKIES,
            env_config::ENVIRONMENT,
        ] {
            env::remove_var(key);
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, defaults::HTTP_PORT);
        assert_eq!(config.database_url, defaults::DATABASE_URL);
        assert_eq!(config.history_window, HistoryWindow::All);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!(!config.secure_cookies);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        env::set_var(env_config::HTTP_PORT, "9100");
        env::set_var(env_config::HISTORY_WINDOW, "10");
        env::set_var(env_config::ENVIRONMENT, "production");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, 9100);
        assert_eq!(config.history_window, HistoryWindow::Recent(10));
        assert!(config.secure_cookies);

        env::set_var(env_config::HTTP_PORT, "not-a-port");
        assert!(ServerConfig::from_env().is_err());

        env::remove_var(env_config::HTTP_PORT);
        env::remove_var(env_config::HISTORY_WINDOW);
        env::remove_var(env_config::ENVIRONMENT);
    }
}
