// ABOUTME: Configuration module entry point
// ABOUTME: Re-exports the environment-driven server configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

/// Environment-based configuration
pub mod environment;

pub use environment::{Environment, HistoryWindow, LlmConfig, ServerConfig};
