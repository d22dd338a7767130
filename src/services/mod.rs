// ABOUTME: Domain services sitting between HTTP routes and persistence/model calls
// ABOUTME: Response generation, code analysis, turn orchestration and profile views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

/// Multi-step send-message flow
pub mod chat_orchestration;
/// One-shot code review
pub mod code_analyzer;
/// Profile "me" view assembly
pub mod profile;
/// Mentor reply generation for a conversation turn
pub mod response_generator;

pub use code_analyzer::CodeAnalyzer;
pub use response_generator::ResponseGenerator;
