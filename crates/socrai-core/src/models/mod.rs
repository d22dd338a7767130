// ABOUTME: Core data models shared between persistence, services and routes
// ABOUTME: Pill modes, message roles, and database record DTOs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

mod conversation;
mod pill_mode;
mod user;

pub use conversation::{ConversationRecord, ConversationSummary, MessageRecord, MessageRole};
pub use pill_mode::PillMode;
pub use user::{ProfileRecord, UserRecord};
