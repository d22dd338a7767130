// ABOUTME: Core types for the SocrAI Socratic coding mentor platform
// ABOUTME: Foundation crate with error handling, pill modes, and persisted record types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

#![deny(unsafe_code)]

//! # SocrAI Core
//!
//! Foundation crate providing shared types for the SocrAI mentor server.
//! This crate is designed to change infrequently, enabling incremental
//! compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and field-level validation detail
//! - **models**: The closed `PillMode` enum, message roles, and database record DTOs

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Core data models (pill modes, roles, conversation and profile records)
pub mod models;
