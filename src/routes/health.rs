// ABOUTME: Health check route handler for service monitoring
// ABOUTME: Reports service identity and build version for load balancers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

use crate::constants::service_names;
use axum::{routing::get, Json, Router};

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    pub fn routes() -> Router {
        async fn health_handler() -> Json<serde_json::Value> {
            Json(serde_json::json!({
                "status": "ok",
                "service": service_names::SOCRAI_SERVER,
                "version": env!("CARGO_PKG_VERSION"),
            }))
        }

        Router::new().route("/health", get(health_handler))
    }
}
