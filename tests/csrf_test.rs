// ABOUTME: Integration tests for CSRF protection of cookie-authenticated requests
// ABOUTME: Tests token issuance, header enforcement and user binding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{
    create_authenticated_user, create_test_resources, create_test_user, test_app,
    ScriptedProvider, TEST_PASSWORD,
};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};
use socrai_server::server::ServerResources;
use std::sync::Arc;

struct CookieSession {
    cookie: String,
    csrf_token: String,
}

async fn login(resources: &Arc<ServerResources>, username: &str) -> CookieSession {
    create_test_user(resources, username).await.unwrap();
    let response = AxumTestRequest::post("/api/auth/login")
        .json(&json!({ "username": username, "password": TEST_PASSWORD }))
        .send(test_app(resources))
        .await
        .assert_status(StatusCode::OK);
    let cookie = format!("auth_token={}", response.cookie("auth_token").unwrap());
    let body: Value = response.json();
    CookieSession {
        cookie,
        csrf_token: body["csrf_token"].as_str().unwrap().to_owned(),
    }
}

fn create_request(session: &CookieSession) -> AxumTestRequest {
    AxumTestRequest::post("/api/conversations")
        .header("cookie", &session.cookie)
        .json(&json!({ "title": "cookie session" }))
}

#[tokio::test]
async fn test_cookie_mutation_without_token_is_forbidden() {
    let resources = create_test_resources(ScriptedProvider::replying("unused"))
        .await
        .unwrap();
    let session = login(&resources, "cookie_user").await;

    let error: Value = create_request(&session)
        .send(test_app(&resources))
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .json();
    assert_eq!(error["error"]["code"], "CSRF_INVALID");

    create_request(&session)
        .header("x-csrftoken", "0000")
        .send(test_app(&resources))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cookie_mutation_with_token_succeeds() {
    let resources = create_test_resources(ScriptedProvider::replying("unused"))
        .await
        .unwrap();
    let session = login(&resources, "cookie_user").await;

    create_request(&session)
        .header("x-csrf-token", &session.csrf_token)
        .send(test_app(&resources))
        .await
        .assert_status(StatusCode::CREATED);

    AxumTestRequest::get("/api/conversations")
        .header("cookie", &session.cookie)
        .send(test_app(&resources))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_anonymous_token_from_endpoint() {
    let resources = create_test_resources(ScriptedProvider::replying("unused"))
        .await
        .unwrap();
    let session = login(&resources, "cookie_user").await;

    let response = AxumTestRequest::get("/csrf-token")
        .send(test_app(&resources))
        .await
        .assert_status(StatusCode::OK);
    let cookie_token = response.cookie("csrftoken").unwrap();
    let body: Value = response.json();
    let token = body["csrfToken"].as_str().unwrap();
    assert_eq!(token, cookie_token);

    create_request(&session)
        .header("x-csrftoken", token)
        .send(test_app(&resources))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_token_bound_to_other_user_is_rejected() {
    let resources = create_test_resources(ScriptedProvider::replying("unused"))
        .await
        .unwrap();
    let session = login(&resources, "victim").await;
    let (_other, other_key) = create_authenticated_user(&resources, "attacker")
        .await
        .unwrap();

    let body: Value = AxumTestRequest::get("/csrf-token")
        .bearer(&other_key)
        .send(test_app(&resources))
        .await
        .assert_status(StatusCode::OK)
        .json();
    let foreign_token = body["csrfToken"].as_str().unwrap();

    create_request(&session)
        .header("x-csrf-token", foreign_token)
        .send(test_app(&resources))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_header_sessions_are_exempt() {
    let resources = create_test_resources(ScriptedProvider::replying("unused"))
        .await
        .unwrap();
    let (_user, key) = create_authenticated_user(&resources, "api_client")
        .await
        .unwrap();

    AxumTestRequest::post("/api/conversations")
        .bearer(&key)
        .json(&json!({}))
        .send(test_app(&resources))
        .await
        .assert_status(StatusCode::CREATED);
}
