// ABOUTME: JSON body extractor that reports malformed payloads as INVALID_INPUT
// ABOUTME: Wraps axum's Json so rejections use the standard error envelope

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use socrai_core::errors::AppError;

/// `Json<T>` with rejections rendered as [`AppError`]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(map_rejection(&rejection)),
        }
    }
}

fn map_rejection(rejection: &JsonRejection) -> AppError {
    let reason = match rejection {
        JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
        JsonRejection::JsonSyntaxError(_) => "Malformed JSON",
        JsonRejection::JsonDataError(_) => "Invalid request body",
        _ => "Unreadable request body",
    };
    AppError::invalid_input(reason)
        .with_details(serde_json::json!({ "body": [rejection.body_text()] }))
}
