use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::listings::now_utc;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest {
        message: &'static str,
        example: Option<Value>,
    },
    #[error("not found: {path}")]
    NotFound { path: String },
    #[error("too many requests")]
    TooManyRequests { retry_after: Duration },
    #[error("internal error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub timestamp: String,
}

impl AppError {
    pub fn bad_request(message: &'static str) -> Self {
        Self::BadRequest {
            message,
            example: None,
        }
    }

    pub fn bad_request_with_example(message: &'static str, example: Value) -> Self {
        Self::BadRequest {
            message,
            example: Some(example),
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut retry_after = None;
        let (status, error, example, path) = match self {
            Self::BadRequest { message, example } => {
                (StatusCode::BAD_REQUEST, message.to_string(), example, None)
            }
            Self::NotFound { path } => (
                StatusCode::NOT_FOUND,
                "Not found".to_string(),
                None,
                Some(path),
            ),
            Self::TooManyRequests { retry_after: wait } => {
                retry_after = Some(wait);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "Too many requests, please try again later.".to_string(),
                    None,
                    None,
                )
            }
            Self::Internal { message } => {
                tracing::error!(error = %message, "request failed with internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, message, None, None)
            }
        };

        let mut response = (
            status,
            Json(ErrorResponse {
                success: false,
                error,
                example,
                path,
                timestamp: now_utc(),
            }),
        )
            .into_response();

        if let Some(wait) = retry_after {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(wait.as_secs().max(1)),
            );
        }

        response
    }
}
