//! Error types for the donation API.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use donation_types::ValidationError;
use serde::de::DeserializeOwned;
use std::fmt;

/// Service error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error (startup, store key).
    Config(String),
    /// Store file read/write failure.
    Storage(String),
    /// Rejected input.
    Validation(String),
    NotFound(String),
    /// Uniqueness or reference conflict.
    Conflict(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Storage(msg) => write!(f, "storage error: {msg}"),
            Error::Validation(msg) => write!(f, "{msg}"),
            Error::NotFound(msg) => write!(f, "{msg}"),
            Error::Conflict(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Config(_) | Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
        };
        if let Error::Validation(_) = &self {
            crate::metrics::METRICS
                .validation_errors
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string()
        });
        (status, Json(body)).into_response()
    }
}

/// JSON body extractor whose rejections use the service's error shape.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(Error::Validation(rejection_message(rejection))),
        }
    }
}

fn rejection_message(rejection: JsonRejection) -> String {
    format!("Invalid JSON body: {}", rejection.body_text())
}

/// Query string extractor with the same error shape as [`Payload`].
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => Err(Error::Validation(format!(
                "Invalid query string: {}",
                rejection.body_text()
            ))),
        }
    }
}
