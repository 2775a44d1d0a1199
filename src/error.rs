use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failure of the key-value or relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failure talking to Notion, GitHub, WakaTime or the notification webhook.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to {service} failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} responded with status {status}")]
    Status { service: &'static str, status: u16 },
    #[error("unexpected {service} payload: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },
}

impl UpstreamError {
    pub fn http(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| UpstreamError::Http { service, source }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub enum AppError {
    Validation(Vec<FieldError>),
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    /// No route matched the request.
    RouteNotFound,
    TooManyRequests(String),
    /// Upstream content source failed; carries the service display name.
    Upstream(&'static str),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldError>>,
    timestamp: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, message, details) = match self {
            AppError::Validation(details) => (
                "Validation Error".to_string(),
                "The request data is invalid".to_string(),
                Some(details),
            ),
            AppError::BadRequest(msg) | AppError::NotFound(msg) => (msg.clone(), msg, None),
            AppError::Unauthorized => ("Unauthorized".into(), "Unauthorized".into(), None),
            AppError::RouteNotFound => (
                "Not Found".into(),
                "The requested resource was not found".into(),
                None,
            ),
            AppError::TooManyRequests(msg) => ("Too Many Requests".into(), msg, None),
            AppError::Upstream(service) => (
                "External API Error".into(),
                format!("Failed to fetch data from {}", service),
                None,
            ),
            AppError::Internal(msg) => ("Internal Server Error".into(), msg, None),
        };

        let body = Json(ErrorResponse {
            error,
            message,
            details,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });

        (status, body).into_response()
    }
}
