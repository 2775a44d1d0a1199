use axum::{
    body::{Body, to_bytes},
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::{error, warn};

use crate::config::Environment;

const MAX_ERROR_BODY: usize = 64 * 1024;
const GENERIC_INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// Logs every error response with method and path, stamps `path` into JSON
/// error bodies and hides 500 details outside development.
pub async fn log_errors(
    State(environment): State<Environment>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY).await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to read error response body: {}", e);
            parts.headers.remove(header::CONTENT_LENGTH);
            return Response::from_parts(parts, Body::empty());
        }
    };

    if status.is_server_error() {
        error!(
            "Server error occurred - {} {} - Status: {}, Body: {}",
            method,
            path,
            status,
            String::from_utf8_lossy(&bytes)
        );
    } else {
        warn!("{} {} - Status: {}", method, path, status);
    }

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut object)) if object.contains_key("error") => {
            object
                .entry("path")
                .or_insert_with(|| Value::String(path.clone()));
            if status == StatusCode::INTERNAL_SERVER_ERROR && !environment.is_development() {
                object.insert(
                    "message".into(),
                    Value::String(GENERIC_INTERNAL_MESSAGE.into()),
                );
            }
            match serde_json::to_vec(&object) {
                Ok(rewritten) => Body::from(rewritten),
                Err(_) => Body::from(bytes),
            }
        }
        _ => Body::from(bytes),
    };

    // 重置body以便重新构建响应
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, body)
}
