use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::USER_AGENT, request::Parts},
};
use sha2::{Digest, Sha256};

use crate::AppState;

pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolves the client address from the trusted proxy header, then the first
/// `X-Forwarded-For` hop, else `"unknown"`.
pub fn client_ip(headers: &HeaderMap, trusted_header: &str) -> String {
    headers
        .get(trusted_header)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').map(str::trim).find(|ip| !ip.is_empty()))
        })
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Compares two secrets by their SHA-256 digests so the comparison time does
/// not depend on the common prefix length.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Extractor for the client address used in dedupe and throttle keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(client_ip(
            &parts.headers,
            &state.config.rate_limit.client_ip_header,
        )))
    }
}
