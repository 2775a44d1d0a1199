use axum::{body::Bytes, extract::State, http::StatusCode};
use serde_json::Value;

use crate::AppState;

fn field<'a>(violation: &'a Value, name: &str) -> &'a str {
    violation.get(name).and_then(Value::as_str).unwrap_or("")
}

/// Browsers post `application/csp-report`, so the body is parsed by hand.
/// Always answers 204 so clients do not retry.
pub async fn csp_report(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let report: Value = match serde_json::from_slice(&body) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Failed to process CSP report: {}", e);
            return StatusCode::NO_CONTENT;
        }
    };

    if state.config.environment.is_development() {
        tracing::info!("CSP violation report: {}", report);
    } else {
        let violation = report.get("csp-report").unwrap_or(&report);
        let line_number = violation.get("line-number").and_then(Value::as_u64);
        tracing::warn!(
            document_uri = field(violation, "document-uri"),
            violated_directive = field(violation, "violated-directive"),
            blocked_uri = field(violation, "blocked-uri"),
            source_file = field(violation, "source-file"),
            line_number,
            "CSP violation"
        );
    }
    StatusCode::NO_CONTENT
}
