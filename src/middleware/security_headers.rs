use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::config::Environment;

const PERMISSIONS_POLICY: &str = "camera=(), microphone=(), geolocation=(), accelerometer=(), \
     gyroscope=(), magnetometer=(), usb=(), payment=()";

const REPORT_TO: &str =
    r#"{"group":"csp-endpoint","max_age":10886400,"endpoints":[{"url":"/api/csp-report"}]}"#;

pub fn content_security_policy(environment: Environment, nonce: &str) -> String {
    let dev = environment.is_development();
    let nonce = format!("'nonce-{}'", nonce);

    let script_src = if dev {
        format!("script-src {} 'strict-dynamic' 'unsafe-inline'", nonce)
    } else {
        format!("script-src {} 'strict-dynamic'", nonce)
    };
    let mut connect_src = String::from(
        "connect-src 'self' https://api.github.com https://wakatime.com https://api.notion.com",
    );
    if dev {
        connect_src.push_str(" http://localhost:*");
    }

    let mut directives = vec![
        "default-src 'none'".to_string(),
        script_src,
        format!("style-src {} 'self' 'unsafe-inline'", nonce),
        "img-src 'self' data: https: blob:".to_string(),
        "font-src 'self' https: data:".to_string(),
        connect_src,
        "form-action 'self'".to_string(),
        "frame-ancestors 'none'".to_string(),
        "base-uri 'self'".to_string(),
        "object-src 'none'".to_string(),
    ];
    if !dev {
        directives.push("upgrade-insecure-requests".to_string());
        directives.push("report-to csp-endpoint".to_string());
    }
    directives.join("; ")
}

fn hsts(environment: Environment) -> &'static str {
    match environment {
        Environment::Development => "max-age=86400",
        Environment::Production => "max-age=63072000; includeSubDomains; preload",
    }
}

pub async fn security_headers(
    State(environment): State<Environment>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let nonce = Uuid::new_v4().simple().to_string();

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    let fixed: [(&str, &str); 11] = [
        ("strict-transport-security", hsts(environment)),
        ("x-frame-options", "DENY"),
        ("x-content-type-options", "nosniff"),
        ("referrer-policy", "strict-origin-when-cross-origin"),
        ("x-xss-protection", "1; mode=block"),
        ("permissions-policy", PERMISSIONS_POLICY),
        ("cross-origin-resource-policy", "same-origin"),
        ("cross-origin-opener-policy", "same-origin"),
        ("origin-agent-cluster", "?1"),
        ("x-dns-prefetch-control", "off"),
        ("x-permitted-cross-domain-policies", "none"),
    ];
    for (name, value) in fixed {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }

    match HeaderValue::from_str(&content_security_policy(environment, &nonce)) {
        Ok(csp) => {
            headers.insert("content-security-policy", csp);
        }
        Err(e) => tracing::error!("Invalid CSP header value: {}", e),
    }
    if !environment.is_development() {
        headers.insert("report-to", HeaderValue::from_static(REPORT_TO));
    }
    headers.remove("x-powered-by");

    response
}
