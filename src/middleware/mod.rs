mod auth;
mod error_handler;
mod rate_limit;
mod security_headers;

pub use auth::require_admin;
pub use error_handler::log_errors;
pub use rate_limit::{RateLimitDecision, RateLimiter, rate_limit};
pub use security_headers::{content_security_policy, security_headers};
