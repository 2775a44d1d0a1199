use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use crate::{AppState, error::AppError, utils::secrets_match};

/// Gates operator endpoints behind `Authorization: Bearer <ADMIN_TOKEN>`.
/// With no token configured every request is refused.
pub async fn require_admin(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.admin_token.as_deref() else {
        tracing::warn!("Admin endpoint {} called but ADMIN_TOKEN is not set", request.uri().path());
        return Err(AppError::Unauthorized);
    };

    match bearer {
        Ok(TypedHeader(Authorization(token))) if secrets_match(token.token(), expected) => {
            Ok(next.run(request).await)
        }
        Ok(_) => Err(AppError::Unauthorized),
        Err(rejection) => {
            tracing::debug!("Rejected admin request: {}", rejection);
            Err(AppError::Unauthorized)
        }
    }
}
