use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use validator::Validate;

use crate::{
    AppState,
    database::{ContactStats, NewContact},
    error::{AppError, FieldError},
    infrastructure::ContactNotice,
    routes::contact::model::{ContactAccepted, ContactForm, field_errors, is_spam},
    utils::{ClientIp, user_agent},
};

const ACCEPTED_MESSAGE: &str = "Thank you for your message. I will get back to you soon.";
const THROTTLED_MESSAGE: &str =
    "You cannot submit the form repeatedly. Please wait a while and try again.";
const SAVE_FAILED_MESSAGE: &str = "Failed to send your message. Please try again later.";

// 提交联系表单
pub async fn submit_contact(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<ContactAccepted>, AppError> {
    let Json(form) = payload.map_err(|rejection| {
        AppError::Validation(vec![FieldError {
            field: "body".into(),
            message: rejection.body_text(),
        }])
    })?;
    form.validate()
        .map_err(|errors| AppError::Validation(field_errors(&errors)))?;

    if state.engagement.has_recent_submission(&ip).await {
        return Err(AppError::TooManyRequests(THROTTLED_MESSAGE.into()));
    }

    if is_spam(&form.message) {
        // 对疑似垃圾信息同样返回成功
        tracing::warn!("Potential spam detected from {} <{}>", ip, form.email);
        return Ok(Json(ContactAccepted {
            success: true,
            message: ACCEPTED_MESSAGE,
            contact_id: None,
        }));
    }

    let contact = NewContact {
        name: form.name,
        email: form.email,
        message: form.message,
        ip_address: ip,
        user_agent: user_agent(&headers),
    };
    let id = state.counters.insert_contact(&contact).await.map_err(|e| {
        tracing::error!("Failed to save contact: {}", e);
        AppError::Internal(SAVE_FAILED_MESSAGE.into())
    })?;
    tracing::info!("Saved contact submission {}", id);

    if let Some(notifier) = &state.upstreams.notifier {
        let notice = ContactNotice {
            id,
            name: contact.name,
            email: contact.email,
            message: contact.message,
        };
        if let Err(e) = notifier.notify_contact(&notice).await {
            tracing::error!("Failed to send contact notification: {}", e);
        }
    }

    Ok(Json(ContactAccepted {
        success: true,
        message: ACCEPTED_MESSAGE,
        contact_id: state.config.environment.is_development().then_some(id),
    }))
}

pub async fn contact_status(State(state): State<AppState>) -> Result<Json<ContactStats>, AppError> {
    Ok(Json(state.counters.contact_stats().await?))
}
