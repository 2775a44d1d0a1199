use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::FieldError;

const SPAM_KEYWORDS: &[&str] = &[
    "viagra",
    "casino",
    "lottery",
    "prize",
    "winner",
    "click here",
    "buy now",
    "limited time",
    "100% free",
    "act now",
    "call now",
    "order now",
];

const MAX_LINKS: usize = 3;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    #[validate(custom(function = "validate_email_details", message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 10, max = 1000, message = "Message must be between 10 and 1000 characters"))]
    pub message: String,
}

/// Length limits on both halves of the address and no characters that could
/// break out of an HTML or header context.
pub fn validate_email_details(email: &str) -> Result<(), ValidationError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::new("email_format"));
    };
    if domain.contains('@') || local.len() > 64 || domain.len() > 253 {
        return Err(ValidationError::new("email_length"));
    }
    const DANGEROUS: &[char] = &['<', '>', '"', '\'', '&', '\n', '\r', '\t'];
    if email.contains(DANGEROUS) {
        return Err(ValidationError::new("email_characters"));
    }
    Ok(())
}

/// Flattens validator output into the `details` list of a 400 response,
/// ordered by field name.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// Too many links, a known spam phrase or shouting.
pub fn is_spam(message: &str) -> bool {
    let lower = message.to_lowercase();
    let links = lower.matches("http://").count() + lower.matches("https://").count();
    if links > MAX_LINKS {
        return true;
    }
    if SPAM_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }

    let length = message.chars().count();
    let upper = message.chars().filter(|c| c.is_ascii_uppercase()).count();
    length > 20 && upper as f64 / length as f64 > 0.5
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactAccepted {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<i64>,
}
