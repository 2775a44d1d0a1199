use serde::{Deserialize, Serialize};

use crate::{
    config::PaginationConfig,
    error::{AppError, FieldError},
    models::{BlogPost, PostQuery, StatusFilter},
};

/// Raw `?page&limit&status&tag` query, validated by [`ListQuery::validate`].
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
    limit: Option<String>,
    status: Option<String>,
    tag: Option<String>,
}

fn parse_digits(field: &str, value: Option<&str>, default: u32) -> Result<u32, FieldError> {
    let Some(value) = value else {
        return Ok(default);
    };
    let invalid = || FieldError {
        field: field.to_string(),
        message: format!("{} must be a positive integer", field),
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid()),
    }
}

impl ListQuery {
    pub fn validate(self, pagination: &PaginationConfig) -> Result<PostQuery, AppError> {
        let mut errors = Vec::new();

        let page = parse_digits("page", self.page.as_deref(), 1).unwrap_or_else(|e| {
            errors.push(e);
            1
        });
        let limit = match parse_digits("limit", self.limit.as_deref(), pagination.default_page_size) {
            Ok(limit) if limit > pagination.max_page_size => {
                errors.push(FieldError {
                    field: "limit".into(),
                    message: format!("limit must not exceed {}", pagination.max_page_size),
                });
                pagination.default_page_size
            }
            Ok(limit) => limit,
            Err(e) => {
                errors.push(e);
                pagination.default_page_size
            }
        };
        let status = match self.status.as_deref() {
            None => StatusFilter::Published,
            Some(raw) => StatusFilter::parse(raw).unwrap_or_else(|| {
                errors.push(FieldError {
                    field: "status".into(),
                    message: "status must be one of all, published, draft".into(),
                });
                StatusFilter::Published
            }),
        };

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(PostQuery {
            page,
            limit,
            status,
            tag: self.tag.filter(|t| !t.is_empty()),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(u64::from(limit.max(1))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostList {
    pub posts: Vec<BlogPost>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCount {
    pub view_count: i64,
}

#[derive(Debug, Serialize)]
pub struct TagList {
    pub tags: Vec<String>,
}
