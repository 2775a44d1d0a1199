use async_trait::async_trait;
use serde_json::{Value, json};

use super::Notifier;
use crate::error::UpstreamError;

const SERVICE: &str = "slack";

/// What an operator needs to follow up on a contact submission.
#[derive(Debug, Clone)]
pub struct ContactNotice {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
}

pub struct SlackNotifier {
    http: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(http: reqwest::Client, webhook_url: String) -> Self {
        Self { http, webhook_url }
    }
}

fn slack_payload(notice: &ContactNotice) -> Value {
    json!({
        "text": "New contact form submission",
        "blocks": [
            {
                "type": "section",
                "text": { "type": "mrkdwn", "text": format!("*New contact #{}*", notice.id) }
            },
            {
                "type": "section",
                "fields": [
                    { "type": "mrkdwn", "text": format!("*Name:*\n{}", notice.name) },
                    { "type": "mrkdwn", "text": format!("*Email:*\n{}", notice.email) }
                ]
            },
            {
                "type": "section",
                "text": { "type": "mrkdwn", "text": format!("*Message:*\n{}", notice.message) }
            }
        ]
    })
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify_contact(&self, notice: &ContactNotice) -> Result<(), UpstreamError> {
        let response = self
            .http
            .post(&self.webhook_url)
            .json(&slack_payload(notice))
            .send()
            .await
            .map_err(UpstreamError::http(SERVICE))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
