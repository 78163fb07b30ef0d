//! Digest mail through the Mailtrap send API

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

const MAILTRAP_SEND_URL: &str = "https://send.api.mailtrap.io/api/send";

/// Environment variable holding the API token
pub const API_TOKEN_ENV: &str = "MAILTRAP_API_TOKEN";

/// Mail errors
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Missing mail setting: {0}")]
    MissingSetting(&'static str),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Mail API error {0}: {1}")]
    Api(u16, String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Address {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn named(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Base64 of the file body
    pub content: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub disposition: String,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, mime_type: &str, body: &[u8]) -> Self {
        Self {
            content: STANDARD.encode(body),
            filename: filename.into(),
            mime_type: mime_type.to_string(),
            disposition: "attachment".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mail {
    pub from: Address,
    pub to: Vec<Address>,
    pub subject: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

pub struct MailtrapClient {
    http_client: reqwest::Client,
    token: String,
    endpoint: String,
}

impl MailtrapClient {
    pub fn new(token: impl Into<String>) -> Result<Self, MailError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MailError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            token: token.into(),
            endpoint: MAILTRAP_SEND_URL.to_string(),
        })
    }

    /// Client using the token from `MAILTRAP_API_TOKEN`
    pub fn from_env() -> Result<Self, MailError> {
        let token = std::env::var(API_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or(MailError::MissingSetting(API_TOKEN_ENV))?;
        Self::new(token)
    }

    pub async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        tracing::debug!(
            to = mail.to.len(),
            attachments = mail.attachments.len(),
            subject = %mail.subject,
            "Sending mail"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(mail)
            .send()
            .await
            .map_err(|e| MailError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MailError::Api(status.as_u16(), error_text));
        }

        tracing::info!(subject = %mail.subject, "Mail sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_is_base64() {
        let attachment = Attachment::new("AMC Methuen.txt", "text/plain", b"Wonka");
        assert_eq!(attachment.content, "V29ua2E=");
        assert_eq!(STANDARD.decode(&attachment.content).unwrap(), b"Wonka");
    }

    #[test]
    fn test_mail_json_shape() {
        let mail = Mail {
            from: Address::named("digest@example.com", "Test Movie Sender"),
            to: vec![Address::new("me@example.com")],
            subject: "Movie Schedules 2024-01-05".to_string(),
            text: "Schedules attached".to_string(),
            attachments: vec![Attachment::new("a.ics", "text/calendar", b"x")],
        };

        let json = serde_json::to_value(&mail).unwrap();
        assert_eq!(json["from"]["name"], "Test Movie Sender");
        assert!(json["to"][0].get("name").is_none());
        assert_eq!(json["attachments"][0]["type"], "text/calendar");
        assert_eq!(json["attachments"][0]["disposition"], "attachment");
    }
}
