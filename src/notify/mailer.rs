// src/notify/mailer.rs

use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

const BREVO_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("API error: {0}")]
    ApiError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Anything that can deliver an [`OutgoingEmail`].
pub trait MailTransport: Send + Sync {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError>;

    fn sender(&self) -> &str;
}

pub struct BrevoMailer {
    api_key: String,
    sender_email: String,
    sender_name: String,
    client: Client,
}

#[derive(Serialize)]
struct BrevoSender<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct BrevoRecipient<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoPayload<'a> {
    sender: BrevoSender<'a>,
    to: Vec<BrevoRecipient<'a>>,
    subject: &'a str,
    text_content: &'a str,
}

impl BrevoMailer {
    pub fn new(api_key: String, sender_email: String, sender_name: String) -> Result<Self, MailerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MailerError::RequestFailed(e.to_string()))?;

        Ok(Self {
            api_key,
            sender_email,
            sender_name,
            client,
        })
    }
}

impl MailTransport for BrevoMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError> {
        let payload = BrevoPayload {
            sender: BrevoSender {
                name: &self.sender_name,
                email: &self.sender_email,
            },
            to: vec![BrevoRecipient { email: &email.to }],
            subject: &email.subject,
            text_content: &email.text,
        };

        let resp = self
            .client
            .post(BREVO_ENDPOINT)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| MailerError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_body = resp.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MailerError::ApiError(format!("{status}: {error_body}")));
        }

        Ok(())
    }

    fn sender(&self) -> &str {
        &self.sender_email
    }
}
