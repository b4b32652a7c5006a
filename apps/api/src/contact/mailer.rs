//! Outbound email for the contact form.
//!
//! All provider traffic goes through `Mailer`; the production implementation
//! talks to the Resend HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::contact::validation::ContactSubmission;
use crate::resume::html::escape_html;

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("email provider API key is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// A rendered notification for the site owner.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactEmail {
    /// Doubles as the provider idempotency key so retries never send twice.
    pub id: Uuid,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl ContactEmail {
    pub fn from_submission(submission: &ContactSubmission) -> Self {
        let html = format!(
            "<h2>New Contact Form Submission</h2>\n\
             <p><strong>Name:</strong> {name}</p>\n\
             <p><strong>Email:</strong> {email}</p>\n\
             <p><strong>Message:</strong></p>\n\
             <p>{message}</p>\n\
             <hr>\n\
             <p><small>Sent from portfolio contact form</small></p>\n",
            name = escape_html(&submission.name),
            email = escape_html(&submission.email),
            message = escape_html(&submission.message).replace('\n', "<br>"),
        );
        let text = format!(
            "New Contact Form Submission\n\nName: {}\nEmail: {}\nMessage: {}\n",
            submission.name, submission.email, submission.message
        );

        Self {
            id: Uuid::new_v4(),
            reply_to: submission.email.clone(),
            subject: format!("Portfolio Contact: {}", submission.name),
            html,
            text,
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &ContactEmail) -> Result<(), MailError>;
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ResendErrorBody {
    message: String,
}

/// Resend client with retry on rate limiting and server errors.
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    api_key: Option<String>,
    from: String,
    to: String,
}

impl ResendMailer {
    pub fn new(api_key: Option<String>, from: String, to: String) -> Result<Self, MailError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()?,
            api_key,
            from,
            to,
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &ContactEmail) -> Result<(), MailError> {
        let api_key = self.api_key.as_deref().ok_or(MailError::NotConfigured)?;

        let request_body = ResendRequest {
            from: &self.from,
            to: [&self.to],
            reply_to: &email.reply_to,
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        let mut last_error: Option<MailError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Email send attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(RESEND_API_URL)
                .bearer_auth(api_key)
                .header("Idempotency-Key", email.id.to_string())
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(MailError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Email API returned {}: {}", status, body);
                last_error = Some(MailError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ResendErrorBody>(&body)
                    .map(|e| e.message)
                    .unwrap_or(body);
                return Err(MailError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let sent: ResendResponse = response.json().await?;
            debug!("Contact email accepted by provider: id={}", sent.id);
            return Ok(());
        }

        Err(last_error.unwrap_or(MailError::Api {
            status: 429,
            message: format!("gave up after {MAX_RETRIES} attempts"),
        }))
    }
}
