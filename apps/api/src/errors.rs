use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::contact::mailer::MailError;
use crate::contact::ContactResponse;
use crate::resume::pdf::RenderError;

/// Failures of the resume download path.
/// Rendered as short plain-text bodies; the cause is logged, never returned.
#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("resume file not found at {0}")]
    NotFound(PathBuf),

    #[error("resume file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("resume rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("resume rendering timed out after {0:?}")]
    Timeout(Duration),
}

impl IntoResponse for ResumeError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ResumeError::NotFound(path) => {
                tracing::warn!("Resume file missing: {}", path.display());
                (StatusCode::NOT_FOUND, "Resume not available.")
            }
            ResumeError::Io { .. } | ResumeError::Render(_) | ResumeError::Timeout(_) => {
                tracing::error!("Error generating resume PDF: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unable to generate the resume right now. Please try again later.",
                )
            }
        };

        (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )],
            message,
        )
            .into_response()
    }
}

/// Failures of the contact form endpoint.
/// Rendered as `{message, errors}` JSON to match the success shape.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("validation failed for {} field(s)", .0.len())]
    Validation(BTreeMap<String, String>),

    #[error("email delivery failed: {0}")]
    Mail(#[from] MailError),
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let mut retry_after = None;
        let (status, message, errors) = match self {
            ContactError::RateLimited { retry_after: wait } => {
                // Round up so clients never retry a moment too early.
                let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
                retry_after = Some(secs.max(1));
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "Too many requests. Please try again later.",
                    BTreeMap::new(),
                )
            }
            ContactError::MalformedBody(detail) => {
                tracing::debug!("Rejected contact body: {detail}");
                (
                    StatusCode::BAD_REQUEST,
                    "Invalid request body.",
                    BTreeMap::new(),
                )
            }
            ContactError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed. Please check your input.",
                errors,
            ),
            ContactError::Mail(MailError::NotConfigured) => {
                tracing::error!("RESEND_API_KEY is not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Email service is not configured. Please try again later.",
                    BTreeMap::new(),
                )
            }
            ContactError::Mail(e) => {
                tracing::error!("Email provider error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send message. Please try again later.",
                    BTreeMap::new(),
                )
            }
        };

        let body = Json(ContactResponse {
            message: message.to_string(),
            errors,
        });

        match retry_after {
            Some(secs) => (status, [(header::RETRY_AFTER, secs.to_string())], body).into_response(),
            None => (status, body).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_render_error_hides_details() {
        let response = ResumeError::Render(RenderError::EmptyOutput).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert!(!body.is_empty());
        assert!(!body.contains("no PDF output"));
    }

    #[tokio::test]
    async fn test_missing_static_file_is_404() {
        let response = ResumeError::NotFound(PathBuf::from("public/resume.pdf")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!body_string(response).await.contains("public/"));
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after_rounded_up() {
        let response = ContactError::RateLimited {
            retry_after: Duration::from_millis(61_200),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "62");
    }

    #[tokio::test]
    async fn test_retry_after_never_zero() {
        let response = ContactError::RateLimited {
            retry_after: Duration::ZERO,
        }
        .into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    }

    #[tokio::test]
    async fn test_validation_errors_serialized_per_field() {
        let mut errors = BTreeMap::new();
        errors.insert("email".to_string(), "Invalid email address".to_string());
        let response = ContactError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["errors"]["email"], "Invalid email address");
    }

    #[tokio::test]
    async fn test_provider_error_is_generic() {
        let response = ContactError::Mail(MailError::Api {
            status: 422,
            message: "domain not verified".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert!(body.contains("Failed to send message"));
        assert!(!body.contains("domain not verified"));
    }
}
