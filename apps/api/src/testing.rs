//! In-memory stand-ins for the PDF engine and mailer, shared by unit and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::contact::mailer::{ContactEmail, MailError, Mailer};
use crate::contact::rate_limit::{InMemoryRateLimiter, RateLimitPolicy};
use crate::content::embedded_site_content;
use crate::resume::pdf::{PdfEngine, RenderError};
use crate::resume::{ResumeService, ResumeSettings, ResumeSource};
use crate::state::AppState;

/// Returns a fake PDF whose bytes depend only on the HTML.
#[derive(Default)]
pub struct FakeEngine {
    calls: AtomicUsize,
    last_html: Mutex<Option<String>>,
}

impl FakeEngine {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_html(&self) -> Option<String> {
        self.last_html.lock().unwrap().clone()
    }
}

#[async_trait]
impl PdfEngine for FakeEngine {
    async fn html_to_pdf(&self, html: &str) -> Result<Bytes, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_html.lock().unwrap() = Some(html.to_string());
        Ok(Bytes::from(format!("%PDF-1.4 fake {}", html.len())))
    }
}

#[derive(Default)]
pub struct FailingEngine {
    calls: AtomicUsize,
}

impl FailingEngine {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PdfEngine for FailingEngine {
    async fn html_to_pdf(&self, _html: &str) -> Result<Bytes, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RenderError::EmptyOutput)
    }
}

pub struct SlowEngine(pub Duration);

#[async_trait]
impl PdfEngine for SlowEngine {
    async fn html_to_pdf(&self, _html: &str) -> Result<Bytes, RenderError> {
        tokio::time::sleep(self.0).await;
        Ok(Bytes::from_static(b"%PDF-1.4 slow"))
    }
}

/// Records every email instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<ContactEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<ContactEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &ContactEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Fails every send with the configured error kind.
pub struct FailingMailer {
    pub not_configured: bool,
}

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &ContactEmail) -> Result<(), MailError> {
        if self.not_configured {
            Err(MailError::NotConfigured)
        } else {
            Err(MailError::Api {
                status: 422,
                message: "The from address is not verified".to_string(),
            })
        }
    }
}

/// State with default limits, the given engine and mailer.
pub fn test_state(engine: Arc<dyn PdfEngine>, mailer: Arc<dyn Mailer>) -> AppState {
    let content = Arc::new(embedded_site_content().unwrap());
    let resume = ResumeService::new(
        content.clone(),
        ResumeSource::Generated(engine),
        ResumeSettings {
            cache_ttl: Duration::from_secs(900),
            render_timeout: Duration::from_secs(20),
            filename: format!("{} Resume.pdf", content.hero.name),
        },
    );
    AppState {
        content,
        resume: Arc::new(resume),
        rate_limiter: Arc::new(InMemoryRateLimiter::new(RateLimitPolicy::default())),
        mailer,
    }
}
