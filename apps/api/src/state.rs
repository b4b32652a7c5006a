use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, ResumeStrategy};
use crate::contact::mailer::{Mailer, ResendMailer};
use crate::contact::rate_limit::{
    spawn_sweeper, InMemoryRateLimiter, RateLimitPolicy, RateLimiter, RedisRateLimiter,
};
use crate::content::SiteContent;
use crate::resume::pdf::ChromePdfEngine;
use crate::resume::{ResumeService, ResumeSettings, ResumeSource};

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup; everything mutable lives behind its own lock.
#[derive(Clone)]
pub struct AppState {
    pub content: Arc<SiteContent>,
    pub resume: Arc<ResumeService>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Wires the production implementations selected by `config`.
    pub async fn from_config(config: &Config, content: SiteContent) -> Result<Self> {
        let content = Arc::new(content);

        let source = match config.resume_strategy {
            ResumeStrategy::Generate => {
                info!(
                    "Resume strategy: generate via {}",
                    config.chrome_path.display()
                );
                ResumeSource::Generated(Arc::new(ChromePdfEngine::new(&config.chrome_path)))
            }
            ResumeStrategy::Static => {
                info!(
                    "Resume strategy: static file {}",
                    config.resume_static_path.display()
                );
                ResumeSource::Static(config.resume_static_path.clone())
            }
        };
        let settings = ResumeSettings {
            cache_ttl: config.resume_cache_ttl,
            render_timeout: config.resume_render_timeout,
            filename: config
                .resume_filename
                .clone()
                .unwrap_or_else(|| format!("{} Resume.pdf", content.hero.name)),
        };
        let resume = Arc::new(ResumeService::new(content.clone(), source, settings));

        let policy = RateLimitPolicy {
            window: config.rate_limit_window,
            max_requests: config.rate_limit_max_requests,
        };
        let rate_limiter: Arc<dyn RateLimiter> = match &config.redis_url {
            Some(url) => {
                let client = redis::Client::open(url.as_str())?;
                let conn = client
                    .get_multiplexed_async_connection()
                    .await
                    .context("Failed to connect to Redis for rate limiting")?;
                info!("Rate limiting backed by Redis");
                Arc::new(RedisRateLimiter::new(conn, policy))
            }
            None => {
                let limiter: Arc<dyn RateLimiter> = Arc::new(InMemoryRateLimiter::new(policy));
                spawn_sweeper(limiter.clone(), config.rate_limit_sweep_interval);
                info!("Rate limiting in memory");
                limiter
            }
        };

        let recipient = config
            .contact_email
            .clone()
            .unwrap_or_else(|| content.contact.email.clone());
        if config.resend_api_key.is_none() {
            tracing::warn!("RESEND_API_KEY is not set; contact submissions will fail");
        }
        let mailer = Arc::new(ResendMailer::new(
            config.resend_api_key.clone(),
            config.resend_from_email.clone(),
            recipient,
        )?);

        Ok(Self {
            content,
            resume,
            rate_limiter,
            mailer,
        })
    }
}
