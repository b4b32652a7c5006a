use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// How `/api/resume` obtains its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeStrategy {
    Generate,
    Static,
}

impl FromStr for ResumeStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generate" => Ok(ResumeStrategy::Generate),
            "static" => Ok(ResumeStrategy::Static),
            other => bail!("unknown resume strategy '{other}' (expected 'generate' or 'static')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Everything has a default except the optional integrations.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub site_content_path: Option<PathBuf>,

    pub resend_api_key: Option<String>,
    pub resend_from_email: String,
    /// Falls back to the contact email in the site content.
    pub contact_email: Option<String>,

    pub rate_limit_window: Duration,
    pub rate_limit_max_requests: u32,
    pub rate_limit_sweep_interval: Duration,
    pub redis_url: Option<String>,

    pub resume_strategy: ResumeStrategy,
    pub resume_static_path: PathBuf,
    /// Falls back to "<hero name> Resume.pdf".
    pub resume_filename: Option<String>,
    pub resume_cache_ttl: Duration,
    pub resume_render_timeout: Duration,
    pub chrome_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            site_content_path: optional_env("SITE_CONTENT_PATH").map(PathBuf::from),

            resend_api_key: optional_env("RESEND_API_KEY"),
            resend_from_email: optional_env("RESEND_FROM_EMAIL")
                .unwrap_or_else(|| "onboarding@resend.dev".to_string()),
            contact_email: optional_env("CONTACT_EMAIL"),

            rate_limit_window: Duration::from_secs(parse_env("RATE_LIMIT_WINDOW_SECS", 900)?),
            rate_limit_max_requests: parse_env("RATE_LIMIT_MAX_REQUESTS", 3)?,
            rate_limit_sweep_interval: Duration::from_secs(parse_env("RATE_LIMIT_SWEEP_SECS", 3600)?),
            redis_url: optional_env("REDIS_URL"),

            resume_strategy: parse_env("RESUME_STRATEGY", ResumeStrategy::Generate)?,
            resume_static_path: optional_env("RESUME_STATIC_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public/resume.pdf")),
            resume_filename: optional_env("RESUME_FILENAME"),
            resume_cache_ttl: Duration::from_secs(parse_env("RESUME_CACHE_TTL_SECS", 900)?),
            resume_render_timeout: Duration::from_secs(parse_env("RESUME_RENDER_TIMEOUT_SECS", 20)?),
            chrome_path: optional_env("CHROME_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("chromium")),
        })
    }
}

/// Reads a variable, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => parse_value(key, &raw),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("generate".parse::<ResumeStrategy>().unwrap(), ResumeStrategy::Generate);
        assert_eq!(" Static ".parse::<ResumeStrategy>().unwrap(), ResumeStrategy::Static);
        assert!("puppeteer".parse::<ResumeStrategy>().is_err());
    }

    #[test]
    fn test_parse_value_names_variable_on_error() {
        let err = parse_value::<u16>("PORT", "eighty").unwrap_err();
        assert!(format!("{err:#}").contains("PORT"));
    }

    #[test]
    fn test_parse_value_accepts_numbers() {
        assert_eq!(parse_value::<u32>("RATE_LIMIT_MAX_REQUESTS", "5").unwrap(), 5);
    }
}
