// Site content: the static profile data every other module reads from.
// Loaded once at startup and never mutated afterwards.

pub mod models;
pub mod validate;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info};

pub use models::SiteContent;
pub use validate::{is_valid_email, validate_site_content, ContentIssue};

const EMBEDDED_CONTENT: &str = include_str!("site.json");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("content is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("site content validation failed with {} issue(s)", .0.len())]
    Invalid(Vec<ContentIssue>),
}

/// Parses the content compiled into the binary. Does not validate.
pub fn embedded_site_content() -> Result<SiteContent, ContentError> {
    Ok(serde_json::from_str(EMBEDDED_CONTENT)?)
}

/// Loads content from `path` (or the embedded copy) and validates it.
///
/// Each issue is logged before the error is returned so a failed startup
/// shows exactly which fields are broken.
pub async fn load_site_content(path: Option<&Path>) -> Result<SiteContent, ContentError> {
    let content = match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ContentError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            info!("Loading site content from {}", path.display());
            serde_json::from_str(&raw)?
        }
        None => embedded_site_content()?,
    };

    let issues = validate_site_content(&content);
    if !issues.is_empty() {
        error!("Site content validation failed:");
        for issue in &issues {
            error!("  - {issue}");
        }
        return Err(ContentError::Invalid(issues));
    }

    Ok(content)
}
