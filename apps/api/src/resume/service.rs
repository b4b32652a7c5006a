use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::content::SiteContent;
use crate::errors::ResumeError;
use crate::resume::cache::ArtifactCache;
use crate::resume::html::render_resume_html;
use crate::resume::pdf::PdfEngine;
use crate::resume::template::build_template_data;

/// Cache policy for freshly generated PDFs.
pub const GENERATED_CACHE_CONTROL: &str = "public, max-age=3600";
/// Cache policy for a pre-built file that only changes on deploy.
pub const STATIC_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Where the resume bytes come from.
pub enum ResumeSource {
    /// Build + render + convert on demand, cached for the TTL.
    Generated(Arc<dyn PdfEngine>),
    /// Serve a pre-built file verbatim.
    Static(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ResumeSettings {
    pub cache_ttl: Duration,
    pub render_timeout: Duration,
    pub filename: String,
}

/// A resume ready to be written to the response.
#[derive(Debug, Clone)]
pub struct ResumeArtifact {
    pub bytes: Bytes,
    pub cache_control: &'static str,
    pub last_modified: Option<DateTime<Utc>>,
}

pub struct ResumeService {
    content: Arc<SiteContent>,
    source: ResumeSource,
    cache: ArtifactCache,
    render_timeout: Duration,
    filename: String,
}

impl ResumeService {
    pub fn new(content: Arc<SiteContent>, source: ResumeSource, settings: ResumeSettings) -> Self {
        Self {
            content,
            source,
            cache: ArtifactCache::new(settings.cache_ttl),
            render_timeout: settings.render_timeout,
            filename: settings.filename,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The HTML the PDF engine prints. Never cached.
    pub fn preview_html(&self) -> String {
        render_resume_html(&build_template_data(&self.content))
    }

    /// Returns the resume bytes for download.
    pub async fn artifact(&self) -> Result<ResumeArtifact, ResumeError> {
        match &self.source {
            ResumeSource::Generated(engine) => self.generated(engine.as_ref()).await,
            ResumeSource::Static(path) => read_static(path).await,
        }
    }

    async fn generated(&self, engine: &dyn PdfEngine) -> Result<ResumeArtifact, ResumeError> {
        if let Some(cached) = self.cache.fresh().await {
            debug!("Returning cached resume PDF ({} bytes)", cached.bytes.len());
            return Ok(ResumeArtifact {
                bytes: cached.bytes,
                cache_control: GENERATED_CACHE_CONTROL,
                last_modified: Some(cached.generated_at),
            });
        }

        info!("Generating new resume PDF");
        let started = tokio::time::Instant::now();
        let bytes = render_pdf(&self.content, engine, self.render_timeout).await?;

        let stored = self.cache.store(bytes).await;
        info!(
            "Resume PDF generated: {} bytes in {}ms",
            stored.bytes.len(),
            started.elapsed().as_millis()
        );

        Ok(ResumeArtifact {
            bytes: stored.bytes,
            cache_control: GENERATED_CACHE_CONTROL,
            last_modified: Some(stored.generated_at),
        })
    }
}

/// Builder, renderer and engine in one pass, bounded by `render_timeout`.
pub async fn render_pdf(
    content: &SiteContent,
    engine: &dyn PdfEngine,
    render_timeout: Duration,
) -> Result<Bytes, ResumeError> {
    let html = render_resume_html(&build_template_data(content));
    let bytes = tokio::time::timeout(render_timeout, engine.html_to_pdf(&html))
        .await
        .map_err(|_| ResumeError::Timeout(render_timeout))??;
    Ok(bytes)
}

async fn read_static(path: &Path) -> Result<ResumeArtifact, ResumeError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| match source.kind() {
        ErrorKind::NotFound => ResumeError::NotFound(path.to_path_buf()),
        _ => ResumeError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let last_modified = tokio::fs::metadata(path)
        .await
        .ok()
        .and_then(|meta| meta.modified().ok())
        .map(DateTime::<Utc>::from);

    Ok(ResumeArtifact {
        bytes: Bytes::from(bytes),
        cache_control: STATIC_CACHE_CONTROL,
        last_modified,
    })
}
