//! Offline rebuild of the pre-built resume served by the static strategy.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::content::SiteContent;
use crate::errors::ResumeError;
use crate::resume::pdf::PdfEngine;
use crate::resume::service::render_pdf;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ResumeError + '_ {
    move |source| ResumeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Sibling of `target` used while writing, so readers never see a partial file.
fn staging_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(target.file_name().unwrap_or_default());
    name.push(format!(".{}.tmp", Uuid::new_v4()));
    target.with_file_name(name)
}

/// Renders the resume and atomically replaces `target` with the PDF.
///
/// Creates missing parent directories. On failure the previous file, if any,
/// is left in place. Returns the number of bytes written.
pub async fn regenerate_static_resume(
    content: &SiteContent,
    engine: &dyn PdfEngine,
    render_timeout: Duration,
    target: &Path,
) -> Result<usize, ResumeError> {
    info!("Regenerating resume PDF at {}", target.display());
    let bytes = render_pdf(content, engine, render_timeout).await?;

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_error(parent))?;
    }

    let staging = staging_path(target);
    tokio::fs::write(&staging, &bytes)
        .await
        .map_err(io_error(&staging))?;
    if let Err(source) = tokio::fs::rename(&staging, target).await {
        if let Err(e) = tokio::fs::remove_file(&staging).await {
            warn!("Failed to remove {}: {e}", staging.display());
        }
        return Err(io_error(target)(source));
    }

    info!("Resume PDF written: {} bytes", bytes.len());
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::content::embedded_site_content;
    use crate::resume::service::STATIC_CACHE_CONTROL;
    use crate::resume::{ResumeService, ResumeSettings, ResumeSource};
    use crate::testing::{FailingEngine, FakeEngine, SlowEngine};

    const TIMEOUT: Duration = Duration::from_secs(20);

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_writes_rendered_pdf_and_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("public").join("resume.pdf");
        let content = embedded_site_content().unwrap();
        let engine = FakeEngine::default();

        let written = regenerate_static_resume(&content, &engine, TIMEOUT, &target)
            .await
            .unwrap();

        let on_disk = std::fs::read(&target).unwrap();
        assert_eq!(on_disk.len(), written);
        assert!(on_disk.starts_with(b"%PDF"));
        assert_eq!(engine.calls(), 1);
        assert!(engine.last_html().unwrap().contains("PROFESSIONAL SUMMARY"));
        assert_eq!(entries(&dir.path().join("public")), vec!["resume.pdf"]);
    }

    #[tokio::test]
    async fn test_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("resume.pdf");
        std::fs::write(&target, b"%PDF-1.4 stale").unwrap();
        let content = embedded_site_content().unwrap();

        regenerate_static_resume(&content, &FakeEngine::default(), TIMEOUT, &target)
            .await
            .unwrap();

        assert_ne!(std::fs::read(&target).unwrap(), b"%PDF-1.4 stale");
        assert_eq!(entries(dir.path()), vec!["resume.pdf"]);
    }

    #[tokio::test]
    async fn test_engine_failure_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("resume.pdf");
        std::fs::write(&target, b"%PDF-1.4 previous").unwrap();
        let content = embedded_site_content().unwrap();

        let err = regenerate_static_resume(&content, &FailingEngine::default(), TIMEOUT, &target)
            .await
            .unwrap_err();

        assert!(matches!(err, ResumeError::Render(_)));
        assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.4 previous");
        assert_eq!(entries(dir.path()), vec!["resume.pdf"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_timeout_applies() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("resume.pdf");
        let content = embedded_site_content().unwrap();
        let engine = SlowEngine(Duration::from_secs(60));

        let err = regenerate_static_resume(&content, &engine, TIMEOUT, &target)
            .await
            .unwrap_err();

        assert!(matches!(err, ResumeError::Timeout(d) if d == TIMEOUT));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_static_strategy_serves_regenerated_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("resume.pdf");
        let content = Arc::new(embedded_site_content().unwrap());

        regenerate_static_resume(&content, &FakeEngine::default(), TIMEOUT, &target)
            .await
            .unwrap();

        let service = ResumeService::new(
            content,
            ResumeSource::Static(target.clone()),
            ResumeSettings {
                cache_ttl: Duration::from_secs(900),
                render_timeout: TIMEOUT,
                filename: "Resume.pdf".to_string(),
            },
        );
        let artifact = service.artifact().await.unwrap();
        assert_eq!(artifact.bytes.as_ref(), std::fs::read(&target).unwrap().as_slice());
        assert_eq!(artifact.cache_control, STATIC_CACHE_CONTROL);
    }
}
