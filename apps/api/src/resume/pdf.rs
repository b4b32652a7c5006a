//! PDF conversion backend for the resume.
//!
//! The service depends only on the `PdfEngine` trait; production wires the
//! headless Chromium engine below. Tests substitute an in-memory fake.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to prepare render workspace: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("renderer produced no PDF output")]
    EmptyOutput,
}

#[async_trait]
pub trait PdfEngine: Send + Sync {
    /// Converts a complete HTML document into PDF bytes.
    async fn html_to_pdf(&self, html: &str) -> Result<Bytes, RenderError>;
}

/// Prints HTML to PDF with a headless Chromium/Chrome binary.
///
/// The HTML is written to a private temp directory and loaded via `file://`.
/// The child is killed if the returned future is dropped, so an outer
/// timeout reclaims the process.
#[derive(Debug, Clone)]
pub struct ChromePdfEngine {
    program: PathBuf,
}

impl ChromePdfEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl PdfEngine for ChromePdfEngine {
    async fn html_to_pdf(&self, html: &str) -> Result<Bytes, RenderError> {
        let workspace = tempfile::Builder::new().prefix("resume-").tempdir()?;
        let input = workspace.path().join("resume.html");
        let output = workspace.path().join("resume.pdf");
        tokio::fs::write(&input, html).await?;

        let program = self.program.display().to_string();
        debug!("Printing resume with {program}");

        let result = Command::new(&self.program)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg("--run-all-compositor-stages-before-draw")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(format!("file://{}", input.display()))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| RenderError::Launch {
                program: program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(RenderError::Failed {
                program,
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let pdf = tokio::fs::read(&output).await?;
        if !pdf.starts_with(b"%PDF") {
            return Err(RenderError::EmptyOutput);
        }

        Ok(Bytes::from(pdf))
    }
}
