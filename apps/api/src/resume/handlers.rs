//! Axum route handlers for resume delivery.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Response},
};

use crate::errors::ResumeError;
use crate::state::AppState;

/// Builds an `attachment` disposition with a header-safe filename.
///
/// Characters outside printable ASCII, plus `"` and `\`, become `_`.
pub fn attachment_disposition(filename: &str) -> HeaderValue {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"resume.pdf\""))
}

/// GET /api/resume
///
/// Streams the resume PDF as a download.
pub async fn handle_download_resume(State(state): State<AppState>) -> Result<Response, ResumeError> {
    let artifact = state.resume.artifact().await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        attachment_disposition(state.resume.filename()),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(artifact.bytes.len()));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(artifact.cache_control),
    );
    if let Some(modified) = artifact.last_modified {
        let http_date = modified.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        if let Ok(value) = HeaderValue::from_str(&http_date) {
            headers.insert(header::LAST_MODIFIED, value);
        }
    }

    Ok((headers, artifact.bytes).into_response())
}

/// GET /api/resume/preview
///
/// The HTML the PDF is printed from; handy when tweaking the layout.
pub async fn handle_preview_resume(State(state): State<AppState>) -> Html<String> {
    Html(state.resume.preview_html())
}
