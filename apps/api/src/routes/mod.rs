pub mod content;
pub mod health;

use axum::{
    http::{header, HeaderName, HeaderValue},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer};

use crate::contact::handlers::handle_contact;
use crate::resume::handlers::{handle_download_resume, handle_preview_resume};
use crate::state::AppState;

/// Largest contact body the field limits allow, with every character
/// `\uXXXX\uXXXX`-escaped (12 bytes per char across name, message and
/// company), plus room for the email and JSON envelope.
const MAX_BODY_BYTES: usize = 32 * 1024;

fn security_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/content", get(content::handle_get_content))
        .route("/api/resume", get(handle_download_resume))
        .route("/api/resume/preview", get(handle_preview_resume))
        .route("/api/contact", post(handle_contact))
        .layer(
            ServiceBuilder::new()
                .layer(security_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                .layer(security_header(header::X_FRAME_OPTIONS, "DENY"))
                .layer(security_header(
                    header::REFERRER_POLICY,
                    "strict-origin-when-cross-origin",
                ))
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .with_state(state)
}
