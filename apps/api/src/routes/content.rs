use axum::{extract::State, Json};

use crate::content::SiteContent;
use crate::state::AppState;

/// GET /api/content
/// The validated site content the pages are built from.
pub async fn handle_get_content(State(state): State<AppState>) -> Json<SiteContent> {
    Json(state.content.as_ref().clone())
}
