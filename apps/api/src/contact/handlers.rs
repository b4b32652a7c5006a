use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use tracing::info;

use crate::contact::mailer::ContactEmail;
use crate::contact::rate_limit::{client_key, RateLimitDecision};
use crate::contact::validation::{validate_contact, ContactRequest};
use crate::contact::ContactResponse;
use crate::errors::ContactError;
use crate::state::AppState;

/// POST /api/contact
///
/// Rate limit, validate, drop honeypot hits silently, then hand the message
/// to the mailer. Every request that reaches here counts toward the limit.
pub async fn handle_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>, ContactError> {
    let key = client_key(&headers);
    if let RateLimitDecision::Limited { retry_after } = state.rate_limiter.check(&key).await {
        info!("Rate limited contact submission from {key}");
        return Err(ContactError::RateLimited { retry_after });
    }

    let Json(request) = payload.map_err(|e| ContactError::MalformedBody(e.body_text()))?;
    let submission = validate_contact(request).map_err(ContactError::Validation)?;

    if submission.is_spam() {
        info!("Honeypot triggered for {key}; dropping submission");
        return Ok(Json(ContactResponse::ok("Thank you for your message.")));
    }

    let email = ContactEmail::from_submission(&submission);
    state.mailer.send(&email).await?;
    info!("Contact message {} delivered", email.id);

    Ok(Json(ContactResponse::ok(
        "Thank you for your message. I'll get back to you soon!",
    )))
}
