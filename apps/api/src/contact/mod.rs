// Contact form: validation, honeypot, per-client rate limiting, email delivery.

pub mod handlers;
pub mod mailer;
pub mod rate_limit;
pub mod validation;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Body of every `/api/contact` response, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub message: String,
    pub errors: BTreeMap<String, String>,
}

impl ContactResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            message: message.to_string(),
            errors: BTreeMap::new(),
        }
    }
}
