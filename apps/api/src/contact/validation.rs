//! Field checks for contact form submissions.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::content::is_valid_email;

pub const NAME_MAX_CHARS: usize = 100;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 2000;
pub const COMPANY_MAX_CHARS: usize = 100;

/// Raw request body. Fields stay untyped here so missing or wrong-typed
/// values surface as field errors rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    /// Honeypot. Hidden in the form; people leave it empty.
    #[serde(default)]
    pub company: Option<Value>,
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    pub company: Option<String>,
}

impl ContactSubmission {
    /// True when the honeypot field was filled in.
    pub fn is_spam(&self) -> bool {
        self.company
            .as_deref()
            .is_some_and(|company| !company.trim().is_empty())
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

enum Field {
    Missing,
    Text(String),
    WrongType(&'static str),
}

/// `null` counts as missing.
fn read_field(value: Option<Value>) -> Field {
    match value {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::String(text)) => Field::Text(text),
        Some(Value::Bool(_)) => Field::WrongType("boolean"),
        Some(Value::Number(_)) => Field::WrongType("number"),
        Some(Value::Array(_)) => Field::WrongType("array"),
        Some(Value::Object(_)) => Field::WrongType("object"),
    }
}

fn reject<T>(errors: &mut BTreeMap<String, String>, field: &str, message: String) -> Option<T> {
    errors.insert(field.to_string(), message);
    None
}

fn type_error(kind: &str) -> String {
    format!("Expected string, received {kind}")
}

/// Validates every field and reports the first problem per field.
pub fn validate_contact(request: ContactRequest) -> Result<ContactSubmission, BTreeMap<String, String>> {
    let mut errors = BTreeMap::new();

    let name = match read_field(request.name) {
        Field::WrongType(kind) => reject(&mut errors, "name", type_error(kind)),
        Field::Text(name) if !name.trim().is_empty() => {
            if char_len(&name) > NAME_MAX_CHARS {
                reject(&mut errors, "name", "Name is too long".to_string())
            } else {
                Some(name.trim().to_string())
            }
        }
        _ => reject(&mut errors, "name", "Name is required".to_string()),
    };

    let email = match read_field(request.email) {
        Field::WrongType(kind) => reject(&mut errors, "email", type_error(kind)),
        Field::Text(email) if !email.is_empty() => {
            if is_valid_email(&email) {
                Some(email)
            } else {
                reject(&mut errors, "email", "Invalid email address".to_string())
            }
        }
        _ => reject(&mut errors, "email", "Email is required".to_string()),
    };

    let message = match read_field(request.message) {
        Field::WrongType(kind) => reject(&mut errors, "message", type_error(kind)),
        Field::Text(message) if !message.is_empty() => {
            let len = char_len(&message);
            if len < MESSAGE_MIN_CHARS {
                reject(
                    &mut errors,
                    "message",
                    format!("Message must be at least {MESSAGE_MIN_CHARS} characters"),
                )
            } else if len > MESSAGE_MAX_CHARS {
                reject(&mut errors, "message", "Message is too long".to_string())
            } else {
                Some(message)
            }
        }
        _ => reject(&mut errors, "message", "Message is required".to_string()),
    };

    let company = match read_field(request.company) {
        Field::Missing => Some(None),
        Field::WrongType(kind) => reject(&mut errors, "company", type_error(kind)),
        Field::Text(company) if char_len(&company) > COMPANY_MAX_CHARS => {
            reject(&mut errors, "company", "Company is too long".to_string())
        }
        Field::Text(company) => Some(Some(company)),
    };

    match (name, email, message, company) {
        (Some(name), Some(email), Some(message), Some(company)) => Ok(ContactSubmission {
            name,
            email,
            message,
            company,
        }),
        _ => Err(errors),
    }
}
