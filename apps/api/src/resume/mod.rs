// Resume delivery: content -> template data -> HTML -> PDF, behind a TTL cache.
// Only one PDF engine is wired per process (see `pdf`).

pub mod cache;
pub mod handlers;
pub mod html;
pub mod pdf;
pub mod regenerate;
pub mod service;
pub mod template;

pub use service::{ResumeService, ResumeSettings, ResumeSource};
