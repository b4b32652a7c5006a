//! Structural checks for `SiteContent`.
//!
//! Every rule is evaluated so a broken content file reports all of its
//! problems at once. Paths are dotted, with list indices inline
//! (`experience.1.company`).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::content::models::SiteContent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentIssue {
    pub path: String,
    pub message: &'static str,
}

impl fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Address syntax shared by content validation and the contact form.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[derive(Default)]
struct Checker {
    issues: Vec<ContentIssue>,
}

impl Checker {
    fn push(&mut self, path: String, message: &'static str) {
        self.issues.push(ContentIssue { path, message });
    }

    fn text(&mut self, path: String, value: &str, message: &'static str) {
        if value.trim().is_empty() {
            self.push(path, message);
        }
    }

    fn at_least_one<T>(&mut self, path: &str, items: &[T], message: &'static str) {
        if items.is_empty() {
            self.push(path.to_string(), message);
        }
    }

    fn each_text(&mut self, path: &str, items: &[String], message: &'static str) {
        for (i, item) in items.iter().enumerate() {
            self.text(format!("{path}.{i}"), item, message);
        }
    }
}

/// Collects every invariant violation in `content`. Empty means valid.
pub fn validate_site_content(content: &SiteContent) -> Vec<ContentIssue> {
    let mut c = Checker::default();

    c.at_least_one(
        "navigation",
        &content.navigation,
        "At least one navigation link is required",
    );
    for (i, link) in content.navigation.iter().enumerate() {
        c.text(format!("navigation.{i}.label"), &link.label, "Label is required");
        c.text(format!("navigation.{i}.href"), &link.href, "Href is required");
    }

    let hero = &content.hero;
    c.text("hero.name".into(), &hero.name, "Name is required");
    c.text("hero.title".into(), &hero.title, "Title is required");
    c.text("hero.summary".into(), &hero.summary, "Summary is required");
    c.at_least_one(
        "hero.typingPhrases",
        &hero.typing_phrases,
        "At least one typing phrase is required",
    );
    c.each_text("hero.typingPhrases", &hero.typing_phrases, "Phrase is required");
    c.at_least_one("hero.cta", &hero.cta, "At least one CTA is required");
    for (i, cta) in hero.cta.iter().enumerate() {
        c.text(format!("hero.cta.{i}.label"), &cta.label, "Label is required");
        c.text(format!("hero.cta.{i}.href"), &cta.href, "Href is required");
    }
    c.at_least_one(
        "hero.social",
        &hero.social,
        "At least one social link is required",
    );
    for (i, social) in hero.social.iter().enumerate() {
        c.text(
            format!("hero.social.{i}.platform"),
            &social.platform,
            "Platform is required",
        );
        c.text(format!("hero.social.{i}.href"), &social.href, "Href is required");
    }
    for (i, metric) in hero.metrics.iter().enumerate() {
        c.text(
            format!("hero.metrics.{i}.label"),
            &metric.label,
            "Metric label is required",
        );
        c.text(
            format!("hero.metrics.{i}.value"),
            &metric.value,
            "Metric value is required",
        );
    }

    let about = &content.about;
    c.text("about.heading".into(), &about.heading, "Heading is required");
    c.at_least_one(
        "about.body",
        &about.body,
        "At least one body paragraph is required",
    );
    c.each_text("about.body", &about.body, "Paragraph is required");
    if let Some(summary) = &about.resume_summary {
        c.at_least_one(
            "about.resumeSummary",
            summary,
            "Resume summary must not be empty when present",
        );
        c.each_text("about.resumeSummary", summary, "Paragraph is required");
    }

    c.at_least_one(
        "experience",
        &content.experience,
        "At least one experience item is required",
    );
    for (i, role) in content.experience.iter().enumerate() {
        let p = format!("experience.{i}");
        c.text(format!("{p}.title"), &role.title, "Title is required");
        c.text(format!("{p}.company"), &role.company, "Company is required");
        c.text(format!("{p}.location"), &role.location, "Location is required");
        c.text(format!("{p}.startDate"), &role.start_date, "Start date is required");
        c.text(format!("{p}.endDate"), &role.end_date, "End date is required");
        c.at_least_one(
            &format!("{p}.description"),
            &role.description,
            "At least one description is required",
        );
        c.each_text(
            &format!("{p}.description"),
            &role.description,
            "Description is required",
        );
    }

    for (i, entry) in content.education.iter().enumerate() {
        let p = format!("education.{i}");
        c.text(format!("{p}.school"), &entry.school, "School is required");
        c.text(format!("{p}.credential"), &entry.credential, "Credential is required");
        c.text(format!("{p}.location"), &entry.location, "Location is required");
        c.text(format!("{p}.startDate"), &entry.start_date, "Start date is required");
        c.text(format!("{p}.endDate"), &entry.end_date, "End date is required");
    }

    c.at_least_one(
        "skills",
        &content.skills,
        "At least one skill category is required",
    );
    for (i, category) in content.skills.iter().enumerate() {
        let p = format!("skills.{i}");
        c.text(format!("{p}.name"), &category.name, "Category name is required");
        c.at_least_one(
            &format!("{p}.items"),
            &category.items,
            "At least one skill item is required",
        );
        c.each_text(&format!("{p}.items"), &category.items, "Skill is required");
    }

    for (i, project) in content.projects.iter().enumerate() {
        let p = format!("projects.{i}");
        c.text(format!("{p}.name"), &project.name, "Project name is required");
        c.text(
            format!("{p}.description"),
            &project.description,
            "Description is required",
        );
        c.at_least_one(
            &format!("{p}.technologies"),
            &project.technologies,
            "At least one technology is required",
        );
        c.each_text(
            &format!("{p}.technologies"),
            &project.technologies,
            "Technology is required",
        );
        for (j, link) in project.links.iter().enumerate() {
            c.text(format!("{p}.links.{j}.label"), &link.label, "Label is required");
            c.text(format!("{p}.links.{j}.href"), &link.href, "Href is required");
        }
        c.text(format!("{p}.year"), &project.year, "Year is required");
    }

    let contact = &content.contact;
    c.text("contact.headline".into(), &contact.headline, "Headline is required");
    c.text(
        "contact.description".into(),
        &contact.description,
        "Description is required",
    );
    if !is_valid_email(&contact.email) {
        c.push("contact.email".into(), "Invalid email address");
    }

    c.issues
}
