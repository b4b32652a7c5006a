//! Flattens `SiteContent` into the print-oriented view the resume renderer consumes.

use serde::Serialize;

use crate::content::SiteContent;
use crate::resume::html::escape_html;

/// Presentation-ready resume data. Owns all of its strings so it can be
/// handed to a renderer without touching the content model again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeTemplateData {
    pub name: String,
    pub title: String,
    /// Pre-built HTML fragments; already escaped.
    pub contact_lines: Vec<String>,
    pub summary: Vec<String>,
    pub experiences: Vec<ExperienceView>,
    pub education: Vec<EducationView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceView {
    pub title: String,
    pub company: String,
    pub location: String,
    pub period: String,
    pub bullets: Vec<String>,
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationView {
    pub credential: String,
    pub school: String,
    pub location: Option<String>,
    pub years: String,
}

fn date_range(start: &str, end: &str) -> String {
    format!("{start} – {end}")
}

/// Strips the scheme so links read naturally on paper.
fn display_href(href: &str) -> &str {
    ["https://", "http://", "mailto:"]
        .iter()
        .find_map(|prefix| href.strip_prefix(prefix))
        .unwrap_or(href)
}

fn link(label: &str, href: &str, display: &str) -> String {
    format!(
        "{}: <a href=\"{}\">{}</a>",
        escape_html(label),
        escape_html(href),
        escape_html(display)
    )
}

fn contact_lines(content: &SiteContent) -> Vec<String> {
    let contact = &content.contact;

    let mut direct = Vec::new();
    if let Some(phone) = contact.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        let dial: String = phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        direct.push(link("Phone", &format!("tel:{dial}"), phone));
    }
    direct.push(link(
        "Email",
        &format!("mailto:{}", contact.email),
        &contact.email,
    ));

    let mut online: Vec<String> = content
        .hero
        .social
        .iter()
        .filter(|social| !social.is_email())
        .map(|social| link(&social.platform, &social.href, display_href(&social.href)))
        .collect();
    if let Some(website) = contact.website.as_deref().filter(|w| !w.trim().is_empty()) {
        online.push(link("Website", website, display_href(website)));
    }

    [direct.join(" | "), online.join(" | ")]
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Builds the resume view model. Experience and education keep their
/// source order and count.
pub fn build_template_data(content: &SiteContent) -> ResumeTemplateData {
    let summary = content
        .about
        .resume_summary
        .clone()
        .unwrap_or_else(|| content.about.body.clone());

    let experiences = content
        .experience
        .iter()
        .map(|role| ExperienceView {
            title: role.title.clone(),
            company: role.company.clone(),
            location: role.location.clone(),
            period: date_range(&role.start_date, &role.end_date),
            bullets: role.description.clone(),
            badges: role.badges.clone(),
        })
        .collect();

    let education = content
        .education
        .iter()
        .map(|entry| EducationView {
            credential: entry.credential.clone(),
            school: entry.school.clone(),
            location: Some(entry.location.clone()).filter(|l| !l.trim().is_empty()),
            years: date_range(&entry.start_date, &entry.end_date),
        })
        .collect();

    ResumeTemplateData {
        name: content.hero.name.clone(),
        title: content.hero.title.clone(),
        contact_lines: contact_lines(content),
        summary,
        experiences,
        education,
    }
}
