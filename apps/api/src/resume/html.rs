//! HTML rendering of the resume.
//!
//! The output is a single self-contained document with inline print CSS.
//! Rendering is a pure function of `ResumeTemplateData`: no clocks, no
//! randomness, so the generated PDF can be cached safely.

use std::fmt::Write;

use crate::resume::template::{EducationView, ExperienceView, ResumeTemplateData};

const RESUME_STYLES: &str = r#"
      :root {
        --sans: "Inter", "Helvetica", "Arial", sans-serif;
        --serif: "Source Serif 4", "Georgia", "Times New Roman", serif;
      }
      @page { size: A4; margin: 12mm; }
      * { box-sizing: border-box; }
      body {
        font-family: var(--sans);
        margin: 0;
        padding: 24px 48px 20px;
        color: #1b1d21;
        background: #fff;
        line-height: 1.45;
      }
      h1 { margin: 0; font-size: 29.5px; letter-spacing: 0.06em; font-family: var(--serif); font-weight: 600; }
      h2 { font-size: 13.5px; letter-spacing: 0.22em; margin: 20px 0 8px; font-family: var(--serif); font-weight: 600; }
      h3 { margin: 0; font-family: var(--serif); font-weight: 600; }
      section + section { margin-top: 12px; }
      .divider { height: 1px; background: #e7e9ef; margin: 6px 0 10px; }
      .title-line { margin: 4px 0 10px; font-weight: 500; font-size: 12.5px; color: #3a3f47; }
      .contact-line { margin: 1px 0; font-size: 11.5px; color: #4f5661; }
      .contact-line a { color: inherit; text-decoration: none; }
      .body-text { margin: 4px 0; font-size: 11.5px; }
      .experience-card {
        border-left: 2px solid #cfd4df;
        padding-left: 12px;
        margin-bottom: 18px;
        page-break-inside: avoid;
        break-inside: avoid;
      }
      .experience-card:last-of-type { margin-bottom: 6px; }
      .experience-header { display: flex; justify-content: space-between; gap: 12px; margin-bottom: 6px; }
      .position { font-size: 12.5px; font-weight: 600; margin: 0; }
      .company, .period { font-size: 11.5px; color: #61666f; margin: 0; }
      .bullet-list { margin: 0 0 6px; padding-left: 16px; font-size: 11.5px; color: #2c2f34; }
      .bullet-list li { margin-bottom: 2px; }
      .badge-list { display: flex; gap: 6px; flex-wrap: wrap; list-style: none; padding: 0; margin: 0; }
      .badge { font-size: 10px; border: 1px solid #d7dae4; border-radius: 999px; padding: 2px 8px; background: #f7f8fb; }
      .education-section { margin-top: 6px; }
      .education-item { margin-bottom: 2px; page-break-inside: avoid; break-inside: avoid; }
      .education-item + .education-item { margin-top: 6px; }
      .education-degree { margin: 0; font-weight: 600; font-size: 12.5px; }
      .education-school, .education-years { margin: 0; font-size: 11.5px; color: #61666f; }
"#;

/// Escapes text for safe interpolation into HTML element content or
/// double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// `write!` into a String cannot fail; the results below are discarded.

fn render_experience(out: &mut String, role: &ExperienceView) {
    let _ = write!(
        out,
        r#"
        <article class="experience-card">
          <header class="experience-header">
            <div>
              <h3 class="position">{title}</h3>
              <p class="company">{company} • {location}</p>
            </div>
            <p class="period">{period}</p>
          </header>
          <ul class="bullet-list">"#,
        title = escape_html(&role.title),
        company = escape_html(&role.company),
        location = escape_html(&role.location),
        period = escape_html(&role.period),
    );
    for bullet in &role.bullets {
        let _ = write!(out, "\n            <li>{}</li>", escape_html(bullet));
    }
    out.push_str("\n          </ul>");

    if !role.badges.is_empty() {
        out.push_str("\n          <ul class=\"badge-list\">");
        for badge in &role.badges {
            let _ = write!(out, "<li class=\"badge\">{}</li>", escape_html(badge));
        }
        out.push_str("</ul>");
    }
    out.push_str("\n        </article>");
}

fn render_education(out: &mut String, entry: &EducationView) {
    let location = entry
        .location
        .as_deref()
        .map(|l| format!(" • {}", escape_html(l)))
        .unwrap_or_default();
    let _ = write!(
        out,
        r#"
        <div class="education-item">
          <p class="education-degree">{credential}</p>
          <p class="education-school">{school}{location}</p>
          <p class="education-years">{years}</p>
        </div>"#,
        credential = escape_html(&entry.credential),
        school = escape_html(&entry.school),
        years = escape_html(&entry.years),
    );
}

/// Renders the complete resume document.
pub fn render_resume_html(data: &ResumeTemplateData) -> String {
    let mut out = String::with_capacity(8 * 1024);

    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <title>{name} – Resume</title>
    <style>{styles}</style>
  </head>
  <body>
    <header>
      <h1>{name}</h1>
      <p class="title-line">{title}</p>"#,
        name = escape_html(&data.name),
        title = escape_html(&data.title),
        styles = RESUME_STYLES,
    );
    // Contact lines carry their own (already escaped) markup.
    for line in &data.contact_lines {
        let _ = write!(out, "\n      <p class=\"contact-line\">{line}</p>");
    }
    out.push_str("\n    </header>\n    <div class=\"divider\"></div>");

    out.push_str("\n    <section>\n      <h2>PROFESSIONAL SUMMARY</h2>");
    for paragraph in &data.summary {
        let _ = write!(
            out,
            "\n      <p class=\"body-text\">{}</p>",
            escape_html(paragraph)
        );
    }
    out.push_str("\n    </section>\n    <div class=\"divider\"></div>");

    out.push_str("\n    <section>\n      <h2>PROFESSIONAL EXPERIENCE</h2>");
    for role in &data.experiences {
        render_experience(&mut out, role);
    }
    out.push_str("\n    </section>");

    if !data.education.is_empty() {
        out.push_str("\n    <div class=\"divider\"></div>");
        out.push_str("\n    <section class=\"education-section\">\n      <h2>EDUCATION</h2>");
        for entry in &data.education {
            render_education(&mut out, entry);
        }
        out.push_str("\n    </section>");
    }

    out.push_str("\n  </body>\n</html>\n");
    out
}
