use serde::{Deserialize, Serialize};

/// Everything the portfolio site says about its owner.
///
/// Parsed once at startup, validated, then shared read-only behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    pub navigation: Vec<NavLink>,
    pub hero: HeroContent,
    pub about: AboutContent,
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    pub skills: Vec<SkillCategory>,
    #[serde(default)]
    pub projects: Vec<ProjectItem>,
    pub contact: ContactContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaVariant {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtaLink {
    pub label: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<CtaVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(default)]
    pub download: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub href: String,
}

impl SocialLink {
    pub fn is_email(&self) -> bool {
        self.platform.eq_ignore_ascii_case("email")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroContent {
    pub name: String,
    pub title: String,
    pub summary: String,
    pub typing_phrases: Vec<String>,
    pub cta: Vec<CtaLink>,
    pub social: Vec<SocialLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<HeroMetric>,
}

/// A headline number shown under the hero, e.g. "6+ years".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroMetric {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutContent {
    pub heading: String,
    pub body: Vec<String>,
    /// Paragraphs used on the printed resume instead of `body`, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_summary: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceItem {
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: Vec<String>,
    #[serde(default)]
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationItem {
    pub school: String,
    pub credential: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectLink {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectItem {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    #[serde(default)]
    pub links: Vec<ProjectLink>,
    pub year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactContent {
    pub headline: String,
    pub description: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}
