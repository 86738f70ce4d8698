//! Resume form → Markdown.
//!
//! Section order: contact header, Professional Summary, Skills, Work Experience,
//! Education, Projects. Empty sections are left out.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Experience,
    Education,
    Project,
}

impl EntryType {
    pub fn heading(&self) -> &'static str {
        match self {
            EntryType::Experience => "Work Experience",
            EntryType::Education => "Education",
            EntryType::Project => "Projects",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Experience => "experience",
            EntryType::Education => "education",
            EntryType::Project => "project",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
}

/// One experience / education / project entry. Dates are `YYYY-MM`.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub title: String,
    pub organization: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub description: String,
    #[serde(default)]
    pub current: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeForm {
    #[serde(default)]
    pub contact_info: ContactInfo,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub experience: Vec<Entry>,
    #[serde(default)]
    pub education: Vec<Entry>,
    #[serde(default)]
    pub projects: Vec<Entry>,
}

/// Checks required fields and date formats of an entry.
pub fn validate_entry(entry: &Entry) -> Result<(), AppError> {
    let required = [
        ("title", &entry.title),
        ("organization", &entry.organization),
        ("start_date", &entry.start_date),
        ("description", &entry.description),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }

    let start = parse_month(&entry.start_date)?;

    if entry.current {
        return Ok(());
    }

    let end_raw = entry
        .end_date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| {
            AppError::Validation("end_date is required unless this is your current position".to_string())
        })?;
    let end = parse_month(end_raw)?;
    if end < start {
        return Err(AppError::Validation(
            "end_date cannot be before start_date".to_string(),
        ));
    }
    Ok(())
}

fn parse_month(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("'{value}' is not a YYYY-MM date")))
}

/// `2023-04` → `Apr 2023`. Unparseable input is echoed unchanged.
fn display_month(value: &str) -> String {
    parse_month(value)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|_| value.trim().to_string())
}

pub fn entries_to_markdown(entries: &[Entry], entry_type: EntryType) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let body = entries
        .iter()
        .map(|entry| {
            let start = display_month(&entry.start_date);
            let end = if entry.current {
                "Present".to_string()
            } else {
                entry.end_date.as_deref().map(display_month).unwrap_or_default()
            };
            format!(
                "### {} @ {}\n{} - {}\n\n{}",
                entry.title.trim(),
                entry.organization.trim(),
                start,
                end,
                entry.description.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    Some(format!("## {}\n\n{}", entry_type.heading(), body))
}

fn contact_markdown(contact: &ContactInfo, full_name: &str) -> Option<String> {
    let present = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut parts = Vec::new();
    if let Some(email) = present(&contact.email) {
        parts.push(format!("📧 {email}"));
    }
    if let Some(mobile) = present(&contact.mobile) {
        parts.push(format!("📱 {mobile}"));
    }
    if let Some(linkedin) = present(&contact.linkedin) {
        parts.push(format!("💼 [LinkedIn]({linkedin})"));
    }
    if let Some(twitter) = present(&contact.twitter) {
        parts.push(format!("🐦 [Twitter]({twitter})"));
    }

    if parts.is_empty() {
        return None;
    }

    Some(format!(
        "## <div align=\"center\">{full_name}</div>\n\n<div align=\"center\">\n\n{}\n\n</div>",
        parts.join(" | ")
    ))
}

/// Assembles the full resume document.
pub fn render_resume(form: &ResumeForm, full_name: &str) -> String {
    let summary = form.summary.trim();
    let skills = form.skills.trim();

    [
        contact_markdown(&form.contact_info, full_name),
        (!summary.is_empty()).then(|| format!("## Professional Summary\n\n{summary}")),
        (!skills.is_empty()).then(|| format!("## Skills\n\n{skills}")),
        entries_to_markdown(&form.experience, EntryType::Experience),
        entries_to_markdown(&form.education, EntryType::Education),
        entries_to_markdown(&form.projects, EntryType::Project),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// Collapses every run of blank lines to a single blank line and trims the ends.
pub fn normalize_content(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut pending_blank = false;

    for line in content.split('\n') {
        if line.trim().is_empty() {
            pending_blank = true;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if pending_blank { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        pending_blank = false;
    }

    out.trim().to_string()
}
