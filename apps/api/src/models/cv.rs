use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The normalized CV snapshot handed over by the browser form at export time.
///
/// Field names follow the form's camelCase JSON. Layout only ever borrows this value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentModel {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(rename = "linkedIn", skip_serializing_if = "Option::is_none")]
    pub linked_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(default = "new_entry_id")]
    pub id: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field: String,
    /// Year-month, e.g. `2019-09`.
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(default = "new_entry_id")]
    pub id: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub start_date: String,
    /// Ignored when `current` is set.
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub current: bool,
    /// Free text; embedded newlines are hard line breaks.
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGroup {
    #[serde(default = "new_entry_id")]
    pub id: String,
    #[serde(default)]
    pub category: String,
    /// Insertion order is display order.
    #[serde(default)]
    pub items: Vec<String>,
}

/// Client-generated ids are optional on the wire; they never reach the rendered page.
fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns the trimmed value when it has visible content.
pub fn present(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl PersonalInfo {
    /// Contact fields in display order, blanks dropped.
    pub fn contact_fields(&self) -> Vec<&str> {
        [
            Some(self.email.as_str()),
            Some(self.phone.as_str()),
            Some(self.location.as_str()),
            self.linked_in.as_deref(),
            self.portfolio.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter_map(present)
        .collect()
    }
}

impl DocumentModel {
    /// File name used for the exported PDF: `{fullName or CV}_Resume.pdf`.
    pub fn export_file_name(&self) -> String {
        let stem = present(&self.personal_info.full_name).unwrap_or("CV");
        format!("{stem}_Resume.pdf")
    }
}

impl SkillGroup {
    /// Items with visible text, in insertion order.
    pub fn visible_items(&self) -> Vec<&str> {
        self.items.iter().filter_map(|item| present(item)).collect()
    }
}
