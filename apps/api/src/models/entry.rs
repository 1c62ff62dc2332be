use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::schema::field_specs;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Education,
    Experience,
    Project,
    Publication,
    Normal,
    OneLine,
    Bullet,
    Text,
    Custom,
}

impl EntryKind {
    pub const ALL: [EntryKind; 9] = [
        EntryKind::Education,
        EntryKind::Experience,
        EntryKind::Project,
        EntryKind::Publication,
        EntryKind::Normal,
        EntryKind::OneLine,
        EntryKind::Bullet,
        EntryKind::Text,
        EntryKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Education => "education",
            EntryKind::Experience => "experience",
            EntryKind::Project => "project",
            EntryKind::Publication => "publication",
            EntryKind::Normal => "normal",
            EntryKind::OneLine => "one_line",
            EntryKind::Bullet => "bullet",
            EntryKind::Text => "text",
            EntryKind::Custom => "custom",
        }
    }

    /// Names of the modeled fields for this kind, in emission order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
        field_specs(*self).iter().map(|spec| spec.name)
    }

    pub fn is_modeled_field(&self, key: &str) -> bool {
        self.field_names().any(|name| name == key)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EducationEntry {
    pub institution: String,
    pub area: String,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExperienceEntry {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectEntry {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalEntry {
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PublicationEntry {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OneLineEntry {
    pub label: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BulletEntry {
    pub bullet: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TextEntry {
    pub text: String,
}

/// Per-type entry payload. The discriminator is the `entry_type` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "entry_type", rename_all = "snake_case")]
pub enum EntryData {
    Education(EducationEntry),
    Experience(ExperienceEntry),
    Project(ProjectEntry),
    Publication(PublicationEntry),
    Normal(NormalEntry),
    OneLine(OneLineEntry),
    Bullet(BulletEntry),
    Text(TextEntry),
    Custom,
}

/// The date fields an entry carries, if its type has any.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFields<'a> {
    pub date: Option<&'a str>,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
}

impl EntryData {
    pub fn kind(&self) -> EntryKind {
        match self {
            EntryData::Education(_) => EntryKind::Education,
            EntryData::Experience(_) => EntryKind::Experience,
            EntryData::Project(_) => EntryKind::Project,
            EntryData::Publication(_) => EntryKind::Publication,
            EntryData::Normal(_) => EntryKind::Normal,
            EntryData::OneLine(_) => EntryKind::OneLine,
            EntryData::Bullet(_) => EntryKind::Bullet,
            EntryData::Text(_) => EntryKind::Text,
            EntryData::Custom => EntryKind::Custom,
        }
    }

    /// Required fields that are absent or blank, in schema order.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let checks: Vec<(&'static str, bool)> = match self {
            EntryData::Education(e) => {
                vec![("institution", blank(&e.institution)), ("area", blank(&e.area))]
            }
            EntryData::Experience(e) => {
                vec![("company", blank(&e.company)), ("position", blank(&e.position))]
            }
            EntryData::Project(e) => vec![("name", blank(&e.name))],
            EntryData::Normal(e) => vec![("name", blank(&e.name))],
            EntryData::Publication(e) => vec![
                ("title", blank(&e.title)),
                ("authors", e.authors.iter().all(|a| blank(a))),
            ],
            EntryData::OneLine(e) => {
                vec![("label", blank(&e.label)), ("details", blank(&e.details))]
            }
            EntryData::Bullet(e) => vec![("bullet", blank(&e.bullet))],
            EntryData::Text(e) => vec![("text", blank(&e.text))],
            EntryData::Custom => vec![],
        };

        checks
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn dates(&self) -> DateFields<'_> {
        fn timed<'a>(
            date: &'a Option<String>,
            start: &'a Option<String>,
            end: &'a Option<String>,
        ) -> DateFields<'a> {
            DateFields {
                date: present(date),
                start_date: present(start),
                end_date: present(end),
            }
        }

        match self {
            EntryData::Education(e) => timed(&e.date, &e.start_date, &e.end_date),
            EntryData::Experience(e) => timed(&e.date, &e.start_date, &e.end_date),
            EntryData::Project(e) => timed(&e.date, &e.start_date, &e.end_date),
            EntryData::Normal(e) => timed(&e.date, &e.start_date, &e.end_date),
            EntryData::Publication(e) => DateFields {
                date: present(&e.date),
                ..DateFields::default()
            },
            _ => DateFields::default(),
        }
    }

    /// Short human label used in logs and listings.
    pub fn display_title(&self) -> Option<&str> {
        let title = match self {
            EntryData::Education(e) => &e.institution,
            EntryData::Experience(e) => &e.company,
            EntryData::Project(e) => &e.name,
            EntryData::Normal(e) => &e.name,
            EntryData::Publication(e) => &e.title,
            EntryData::OneLine(e) => &e.label,
            EntryData::Bullet(e) => &e.bullet,
            EntryData::Text(e) => &e.text,
            EntryData::Custom => return None,
        };
        (!blank(title)).then_some(title.as_str())
    }
}

/// One item within a section: typed data plus arbitrary pass-through keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub data: EntryData,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, String>,
}

impl Entry {
    pub fn new(data: EntryData) -> Self {
        Self {
            data,
            extras: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> EntryKind {
        self.data.kind()
    }

    /// First extra key that shadows a modeled field of this entry's type.
    pub fn colliding_extra_key(&self) -> Option<&str> {
        let kind = self.kind();
        self.extras
            .keys()
            .find(|key| kind.is_modeled_field(key))
            .map(String::as_str)
    }
}

pub(crate) fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !blank(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_data_tagged_by_entry_type() {
        let json = serde_json::json!({
            "data": {
                "entry_type": "experience",
                "company": "Acme",
                "position": "Engineer",
                "start_date": "2021-03"
            },
            "extras": {"team": "Platform"}
        });
        let entry: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.kind(), EntryKind::Experience);
        assert_eq!(entry.extras.get("team").map(String::as_str), Some("Platform"));
        match entry.data {
            EntryData::Experience(e) => {
                assert_eq!(e.company, "Acme");
                assert!(e.highlights.is_empty());
                assert!(e.end_date.is_none());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_custom_entry_has_no_fields() {
        let json = serde_json::json!({"data": {"entry_type": "custom"}, "extras": {"award": "Best paper"}});
        let entry: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.kind(), EntryKind::Custom);
        assert!(entry.data.missing_required_fields().is_empty());
    }

    #[test]
    fn test_missing_required_fields_treats_blank_as_missing() {
        let data = EntryData::Education(EducationEntry {
            institution: "   ".to_string(),
            area: "Physics".to_string(),
            ..Default::default()
        });
        assert_eq!(data.missing_required_fields(), vec!["institution"]);
    }

    #[test]
    fn test_publication_requires_non_blank_author() {
        let data = EntryData::Publication(PublicationEntry {
            title: "On Things".to_string(),
            authors: vec![" ".to_string()],
            ..Default::default()
        });
        assert_eq!(data.missing_required_fields(), vec!["authors"]);
    }

    #[test]
    fn test_colliding_extra_key_detects_modeled_field() {
        let entry = Entry::new(EntryData::Normal(NormalEntry {
            name: "Thing".to_string(),
            ..Default::default()
        }))
        .with_extra("summary", "shadow")
        .with_extra("revenue", "$1M");
        assert_eq!(entry.colliding_extra_key(), Some("summary"));
    }

    #[test]
    fn test_extra_matching_other_kinds_field_is_not_a_collision() {
        let entry = Entry::new(EntryData::OneLine(OneLineEntry {
            label: "Languages".to_string(),
            details: "Rust, Go".to_string(),
        }))
        .with_extra("company", "n/a");
        assert_eq!(entry.colliding_extra_key(), None);
    }

    #[test]
    fn test_dates_skip_blank_values() {
        let data = EntryData::Normal(NormalEntry {
            name: "X".to_string(),
            start_date: Some(String::new()),
            end_date: Some("present".to_string()),
            ..Default::default()
        });
        let dates = data.dates();
        assert_eq!(dates.start_date, None);
        assert_eq!(dates.end_date, Some("present"));
    }
}
