//! Template presets for guided mode.

use serde::Serialize;

use crate::models::document::Theme;
use crate::models::entry::EntryKind;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GuidedInput {
    Text,
    Email,
    Url,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GuidedField {
    pub key: &'static str,
    pub label: &'static str,
    pub input: GuidedInput,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplatePreset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub theme: Theme,
    pub color: Option<&'static str>,
    pub recommended_sections: &'static [&'static str],
    pub guided_fields: &'static [GuidedField],
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendedSection {
    pub name: &'static str,
    pub entry_type: EntryKind,
}

const fn guided(
    key: &'static str,
    label: &'static str,
    input: GuidedInput,
    required: bool,
) -> GuidedField {
    GuidedField {
        key,
        label,
        input,
        required,
    }
}

pub const PRESETS: &[TemplatePreset] = &[
    TemplatePreset {
        id: "classic",
        name: "Classic Theme",
        description: "Traditional timeline-based CV with clean typography",
        theme: Theme::Classic,
        color: Some("blue"),
        recommended_sections: &["education", "experience", "skills", "projects"],
        guided_fields: &[
            guided("name", "Full Name", GuidedInput::Text, true),
            guided("headline", "Professional Headline", GuidedInput::Text, false),
            guided("location", "Location", GuidedInput::Text, false),
            guided("email", "Email", GuidedInput::Email, true),
            guided("phone", "Phone", GuidedInput::Text, false),
            guided("website", "Website", GuidedInput::Url, false),
        ],
    },
    TemplatePreset {
        id: "moderncv",
        name: "Modern CV",
        description: "Contemporary design with accent colors",
        theme: Theme::ModernCv,
        color: Some("purple"),
        recommended_sections: &["summary", "experience", "education", "skills"],
        guided_fields: &[
            guided("name", "Full Name", GuidedInput::Text, true),
            guided("headline", "Professional Title", GuidedInput::Text, false),
            guided("email", "Email", GuidedInput::Email, true),
        ],
    },
    TemplatePreset {
        id: "sb2nov",
        name: "SB2Nov",
        description: "Compact, information-dense layout",
        theme: Theme::Sb2nov,
        color: None,
        recommended_sections: &["education", "experience", "projects", "skills"],
        guided_fields: &[
            guided("name", "Full Name", GuidedInput::Text, true),
            guided("email", "Email", GuidedInput::Email, true),
            guided("phone", "Phone", GuidedInput::Text, false),
        ],
    },
];

pub fn find_preset(id: &str) -> Option<&'static TemplatePreset> {
    PRESETS.iter().find(|p| p.id == id)
}

/// Entry type suggested for a section by its name.
pub fn suggested_entry_kind(section: &str) -> EntryKind {
    let name = section.to_lowercase();
    if name.contains("experience") {
        EntryKind::Experience
    } else if name.contains("education") {
        EntryKind::Education
    } else if name.contains("skill") {
        EntryKind::OneLine
    } else {
        EntryKind::Normal
    }
}

impl TemplatePreset {
    pub fn sections(&self) -> Vec<RecommendedSection> {
        self.recommended_sections
            .iter()
            .map(|&name| RecommendedSection {
                name,
                entry_type: suggested_entry_kind(name),
            })
            .collect()
    }
}
