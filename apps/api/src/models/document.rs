use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::entry::Entry;
use crate::models::presets::TemplatePreset;
use crate::models::section::{ModelError, Section};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Classic,
    ModernCv,
    Sb2nov,
    EngineeringResumes,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Classic => "classic",
            Theme::ModernCv => "moderncv",
            Theme::Sb2nov => "sb2nov",
            Theme::EngineeringResumes => "engineeringresumes",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Portuguese,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Spanish => "spanish",
            Language::French => "french",
            Language::German => "german",
            Language::Portuguese => "portuguese",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SocialNetwork {
    pub network: String,
    pub username: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomConnection {
    pub placeholder: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub fontawesome_icon: Option<String>,
}

/// Contact and identity block (`cv:` header fields).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub social_networks: Vec<SocialNetwork>,
    #[serde(default)]
    pub custom_connections: Vec<CustomConnection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Design {
    #[serde(default)]
    pub theme: Theme,
    /// Accent color override.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub disable_page_numbering: Option<bool>,
    /// Custom Typst snippets keyed by RenderCV entry type name.
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Locale {
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub date_style: Option<String>,
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub current_date: Option<String>,
    #[serde(default)]
    pub bold_keywords: Vec<String>,
}

/// The full resume being edited in one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub design: Design,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Document {
    pub fn from_preset(preset: &TemplatePreset) -> Self {
        Self {
            design: Design {
                theme: preset.theme,
                color: preset.color.map(str::to_string),
                ..Design::default()
            },
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_mut(&mut self, name: &str) -> Result<&mut Section, ModelError> {
        self.sections
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| ModelError::SectionNotFound(name.to_string()))
    }

    /// Adds an entry to the named section, creating the section at the end if needed.
    pub fn add_entry(&mut self, section: &str, entry: Entry) -> Result<usize, ModelError> {
        if section.trim().is_empty() {
            return Err(ModelError::BlankFieldName);
        }
        match self.sections.iter_mut().find(|s| s.name == section) {
            Some(existing) => existing.add_entry(entry),
            None => {
                let mut created = Section::new(section);
                let index = created.add_entry(entry)?;
                self.sections.push(created);
                Ok(index)
            }
        }
    }

    pub fn replace_entry(
        &mut self,
        section: &str,
        index: usize,
        entry: Entry,
    ) -> Result<(), ModelError> {
        self.section_mut(section)?.replace_entry(index, entry)
    }

    /// Removes an entry; a section left empty is dropped.
    pub fn remove_entry(&mut self, section: &str, index: usize) -> Result<Entry, ModelError> {
        let target = self.section_mut(section)?;
        let removed = target.remove_entry(index)?;
        if target.entries.is_empty() {
            self.sections.retain(|s| s.name != section);
        }
        Ok(removed)
    }

    pub fn remove_section(&mut self, section: &str) -> Result<Section, ModelError> {
        let position = self
            .sections
            .iter()
            .position(|s| s.name == section)
            .ok_or_else(|| ModelError::SectionNotFound(section.to_string()))?;
        Ok(self.sections.remove(position))
    }

    pub fn set_extra(
        &mut self,
        section: &str,
        index: usize,
        key: &str,
        value: String,
    ) -> Result<(), ModelError> {
        self.section_mut(section)?.set_extra(index, key, value)
    }

    /// File stem for downloads, e.g. "Jane Doe" -> "Jane_Doe_CV".
    pub fn download_stem(&self) -> String {
        let name = self.identity.name.trim();
        if name.is_empty() {
            return "CV".to_string();
        }
        let safe: String = name
            .chars()
            .map(|c| match c {
                ' ' => '_',
                '/' | '\\' | '"' | ':' | '*' | '?' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        format!("{safe}_CV")
    }
}
