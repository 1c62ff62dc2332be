//! Document → RenderCV YAML.
//!
//! Key order follows the RenderCV schema and is built explicitly here; the
//! emitter only decides layout and scalar style. Serialization refuses documents
//! with validator violations and never returns partial output.

pub mod emitter;
pub mod node;

use thiserror::Error;

use crate::models::document::{Design, Identity, Locale, Settings};
use crate::models::entry::{Entry, EntryData};
use crate::models::{Document, Section};
use crate::serializer::emitter::emit;
use crate::serializer::node::{Mapping, YamlNode};
use crate::validation::{validate_document, Violation};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializationError {
    #[error("document has {} validation violation(s)", .0.len())]
    InvalidDocument(Vec<Violation>),

    #[error("extra key '{key}' on {section}.{index} collides with a modeled field")]
    ExtraKeyCollision {
        section: String,
        index: usize,
        key: String,
    },

    #[error("text entry {section}.{index} cannot carry extra fields")]
    UnsupportedExtras { section: String, index: usize },

    #[error("section '{0}' appears more than once")]
    DuplicateSection(String),
}

/// Serializes a valid document to YAML text. Identical input yields identical bytes.
pub fn serialize_document(document: &Document) -> Result<String, SerializationError> {
    let violations = validate_document(document);
    if !violations.is_empty() {
        return Err(SerializationError::InvalidDocument(violations));
    }

    let mut root = Mapping::new();
    root.insert_mapping("cv", cv_mapping(&document.identity, &document.sections)?);
    root.insert_mapping("design", design_mapping(&document.design));
    root.insert_mapping("locale", locale_mapping(&document.locale));
    root.insert_mapping("settings", settings_mapping(&document.settings));

    Ok(emit(&root))
}

fn cv_mapping(identity: &Identity, sections: &[Section]) -> Result<Mapping, SerializationError> {
    let mut cv = Mapping::new();
    cv.insert_text("name", Some(&identity.name));
    cv.insert_text("headline", identity.headline.as_deref());
    cv.insert_text("location", identity.location.as_deref());
    cv.insert_text("email", identity.email.as_deref());
    cv.insert_text("phone", identity.phone.as_deref());
    cv.insert_text("website", identity.website.as_deref());
    cv.insert_text("photo", identity.photo.as_deref());

    let networks: Vec<YamlNode> = identity
        .social_networks
        .iter()
        .map(|n| {
            let mut m = Mapping::new();
            m.insert_text("network", Some(&n.network));
            m.insert_text("username", Some(&n.username));
            m.into()
        })
        .collect();
    if !networks.is_empty() {
        cv.insert_sequence("social_networks", networks);
    }

    let connections: Vec<YamlNode> = identity
        .custom_connections
        .iter()
        .map(|c| {
            let mut m = Mapping::new();
            m.insert_text("placeholder", Some(&c.placeholder));
            m.insert_text("url", c.url.as_deref());
            m.insert_text("fontawesome_icon", c.fontawesome_icon.as_deref());
            m.into()
        })
        .collect();
    if !connections.is_empty() {
        cv.insert_sequence("custom_connections", connections);
    }

    let mut sections_map = Mapping::new();
    for section in sections.iter().filter(|s| !s.entries.is_empty()) {
        let entries = section
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| entry_node(entry, &section.name, index))
            .collect::<Result<Vec<_>, _>>()?;
        sections_map
            .insert(&section.name, YamlNode::Sequence(entries))
            .map_err(|dup| SerializationError::DuplicateSection(dup.0))?;
    }
    cv.insert_mapping("sections", sections_map);

    Ok(cv)
}

fn entry_node(entry: &Entry, section: &str, index: usize) -> Result<YamlNode, SerializationError> {
    let mut map = Mapping::new();

    match &entry.data {
        EntryData::Education(e) => {
            map.insert_text("institution", Some(&e.institution));
            map.insert_text("area", Some(&e.area));
            map.insert_text("degree", e.degree.as_deref());
            map.insert_text("date", e.date.as_deref());
            map.insert_text("start_date", e.start_date.as_deref());
            map.insert_text("end_date", e.end_date.as_deref());
            map.insert_text("location", e.location.as_deref());
            map.insert_text("summary", e.summary.as_deref());
            map.insert_list("highlights", &e.highlights);
        }
        EntryData::Experience(e) => {
            map.insert_text("company", Some(&e.company));
            map.insert_text("position", Some(&e.position));
            map.insert_text("date", e.date.as_deref());
            map.insert_text("start_date", e.start_date.as_deref());
            map.insert_text("end_date", e.end_date.as_deref());
            map.insert_text("location", e.location.as_deref());
            map.insert_text("summary", e.summary.as_deref());
            map.insert_list("highlights", &e.highlights);
        }
        EntryData::Project(e) => {
            map.insert_text("name", Some(&e.name));
            map.insert_text("url", e.url.as_deref());
            map.insert_text("date", e.date.as_deref());
            map.insert_text("start_date", e.start_date.as_deref());
            map.insert_text("end_date", e.end_date.as_deref());
            map.insert_text("location", e.location.as_deref());
            map.insert_text("summary", e.summary.as_deref());
            map.insert_list("highlights", &e.highlights);
        }
        EntryData::Normal(e) => {
            map.insert_text("name", Some(&e.name));
            map.insert_text("date", e.date.as_deref());
            map.insert_text("start_date", e.start_date.as_deref());
            map.insert_text("end_date", e.end_date.as_deref());
            map.insert_text("location", e.location.as_deref());
            map.insert_text("summary", e.summary.as_deref());
            map.insert_list("highlights", &e.highlights);
        }
        EntryData::Publication(e) => {
            map.insert_text("title", Some(&e.title));
            map.insert_list("authors", &e.authors);
            map.insert_text("doi", e.doi.as_deref());
            map.insert_text("url", e.url.as_deref());
            map.insert_text("journal", e.journal.as_deref());
            map.insert_text("date", e.date.as_deref());
        }
        EntryData::OneLine(e) => {
            map.insert_text("label", Some(&e.label));
            map.insert_text("details", Some(&e.details));
        }
        EntryData::Bullet(e) => {
            map.insert_text("bullet", Some(&e.bullet));
        }
        // RenderCV text entries are bare strings.
        EntryData::Text(e) => {
            if !entry.extras.is_empty() {
                return Err(SerializationError::UnsupportedExtras {
                    section: section.to_string(),
                    index,
                });
            }
            return Ok(YamlNode::Scalar(e.text.clone()));
        }
        EntryData::Custom => {}
    }

    let kind = entry.kind();
    for (key, value) in &entry.extras {
        let collision = || SerializationError::ExtraKeyCollision {
            section: section.to_string(),
            index,
            key: key.clone(),
        };
        if kind.is_modeled_field(key) {
            return Err(collision());
        }
        if value.trim().is_empty() {
            continue;
        }
        map.insert(key, YamlNode::Scalar(value.clone()))
            .map_err(|_| collision())?;
    }

    Ok(map.into())
}

fn design_mapping(design: &Design) -> Mapping {
    let mut m = Mapping::new();
    m.insert_text("theme", Some(design.theme.as_str()));
    m.insert_text("color", design.color.as_deref());
    if let Some(flag) = design.disable_page_numbering {
        m.insert_bool("disable_page_numbering", flag);
    }
    m.insert_mapping("templates", text_mapping(&design.templates));
    m
}

fn locale_mapping(locale: &Locale) -> Mapping {
    let mut m = Mapping::new();
    m.insert_text("language", Some(locale.language.as_str()));
    m.insert_text("date_style", locale.date_style.as_deref());
    m.insert_mapping("translations", text_mapping(&locale.translations));
    m
}

fn settings_mapping(settings: &Settings) -> Mapping {
    let mut m = Mapping::new();
    m.insert_text("current_date", settings.current_date.as_deref());
    m.insert_list("bold_keywords", &settings.bold_keywords);
    m
}

fn text_mapping<'a>(pairs: impl IntoIterator<Item = (&'a String, &'a String)>) -> Mapping {
    let mut m = Mapping::new();
    for (key, value) in pairs {
        m.insert_text(key, Some(value));
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{SocialNetwork, Theme};
    use crate::models::entry::{
        BulletEntry, EducationEntry, EntryKind, ExperienceEntry, NormalEntry, OneLineEntry,
        ProjectEntry, PublicationEntry, TextEntry,
    };
    use crate::models::schema::field_specs;
    use crate::validation::ViolationKind;
    use proptest::prelude::*;
    use serde_yaml::Value;

    fn named(name: &str) -> Document {
        let mut doc = Document::default();
        doc.identity.name = name.to_string();
        doc
    }

    fn education(institution: &str, start: &str, end: &str) -> Entry {
        Entry::new(EntryData::Education(EducationEntry {
            institution: institution.to_string(),
            area: "Computer Science".to_string(),
            degree: Some("BS".to_string()),
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            ..Default::default()
        }))
    }

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_education_scenario_end_to_end() {
        let mut doc = named("Grace Hopper");
        doc.add_entry("education", education("Yale", "2019-09", "present"))
            .unwrap();
        doc.add_entry("education", education("Vassar", "2016", "2020-05"))
            .unwrap();
        assert!(validate_document(&doc).is_empty());

        let yaml = serialize_document(&doc).unwrap();
        let expected = "\
cv:
  name: Grace Hopper
  sections:
    education:
      - institution: Yale
        area: Computer Science
        degree: BS
        start_date: '2019-09'
        end_date: present
      - institution: Vassar
        area: Computer Science
        degree: BS
        start_date: '2016'
        end_date: '2020-05'
design:
  theme: classic
locale:
  language: english
";
        assert_eq!(yaml, expected);

        let value = parse(&yaml);
        let entries = value["cv"]["sections"]["education"].as_sequence().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["institution"], Value::from("Yale"));
        assert_eq!(entries[0]["end_date"], Value::from("present"));
        assert_eq!(entries[1]["end_date"], Value::from("2020-05"));
    }

    #[test]
    fn test_refuses_document_without_name() {
        let doc = Document::default();
        match serialize_document(&doc) {
            Err(SerializationError::InvalidDocument(v)) => {
                assert_eq!(v.len(), 1);
                assert_eq!(v[0].kind, ViolationKind::MissingRequiredField);
            }
            other => panic!("expected InvalidDocument, got {other:?}"),
        }
    }

    #[test]
    fn test_extra_key_collision_is_an_error() {
        let mut doc = named("X");
        let entry = Entry::new(EntryData::Publication(PublicationEntry {
            title: "Compilers".to_string(),
            authors: vec!["G. Hopper".to_string()],
            ..Default::default()
        }))
        .with_extra("title", "Shadow");
        // Bypass the add-time guard to exercise the serializer's own check.
        doc.sections.push(Section {
            name: "publications".to_string(),
            entry_type: Some(EntryKind::Publication),
            entries: vec![entry],
        });
        assert_eq!(
            serialize_document(&doc),
            Err(SerializationError::ExtraKeyCollision {
                section: "publications".to_string(),
                index: 0,
                key: "title".to_string(),
            })
        );
    }

    #[test]
    fn test_collision_detected_even_when_modeled_field_is_empty() {
        let mut doc = named("X");
        let entry = Entry::new(EntryData::Normal(NormalEntry {
            name: "Thing".to_string(),
            ..Default::default()
        }))
        .with_extra("location", "Berlin");
        doc.sections.push(Section {
            name: "misc".to_string(),
            entry_type: None,
            entries: vec![entry],
        });
        assert!(matches!(
            serialize_document(&doc),
            Err(SerializationError::ExtraKeyCollision { ref key, .. }) if key == "location"
        ));
    }

    #[test]
    fn test_extras_flattened_after_modeled_fields() {
        let mut doc = named("X");
        let entry = Entry::new(EntryData::Experience(ExperienceEntry {
            company: "Acme".to_string(),
            position: "CTO".to_string(),
            ..Default::default()
        }))
        .with_extra("revenue", "$2M")
        .with_extra("blank", "  ");
        doc.add_entry("experience", entry).unwrap();
        let yaml = serialize_document(&doc).unwrap();
        assert!(yaml.contains(
            "      - company: Acme\n        position: CTO\n        revenue: $2M\n"
        ));
        assert!(!yaml.contains("blank"));
    }

    #[test]
    fn test_optional_fields_never_emitted_as_placeholders() {
        let mut doc = named("X");
        doc.identity.email = Some(String::new());
        doc.identity.headline = None;
        let yaml = serialize_document(&doc).unwrap();
        assert_eq!(
            yaml,
            "cv:\n  name: X\ndesign:\n  theme: classic\nlocale:\n  language: english\n"
        );
        assert!(!yaml.contains("null"));
        assert!(!yaml.contains("''"));
    }

    #[test]
    fn test_summary_emitted_as_block_literal() {
        let mut doc = named("X");
        let entry = Entry::new(EntryData::Normal(NormalEntry {
            name: "Side project".to_string(),
            summary: Some("Built a thing.\nUsed by 10 people.".to_string()),
            ..Default::default()
        }));
        doc.add_entry("projects", entry).unwrap();
        let yaml = serialize_document(&doc).unwrap();
        assert!(yaml.contains(
            "        summary: |-\n          Built a thing.\n          Used by 10 people.\n"
        ));
        assert_eq!(
            parse(&yaml)["cv"]["sections"]["projects"][0]["summary"],
            Value::from("Built a thing.\nUsed by 10 people.")
        );
    }

    #[test]
    fn test_text_entries_are_bare_strings() {
        let mut doc = named("X");
        doc.add_entry(
            "summary",
            Entry::new(EntryData::Text(TextEntry {
                text: "Engineer who likes compilers.".to_string(),
            })),
        )
        .unwrap();
        let value = parse(&serialize_document(&doc).unwrap());
        assert_eq!(
            value["cv"]["sections"]["summary"][0],
            Value::from("Engineer who likes compilers.")
        );
    }

    #[test]
    fn test_text_entry_extras_rejected() {
        let mut doc = named("X");
        doc.sections.push(Section {
            name: "summary".to_string(),
            entry_type: Some(EntryKind::Text),
            entries: vec![Entry::new(EntryData::Text(TextEntry {
                text: "Hi".to_string(),
            }))
            .with_extra("tone", "warm")],
        });
        assert!(matches!(
            serialize_document(&doc),
            Err(SerializationError::UnsupportedExtras { index: 0, .. })
        ));
    }

    #[test]
    fn test_duplicate_section_names_rejected() {
        let mut doc = named("X");
        for _ in 0..2 {
            let mut section = Section::new("skills");
            section
                .add_entry(Entry::new(EntryData::OneLine(OneLineEntry {
                    label: "Lang".to_string(),
                    details: "Rust".to_string(),
                })))
                .unwrap();
            doc.sections.push(section);
        }
        assert_eq!(
            serialize_document(&doc),
            Err(SerializationError::DuplicateSection("skills".to_string()))
        );
    }

    #[test]
    fn test_top_level_and_identity_key_order() {
        let mut doc = named("X");
        doc.identity.website = Some("https://x.dev".to_string());
        doc.identity.email = Some("x@x.dev".to_string());
        doc.identity.headline = Some("Engineer".to_string());
        doc.identity.social_networks.push(SocialNetwork {
            network: "GitHub".to_string(),
            username: "x".to_string(),
        });
        doc.design.theme = Theme::Sb2nov;
        doc.design.disable_page_numbering = Some(true);
        doc.settings.bold_keywords = vec!["Rust".to_string()];
        doc.add_entry(
            "skills",
            Entry::new(EntryData::OneLine(OneLineEntry {
                label: "Languages".to_string(),
                details: "Rust".to_string(),
            })),
        )
        .unwrap();

        let yaml = serialize_document(&doc).unwrap();
        let expected = "\
cv:
  name: X
  headline: Engineer
  email: x@x.dev
  website: https://x.dev
  social_networks:
    - network: GitHub
      username: x
  sections:
    skills:
      - label: Languages
        details: Rust
design:
  theme: sb2nov
  disable_page_numbering: true
locale:
  language: english
settings:
  bold_keywords:
    - Rust
";
        assert_eq!(yaml, expected);
    }

    /// An entry of `kind` with every modeled field filled; `None` for kinds
    /// that are not emitted as mappings.
    fn fully_populated(kind: EntryKind) -> Option<EntryData> {
        let some = |v: &str| Some(v.to_string());
        let list = || vec!["One".to_string()];
        let data = match kind {
            EntryKind::Education => EntryData::Education(EducationEntry {
                institution: "MIT".to_string(),
                area: "Physics".to_string(),
                degree: some("BS"),
                date: some("2020"),
                start_date: some("2020-01"),
                end_date: some("2021-01"),
                location: some("Boston"),
                summary: some("Studied"),
                highlights: list(),
            }),
            EntryKind::Experience => EntryData::Experience(ExperienceEntry {
                company: "Acme".to_string(),
                position: "Dev".to_string(),
                date: some("2020"),
                start_date: some("2020-01"),
                end_date: some("2021-01"),
                location: some("Remote"),
                summary: some("Did things"),
                highlights: list(),
            }),
            EntryKind::Project => EntryData::Project(ProjectEntry {
                name: "Tool".to_string(),
                url: some("https://example.com"),
                date: some("2020"),
                start_date: some("2020-01"),
                end_date: some("2021-01"),
                location: some("Home"),
                summary: some("Built it"),
                highlights: list(),
            }),
            EntryKind::Publication => EntryData::Publication(PublicationEntry {
                title: "Paper".to_string(),
                authors: list(),
                doi: some("10.1000/xyz"),
                url: some("https://example.com/paper"),
                journal: some("Journal"),
                date: some("2020-05"),
            }),
            EntryKind::Normal => EntryData::Normal(NormalEntry {
                name: "Award".to_string(),
                date: some("2020"),
                start_date: some("2020-01"),
                end_date: some("2021-01"),
                location: some("Paris"),
                summary: some("Won"),
                highlights: list(),
            }),
            EntryKind::OneLine => EntryData::OneLine(OneLineEntry {
                label: "Languages".to_string(),
                details: "Rust".to_string(),
            }),
            EntryKind::Bullet => EntryData::Bullet(BulletEntry {
                bullet: "Point".to_string(),
            }),
            EntryKind::Text | EntryKind::Custom => return None,
        };
        Some(data)
    }

    #[test]
    fn test_entry_keys_follow_schema_order() {
        for kind in EntryKind::ALL {
            let Some(data) = fully_populated(kind) else {
                continue;
            };
            assert_eq!(data.kind(), kind);
            let mut doc = named("X");
            doc.add_entry(kind.as_str(), Entry::new(data)).unwrap();
            let value = parse(&serialize_document(&doc).unwrap());
            let entry = value["cv"]["sections"][kind.as_str()][0]
                .as_mapping()
                .unwrap();
            let keys: Vec<&str> = entry.keys().filter_map(Value::as_str).collect();
            let schema: Vec<&str> = field_specs(kind).iter().map(|f| f.name).collect();
            assert_eq!(keys, schema, "{} keys out of schema order", kind.as_str());
        }
    }

    fn text_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "[A-Za-z][A-Za-z0-9 ,.'#:&-]{0,24}",
            "[0-9]{1,4}",
            "(yes|no|true|null|~|on)",
            "[A-Za-z ]{1,10}\n[A-Za-z #:-]{0,10}\n?",
            "[ -~]{1,20}",
        ]
    }

    fn date_strategy() -> impl Strategy<Value = (String, String)> {
        (1990u32..2010, 1u32..=12, 2010u32..2030).prop_map(|(y, m, end)| {
            (format!("{y}-{m:02}"), end.to_string())
        })
    }

    proptest! {
        #[test]
        fn prop_valid_documents_round_trip(
            name in "[A-Z][a-z]{1,10} [A-Z][a-z]{1,10}",
            institution in text_strategy(),
            area in text_strategy(),
            summary in text_strategy(),
            highlights in proptest::collection::vec(text_strategy(), 0..4),
            (start, end) in date_strategy(),
            extra in text_strategy(),
        ) {
            prop_assume!(!institution.trim().is_empty() && !area.trim().is_empty());
            let mut doc = named(&name);
            let entry = Entry::new(EntryData::Education(EducationEntry {
                institution: institution.clone(),
                area: area.clone(),
                start_date: Some(start.clone()),
                end_date: Some(end.clone()),
                summary: Some(summary.clone()),
                highlights: highlights.clone(),
                ..Default::default()
            }))
            .with_extra("custom_note", extra.clone());
            doc.add_entry("education", entry).unwrap();

            let first = serialize_document(&doc).unwrap();
            let second = serialize_document(&doc).unwrap();
            prop_assert_eq!(&first, &second);

            let value = parse(&first);
            prop_assert_eq!(&value["cv"]["name"], &Value::from(name.as_str()));
            let e = &value["cv"]["sections"]["education"][0];
            prop_assert_eq!(&e["institution"], &Value::from(institution.as_str()));
            prop_assert_eq!(&e["area"], &Value::from(area.as_str()));
            prop_assert_eq!(&e["start_date"], &Value::from(start.as_str()));
            prop_assert_eq!(&e["end_date"], &Value::from(end.as_str()));
            if summary.trim().is_empty() {
                prop_assert!(e.get("summary").is_none());
            } else {
                prop_assert_eq!(&e["summary"], &Value::from(summary.as_str()));
            }
            let kept: Vec<Value> = highlights
                .iter()
                .filter(|h| !h.trim().is_empty())
                .map(|h| Value::from(h.as_str()))
                .collect();
            if kept.is_empty() {
                prop_assert!(e.get("highlights").is_none());
            } else {
                prop_assert_eq!(&e["highlights"], &Value::Sequence(kept));
            }
            if !extra.trim().is_empty() {
                prop_assert_eq!(&e["custom_note"], &Value::from(extra.as_str()));
            }
        }
    }
}
