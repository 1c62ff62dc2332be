//! Entry-type field definitions.
//!
//! These drive the form generator on the client and define the modeled field
//! names of each entry type (emission order, collision checks).

use serde::Serialize;

use crate::models::entry::EntryKind;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldInput {
    Text,
    Textarea,
    List,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub input: FieldInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<&'static str>,
}

const fn field(
    name: &'static str,
    label: &'static str,
    required: bool,
    input: FieldInput,
    help: Option<&'static str>,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        required,
        input,
        help,
    }
}

use FieldInput::{List, Text, Textarea};

const DATE_HELP: Option<&str> = Some("Use this OR start_date/end_date");
const START_HELP: Option<&str> = Some("YYYY, YYYY-MM or YYYY-MM-DD");
const END_HELP: Option<&str> = Some("YYYY, YYYY-MM, YYYY-MM-DD or 'present'");

const EDUCATION: &[FieldSpec] = &[
    field("institution", "Institution", true, Text, None),
    field("area", "Area of Study", true, Text, None),
    field("degree", "Degree", false, Text, None),
    field("date", "Date", false, Text, DATE_HELP),
    field("start_date", "Start Date", false, Text, START_HELP),
    field("end_date", "End Date", false, Text, END_HELP),
    field("location", "Location", false, Text, None),
    field("summary", "Summary", false, Textarea, None),
    field("highlights", "Highlights", false, List, Some("One per line")),
];

const EXPERIENCE: &[FieldSpec] = &[
    field("company", "Company", true, Text, None),
    field("position", "Position", true, Text, None),
    field("date", "Date", false, Text, DATE_HELP),
    field("start_date", "Start Date", false, Text, START_HELP),
    field("end_date", "End Date", false, Text, END_HELP),
    field("location", "Location", false, Text, None),
    field("summary", "Summary", false, Textarea, None),
    field("highlights", "Highlights", false, List, Some("One per line")),
];

const PROJECT: &[FieldSpec] = &[
    field("name", "Name", true, Text, None),
    field("url", "URL", false, Text, None),
    field("date", "Date", false, Text, DATE_HELP),
    field("start_date", "Start Date", false, Text, START_HELP),
    field("end_date", "End Date", false, Text, END_HELP),
    field("location", "Location", false, Text, None),
    field("summary", "Summary", false, Textarea, None),
    field("highlights", "Highlights", false, List, Some("One per line")),
];

const NORMAL: &[FieldSpec] = &[
    field("name", "Name", true, Text, None),
    field("date", "Date", false, Text, DATE_HELP),
    field("start_date", "Start Date", false, Text, START_HELP),
    field("end_date", "End Date", false, Text, END_HELP),
    field("location", "Location", false, Text, None),
    field("summary", "Summary", false, Textarea, None),
    field("highlights", "Highlights", false, List, None),
];

const PUBLICATION: &[FieldSpec] = &[
    field("title", "Title", true, Text, None),
    field("authors", "Authors", true, List, Some("One author per line")),
    field("doi", "DOI", false, Text, None),
    field("url", "URL", false, Text, None),
    field("journal", "Journal/Venue", false, Text, None),
    field("date", "Date", false, Text, None),
];

const ONE_LINE: &[FieldSpec] = &[
    field("label", "Label", true, Text, None),
    field("details", "Details", true, Text, None),
];

const BULLET: &[FieldSpec] = &[field("bullet", "Bullet Point", true, Textarea, None)];

const TEXT: &[FieldSpec] = &[field("text", "Text", true, Textarea, None)];

pub fn field_specs(kind: EntryKind) -> &'static [FieldSpec] {
    match kind {
        EntryKind::Education => EDUCATION,
        EntryKind::Experience => EXPERIENCE,
        EntryKind::Project => PROJECT,
        EntryKind::Publication => PUBLICATION,
        EntryKind::Normal => NORMAL,
        EntryKind::OneLine => ONE_LINE,
        EntryKind::Bullet => BULLET,
        EntryKind::Text => TEXT,
        EntryKind::Custom => &[],
    }
}

/// Display name for palette buttons, e.g. `one_line` -> "One Line".
pub fn display_name(kind: EntryKind) -> String {
    kind.as_str()
        .split('_')
        .map(|w| {
            let mut c = w.chars();
            match c.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().to_string() + c.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryTypeSchema {
    pub entry_type: EntryKind,
    pub display_name: String,
    pub fields: &'static [FieldSpec],
}

pub fn entry_type_schemas() -> Vec<EntryTypeSchema> {
    EntryKind::ALL
        .iter()
        .map(|&kind| EntryTypeSchema {
            entry_type: kind,
            display_name: display_name(kind),
            fields: field_specs(kind),
        })
        .collect()
}
