use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::entry::{blank, Entry, EntryKind};
use crate::models::{Document, Section};
use crate::validation::dates::{parse_date, parse_end_date, starts_after};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    MissingRequiredField,
    InvalidDateFormat,
    InvalidDateOrder,
    InconsistentEntryType,
    InvalidFieldName,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::MissingRequiredField => "missing_required_field",
            ViolationKind::InvalidDateFormat => "invalid_date_format",
            ViolationKind::InvalidDateOrder => "invalid_date_order",
            ViolationKind::InconsistentEntryType => "inconsistent_entry_type",
            ViolationKind::InvalidFieldName => "invalid_field_name",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a violation, e.g. `education.0.start_date`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldPath(pub Vec<PathSegment>);

impl FieldPath {
    pub fn field(name: &str) -> Self {
        Self(vec![PathSegment::Key(name.to_string())])
    }

    pub fn entry(section: &str, index: usize) -> Self {
        Self(vec![
            PathSegment::Key(section.to_string()),
            PathSegment::Index(index),
        ])
    }

    pub fn key(mut self, name: &str) -> Self {
        self.0.push(PathSegment::Key(name.to_string()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                PathSegment::Key(k) => f.write_str(k)?,
                PathSegment::Index(n) => write!(f, "{n}")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub location: FieldPath,
}

impl Violation {
    fn new(kind: ViolationKind, location: FieldPath) -> Self {
        Self { kind, location }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.location)
    }
}

/// Checks a document before serialization. An empty result means valid.
pub fn validate_document(document: &Document) -> Vec<Violation> {
    let mut violations = Vec::new();

    if blank(&document.identity.name) {
        violations.push(Violation::new(
            ViolationKind::MissingRequiredField,
            FieldPath::field("name"),
        ));
    }

    for (i, network) in document.identity.social_networks.iter().enumerate() {
        let base = FieldPath::field("social_networks").index(i);
        for (field, value) in [("network", &network.network), ("username", &network.username)] {
            if blank(value) {
                violations.push(Violation::new(
                    ViolationKind::MissingRequiredField,
                    base.clone().key(field),
                ));
            }
        }
    }

    for (i, connection) in document.identity.custom_connections.iter().enumerate() {
        if blank(&connection.placeholder) {
            violations.push(Violation::new(
                ViolationKind::MissingRequiredField,
                FieldPath::field("custom_connections").index(i).key("placeholder"),
            ));
        }
    }

    if let Some(current) = document
        .settings
        .current_date
        .as_deref()
        .filter(|v| !blank(v))
    {
        if parse_date(current).is_err() {
            violations.push(Violation::new(
                ViolationKind::InvalidDateFormat,
                FieldPath::field("settings").key("current_date"),
            ));
        }
    }

    for section in &document.sections {
        validate_section(section, &mut violations);
    }

    violations
}

fn validate_section(section: &Section, violations: &mut Vec<Violation>) {
    if blank(&section.name) {
        violations.push(Violation::new(
            ViolationKind::InvalidFieldName,
            FieldPath::field("sections").key(&section.name),
        ));
    }

    let established = section.established_kind();
    for (index, entry) in section.entries.iter().enumerate() {
        let base = FieldPath::entry(&section.name, index);

        if established.is_some_and(|kind| kind != entry.kind()) {
            violations.push(Violation::new(
                ViolationKind::InconsistentEntryType,
                base.clone(),
            ));
        }

        validate_entry(entry, &base, violations);
    }
}

fn validate_entry(entry: &Entry, base: &FieldPath, violations: &mut Vec<Violation>) {
    for field in entry.data.missing_required_fields() {
        violations.push(Violation::new(
            ViolationKind::MissingRequiredField,
            base.clone().key(field),
        ));
    }

    if entry.kind() == EntryKind::Custom && entry.extras.values().all(|v| blank(v)) {
        violations.push(Violation::new(
            ViolationKind::MissingRequiredField,
            base.clone().key("extras"),
        ));
    }

    for key in entry.extras.keys().filter(|k| blank(k)) {
        violations.push(Violation::new(
            ViolationKind::InvalidFieldName,
            base.clone().key("extras").key(key),
        ));
    }

    let dates = entry.data.dates();

    if let Some(date) = dates.date {
        if parse_date(date).is_err() {
            violations.push(Violation::new(
                ViolationKind::InvalidDateFormat,
                base.clone().key("date"),
            ));
        }
    }

    let start = dates.start_date.map(parse_date);
    let end = dates.end_date.map(parse_end_date);

    if let Some(Err(_)) = start {
        violations.push(Violation::new(
            ViolationKind::InvalidDateFormat,
            base.clone().key("start_date"),
        ));
    }
    if let Some(Err(_)) = end {
        violations.push(Violation::new(
            ViolationKind::InvalidDateFormat,
            base.clone().key("end_date"),
        ));
    }

    match (start, end) {
        (None, Some(_)) => violations.push(Violation::new(
            ViolationKind::MissingRequiredField,
            base.clone().key("start_date"),
        )),
        (Some(Ok(start)), Some(Ok(end))) if starts_after(start, end) => {
            violations.push(Violation::new(
                ViolationKind::InvalidDateOrder,
                base.clone().key("end_date"),
            ))
        }
        _ => {}
    }
}
