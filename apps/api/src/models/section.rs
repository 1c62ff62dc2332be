use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::entry::{Entry, EntryKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("inconsistent_entry_type: section '{section}' holds {expected} entries, got {found}")]
    InconsistentEntryType {
        section: String,
        expected: EntryKind,
        found: EntryKind,
    },

    #[error("extra_field_collision: '{key}' is a modeled field of {kind} entries")]
    ExtraKeyCollision { key: String, kind: EntryKind },

    #[error("extra fields are not supported on text entries")]
    ExtrasNotSupported,

    #[error("field name must not be blank")]
    BlankFieldName,

    #[error("section '{0}' not found")]
    SectionNotFound(String),

    #[error("entry {index} not found in section '{section}'")]
    EntryNotFound { section: String, index: usize },
}

/// A named, type-homogeneous group of entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub name: String,
    /// Fixed by the first entry added.
    #[serde(default)]
    pub entry_type: Option<EntryKind>,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_type: None,
            entries: Vec::new(),
        }
    }

    /// The kind every entry must match: the declared type, else the first entry's.
    pub fn established_kind(&self) -> Option<EntryKind> {
        self.entry_type
            .or_else(|| self.entries.first().map(Entry::kind))
    }

    /// Appends an entry, returning its index.
    pub fn add_entry(&mut self, entry: Entry) -> Result<usize, ModelError> {
        self.check_entry(&entry)?;
        if self.entry_type.is_none() {
            self.entry_type = Some(entry.kind());
        }
        self.entries.push(entry);
        Ok(self.entries.len() - 1)
    }

    pub fn replace_entry(&mut self, index: usize, entry: Entry) -> Result<(), ModelError> {
        if index >= self.entries.len() {
            return Err(self.entry_not_found(index));
        }
        // A lone entry may change type; the section type follows it.
        if self.entries.len() == 1 {
            check_extras(&entry)?;
            self.entry_type = Some(entry.kind());
        } else {
            self.check_entry(&entry)?;
        }
        self.entries[index] = entry;
        Ok(())
    }

    pub fn remove_entry(&mut self, index: usize) -> Result<Entry, ModelError> {
        if index >= self.entries.len() {
            return Err(self.entry_not_found(index));
        }
        let removed = self.entries.remove(index);
        if self.entries.is_empty() {
            self.entry_type = None;
        }
        Ok(removed)
    }

    pub fn set_extra(
        &mut self,
        index: usize,
        key: &str,
        value: String,
    ) -> Result<(), ModelError> {
        if key.trim().is_empty() {
            return Err(ModelError::BlankFieldName);
        }
        let not_found = self.entry_not_found(index);
        let entry = self.entries.get_mut(index).ok_or(not_found)?;
        let kind = entry.kind();
        if kind == EntryKind::Text {
            return Err(ModelError::ExtrasNotSupported);
        }
        if kind.is_modeled_field(key) {
            return Err(ModelError::ExtraKeyCollision {
                key: key.to_string(),
                kind,
            });
        }
        entry.extras.insert(key.to_string(), value);
        Ok(())
    }

    fn check_entry(&self, entry: &Entry) -> Result<(), ModelError> {
        if let Some(expected) = self.established_kind() {
            if expected != entry.kind() {
                return Err(ModelError::InconsistentEntryType {
                    section: self.name.clone(),
                    expected,
                    found: entry.kind(),
                });
            }
        }
        check_extras(entry)
    }

    fn entry_not_found(&self, index: usize) -> ModelError {
        ModelError::EntryNotFound {
            section: self.name.clone(),
            index,
        }
    }
}

fn check_extras(entry: &Entry) -> Result<(), ModelError> {
    if entry.extras.is_empty() {
        return Ok(());
    }
    if entry.kind() == EntryKind::Text {
        return Err(ModelError::ExtrasNotSupported);
    }
    if entry.extras.keys().any(|k| k.trim().is_empty()) {
        return Err(ModelError::BlankFieldName);
    }
    match entry.colliding_extra_key() {
        Some(key) => Err(ModelError::ExtraKeyCollision {
            key: key.to_string(),
            kind: entry.kind(),
        }),
        None => Ok(()),
    }
}
