pub mod document;
pub mod entry;
pub mod presets;
pub mod schema;
pub mod section;

pub use document::{Design, Document, Identity, Locale, Settings};
pub use entry::{Entry, EntryData, EntryKind};
pub use section::{ModelError, Section};
