// Pre-serialization checks: required fields, date tokens, section type consistency.
// Pure functions of the Document; violations are structured so callers can place
// them next to the offending field.

pub mod dates;
pub mod validator;

pub use validator::{validate_document, FieldPath, Violation, ViolationKind};
