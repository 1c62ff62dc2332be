// Per-user editing sessions: an in-memory store of owned Documents and the
// HTTP handlers that drive edits, validation, YAML export and PDF rendering.

pub mod handlers;
pub mod store;

pub use store::SessionStore;
