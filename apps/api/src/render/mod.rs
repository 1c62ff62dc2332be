//! Render invoker — hands a serialized YAML document to RenderCV and returns the PDF.
//!
//! No layout or typesetting happens here. Two backends:
//! - `LocalCliRenderer`: runs the RenderCV command line in a scoped temp dir.
//! - `RemoteApiRenderer`: posts the YAML to a RenderCV-compatible HTTP service.
//!
//! `AppState` holds an `Arc<dyn Renderer>`, chosen at startup from `RENDER_MODE`.

pub mod local;
pub mod remote;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use local::LocalCliRenderer;
pub use remote::RemoteApiRenderer;

// ────────────────────────────────────────────────────────────────────────────
// Output and error types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Bytes,
    /// Name the engine gave the file, when known.
    pub file_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    /// Engine ran and exited non-zero. Diagnostics are kept verbatim.
    #[error("render engine exited with {}", exit_label(.exit_code))]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
        stdout: String,
    },

    #[error("render timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },

    #[error("render engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("render engine produced no PDF")]
    MissingOutput { stderr: String },

    #[error("render API returned status {status}")]
    Remote { status: u16, body: String },

    #[error("render API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("render I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, yaml: &str) -> Result<RenderedPdf, RenderError>;

    /// Whether the engine is reachable. Never errors.
    async fn health_check(&self) -> bool;

    /// "local" | "api" — reported by the health endpoint.
    fn backend(&self) -> &'static str;
}
