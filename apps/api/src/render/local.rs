use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::render::{RenderError, RenderedPdf, Renderer};

const INPUT_FILE: &str = "cv.yaml";
/// Directory RenderCV writes into, relative to its working directory.
const OUTPUT_DIR: &str = "rendercv_output";
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs `<program> <args…> render cv.yaml` inside a fresh temp dir.
#[derive(Debug, Clone)]
pub struct LocalCliRenderer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl LocalCliRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Splits a command line such as `python -m rendercv` on whitespace.
    pub fn from_command_line(line: &str, timeout: Duration) -> Result<Self, RenderError> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| RenderError::EngineUnavailable("render command is empty".to_string()))?;
        Ok(Self::new(program, parts.collect(), timeout))
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }

    fn spawn_error(&self, err: io::Error) -> RenderError {
        if err.kind() == io::ErrorKind::NotFound {
            RenderError::EngineUnavailable(format!("'{}' not found on PATH", self.program))
        } else {
            RenderError::Io(err)
        }
    }
}

#[async_trait]
impl Renderer for LocalCliRenderer {
    async fn render(&self, yaml: &str) -> Result<RenderedPdf, RenderError> {
        // Removed on drop, including every early return below.
        let workdir = tempfile::Builder::new().prefix("rendercv_").tempdir()?;
        let yaml_path = workdir.path().join(INPUT_FILE);
        tokio::fs::write(&yaml_path, yaml).await?;

        let mut command = self.command();
        command
            .arg("render")
            .arg(&yaml_path)
            .current_dir(workdir.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(program = %self.program, dir = %workdir.path().display(), "spawning render engine");
        let child = command.spawn().map_err(|e| self.spawn_error(e))?;

        // Dropping the wait future drops the child, which kills it.
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(after_secs = self.timeout.as_secs(), "render engine timed out, killed");
                return Err(RenderError::Timeout {
                    after: self.timeout,
                });
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "render engine failed");
            return Err(RenderError::Failed {
                exit_code: output.status.code(),
                stderr,
                stdout,
            });
        }

        let pdf_path = find_pdf(&workdir.path().join(OUTPUT_DIR))
            .await?
            .ok_or(RenderError::MissingOutput { stderr })?;
        let bytes = tokio::fs::read(&pdf_path).await?;
        let file_name = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());

        info!(bytes = bytes.len(), file = ?file_name, "render complete");
        Ok(RenderedPdf {
            bytes: Bytes::from(bytes),
            file_name,
        })
    }

    async fn health_check(&self) -> bool {
        let mut command = self.command();
        command
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        match timeout(HEALTH_TIMEOUT, command.status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                debug!(error = %e, "render engine health check failed to spawn");
                false
            }
            Err(_) => false,
        }
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

/// First `*.pdf` in `dir` by file name; `None` when the dir is missing or has none.
async fn find_pdf(dir: &Path) -> Result<Option<PathBuf>, RenderError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut pdfs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs.into_iter().next())
}
