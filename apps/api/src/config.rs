use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_RENDER_COMMAND: &str = "python -m rendercv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// RenderCV command line on this host.
    Local,
    /// Remote RenderCV-compatible HTTP service.
    Api,
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is malformed or `RENDER_API_URL` is missing in api mode.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub render_mode: RenderMode,
    pub rendercv_command: String,
    pub render_api_url: Option<String>,
    pub render_timeout: Duration,
    pub session_ttl: chrono::Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let render_mode = match lookup("RENDER_MODE").as_deref().map(str::trim) {
            None | Some("") | Some("local") => RenderMode::Local,
            Some("api") => RenderMode::Api,
            Some(other) => bail!("RENDER_MODE must be 'local' or 'api', got '{other}'"),
        };

        let render_api_url = match render_mode {
            RenderMode::Api => Some(require(&lookup, "RENDER_API_URL")?),
            RenderMode::Local => lookup("RENDER_API_URL"),
        };

        let rendercv_command =
            lookup("RENDERCV_COMMAND").unwrap_or_else(|| DEFAULT_RENDER_COMMAND.to_string());
        if rendercv_command.trim().is_empty() {
            bail!("RENDERCV_COMMAND must not be empty");
        }

        let timeout_secs: u64 = parse_or(&lookup, "RENDER_TIMEOUT_SECS", 60)?;
        if timeout_secs == 0 {
            bail!("RENDER_TIMEOUT_SECS must be greater than zero");
        }
        let ttl_minutes: i64 = parse_or(&lookup, "SESSION_TTL_MINUTES", 120)?;
        if ttl_minutes <= 0 {
            bail!("SESSION_TTL_MINUTES must be greater than zero");
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            render_mode,
            rendercv_command,
            render_api_url,
            render_timeout: Duration::from_secs(timeout_secs),
            session_ttl: chrono::Duration::minutes(ttl_minutes),
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
