mod config;
mod errors;
mod models;
mod render;
mod routes;
mod serializer;
mod session;
mod state;
mod validation;

use anyhow::{Context, Result};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, RenderMode};
use crate::render::{LocalCliRenderer, RemoteApiRenderer, Renderer};
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Builder API v{}", env!("CARGO_PKG_VERSION"));

    let renderer = build_renderer(&config)?;
    if renderer.health_check().await {
        info!("Render engine available (backend: {})", renderer.backend());
    } else {
        tracing::warn!(
            "Render engine not responding (backend: {}); PDF rendering will fail until it is",
            renderer.backend()
        );
    }

    let sessions = SessionStore::new();
    spawn_session_sweeper(sessions.clone(), config.session_ttl);
    info!(
        "Session store initialized (idle TTL: {} min)",
        config.session_ttl.num_minutes()
    );

    let state = AppState {
        sessions,
        renderer,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the render backend from RENDER_MODE.
fn build_renderer(config: &Config) -> Result<Arc<dyn Renderer>> {
    match config.render_mode {
        RenderMode::Local => {
            let renderer =
                LocalCliRenderer::from_command_line(&config.rendercv_command, config.render_timeout)?;
            info!(
                "Local renderer: '{}' (timeout {}s)",
                config.rendercv_command,
                config.render_timeout.as_secs()
            );
            Ok(Arc::new(renderer))
        }
        RenderMode::Api => {
            let url = config
                .render_api_url
                .as_deref()
                .context("RENDER_API_URL is required when RENDER_MODE=api")?;
            let renderer = RemoteApiRenderer::new(url, config.render_timeout)?;
            info!("Remote renderer: {url}");
            Ok(Arc::new(renderer))
        }
    }
}

/// Purges idle sessions once a minute.
fn spawn_session_sweeper(sessions: SessionStore, ttl: chrono::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired(ttl, Utc::now()).await;
            if purged > 0 {
                info!("Purged {purged} idle session(s)");
            }
        }
    });
}
