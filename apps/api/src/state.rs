use std::sync::Arc;

use crate::config::Config;
use crate::render::Renderer;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Pluggable render backend. Local CLI by default; swap via RENDER_MODE.
    pub renderer: Arc<dyn Renderer>,
    pub config: Config,
}
