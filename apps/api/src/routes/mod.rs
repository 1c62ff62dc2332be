pub mod catalog;
pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/renderer/health",
            get(health::renderer_health_handler),
        )
        // Catalog
        .route("/api/v1/templates", get(catalog::handle_list_templates))
        .route("/api/v1/templates/:id", get(catalog::handle_get_template))
        .route("/api/v1/entry-types", get(catalog::handle_entry_types))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/reset",
            post(handlers::handle_reset_session),
        )
        .route(
            "/api/v1/sessions/:id/identity",
            put(handlers::handle_put_identity),
        )
        .route("/api/v1/sessions/:id/design", put(handlers::handle_put_design))
        .route("/api/v1/sessions/:id/locale", put(handlers::handle_put_locale))
        .route(
            "/api/v1/sessions/:id/settings",
            put(handlers::handle_put_settings),
        )
        // Sections and entries
        .route(
            "/api/v1/sessions/:id/sections/:section",
            axum::routing::delete(handlers::handle_delete_section),
        )
        .route(
            "/api/v1/sessions/:id/sections/:section/entries",
            post(handlers::handle_add_entry),
        )
        .route(
            "/api/v1/sessions/:id/sections/:section/entries/:index",
            put(handlers::handle_replace_entry).delete(handlers::handle_delete_entry),
        )
        .route(
            "/api/v1/sessions/:id/sections/:section/entries/:index/extras/:key",
            put(handlers::handle_put_extra),
        )
        // Output
        .route(
            "/api/v1/sessions/:id/validation",
            get(handlers::handle_validate),
        )
        .route("/api/v1/sessions/:id/yaml", get(handlers::handle_get_yaml))
        .route("/api/v1/sessions/:id/render", post(handlers::handle_render))
        .with_state(state)
}
