use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::presets::find_preset;
use crate::models::{Design, Document, Entry, Identity, Locale, ModelError, Settings};
use crate::serializer::serialize_document;
use crate::session::store::Session;
use crate::state::AppState;
use crate::validation::{validate_document, Violation};

// ────────────────────────────────────────────────────────────────────────────
// Request / response bodies
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub template: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub template: Option<String>,
    pub document: Document,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.id,
            template: session.template,
            document: session.document,
            created_at: session.created_at,
            last_active: session.last_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntryIndexResponse {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct ExtraValue {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

#[derive(Debug, Default, Deserialize)]
pub struct YamlQuery {
    #[serde(default)]
    pub download: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

/// Applies a fallible edit to the session's document and returns the result.
async fn edit<T>(
    state: &AppState,
    id: Uuid,
    change: impl FnOnce(&mut Document) -> Result<T, ModelError>,
) -> Result<T, AppError> {
    let result = state
        .sessions
        .update(id, change)
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(result?)
}

async fn snapshot(state: &AppState, id: Uuid) -> Result<Document, AppError> {
    state
        .sessions
        .get(id)
        .await
        .map(|s| s.document)
        .ok_or_else(|| session_not_found(id))
}

fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{file_name}\"")
}

// ────────────────────────────────────────────────────────────────────────────
// Session lifecycle
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let preset = match req.template.as_deref() {
        Some(id) => Some(
            find_preset(id).ok_or_else(|| AppError::BadRequest(format!("Unknown template '{id}'")))?,
        ),
        None => None,
    };
    let session = state.sessions.create(preset).await;
    info!(session_id = %session.id, template = ?session.template, "session created");
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.get(id).await.ok_or_else(|| session_not_found(id))?;
    Ok(Json(session.into()))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(id).await {
        return Err(session_not_found(id));
    }
    info!(session_id = %id, "session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.reset(id).await.ok_or_else(|| session_not_found(id))?;
    Ok(Json(session.into()))
}

// ────────────────────────────────────────────────────────────────────────────
// Whole-block edits
// ────────────────────────────────────────────────────────────────────────────

/// PUT /api/v1/sessions/:id/identity
pub async fn handle_put_identity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(identity): Json<Identity>,
) -> Result<Json<Document>, AppError> {
    let document = edit(&state, id, |doc| {
        doc.identity = identity;
        Ok(doc.clone())
    })
    .await?;
    Ok(Json(document))
}

/// PUT /api/v1/sessions/:id/design
pub async fn handle_put_design(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(design): Json<Design>,
) -> Result<Json<Document>, AppError> {
    let document = edit(&state, id, |doc| {
        doc.design = design;
        Ok(doc.clone())
    })
    .await?;
    Ok(Json(document))
}

/// PUT /api/v1/sessions/:id/locale
pub async fn handle_put_locale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(locale): Json<Locale>,
) -> Result<Json<Document>, AppError> {
    let document = edit(&state, id, |doc| {
        doc.locale = locale;
        Ok(doc.clone())
    })
    .await?;
    Ok(Json(document))
}

/// PUT /api/v1/sessions/:id/settings
pub async fn handle_put_settings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(settings): Json<Settings>,
) -> Result<Json<Document>, AppError> {
    let document = edit(&state, id, |doc| {
        doc.settings = settings;
        Ok(doc.clone())
    })
    .await?;
    Ok(Json(document))
}

// ────────────────────────────────────────────────────────────────────────────
// Sections and entries
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/sections/:section/entries
pub async fn handle_add_entry(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
    Json(entry): Json<Entry>,
) -> Result<(StatusCode, Json<EntryIndexResponse>), AppError> {
    let title = entry.data.display_title().map(str::to_string);
    let index = edit(&state, id, |doc| doc.add_entry(&section, entry)).await?;
    debug!(session_id = %id, %section, index, title = ?title, "entry added");
    Ok((StatusCode::CREATED, Json(EntryIndexResponse { index })))
}

/// PUT /api/v1/sessions/:id/sections/:section/entries/:index
pub async fn handle_replace_entry(
    State(state): State<AppState>,
    Path((id, section, index)): Path<(Uuid, String, usize)>,
    Json(entry): Json<Entry>,
) -> Result<Json<Document>, AppError> {
    let document = edit(&state, id, |doc| {
        doc.replace_entry(&section, index, entry)?;
        Ok(doc.clone())
    })
    .await?;
    Ok(Json(document))
}

/// DELETE /api/v1/sessions/:id/sections/:section/entries/:index
pub async fn handle_delete_entry(
    State(state): State<AppState>,
    Path((id, section, index)): Path<(Uuid, String, usize)>,
) -> Result<StatusCode, AppError> {
    edit(&state, id, |doc| doc.remove_entry(&section, index)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/sections/:section/entries/:index/extras/:key
pub async fn handle_put_extra(
    State(state): State<AppState>,
    Path((id, section, index, key)): Path<(Uuid, String, usize, String)>,
    Json(body): Json<ExtraValue>,
) -> Result<Json<Document>, AppError> {
    let document = edit(&state, id, |doc| {
        doc.set_extra(&section, index, &key, body.value)?;
        Ok(doc.clone())
    })
    .await?;
    Ok(Json(document))
}

/// DELETE /api/v1/sessions/:id/sections/:section
pub async fn handle_delete_section(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
) -> Result<StatusCode, AppError> {
    edit(&state, id, |doc| doc.remove_section(&section)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Validation, YAML, PDF
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/sessions/:id/validation
pub async fn handle_validate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ValidationResponse>, AppError> {
    let document = snapshot(&state, id).await?;
    let violations = validate_document(&document);
    Ok(Json(ValidationResponse {
        valid: violations.is_empty(),
        violations,
    }))
}

/// GET /api/v1/sessions/:id/yaml
pub async fn handle_get_yaml(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<YamlQuery>,
) -> Result<impl IntoResponse, AppError> {
    let document = snapshot(&state, id).await?;
    let yaml = serialize_document(&document)?;

    let mut response =
        ([(header::CONTENT_TYPE, "application/yaml; charset=utf-8")], yaml).into_response();
    if query.download {
        let file_name = format!("{}.yaml", document.download_stem());
        let disposition = HeaderValue::from_str(&attachment(&file_name))
            .map_err(|e| AppError::Internal(e.into()))?;
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, disposition);
    }
    Ok(response)
}

/// POST /api/v1/sessions/:id/render
/// The session lock is released before the engine runs.
pub async fn handle_render(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let document = snapshot(&state, id).await?;
    let yaml = serialize_document(&document)?;

    info!(session_id = %id, backend = state.renderer.backend(), "rendering PDF");
    let pdf = state.renderer.render(&yaml).await?;

    let file_name = format!("{}.pdf", document.download_stem());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&file_name)),
        ],
        pdf.bytes,
    ))
}
