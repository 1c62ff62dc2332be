use axum::{extract::Path, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::presets::{find_preset, RecommendedSection, TemplatePreset, PRESETS};
use crate::models::schema::{entry_type_schemas, EntryTypeSchema};

#[derive(Debug, Serialize)]
pub struct TemplateView {
    #[serde(flatten)]
    pub preset: &'static TemplatePreset,
    /// Recommended sections with the entry type suggested for each.
    pub sections: Vec<RecommendedSection>,
}

impl From<&'static TemplatePreset> for TemplateView {
    fn from(preset: &'static TemplatePreset) -> Self {
        Self {
            preset,
            sections: preset.sections(),
        }
    }
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<TemplateView>> {
    Json(PRESETS.iter().map(TemplateView::from).collect())
}

/// GET /api/v1/templates/:id
pub async fn handle_get_template(Path(id): Path<String>) -> Result<Json<TemplateView>, AppError> {
    find_preset(&id)
        .map(|preset| Json(preset.into()))
        .ok_or_else(|| AppError::NotFound(format!("Template '{id}' not found")))
}

/// GET /api/v1/entry-types
pub async fn handle_entry_types() -> Json<Vec<EntryTypeSchema>> {
    Json(entry_type_schemas())
}
