use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::ModelError;
use crate::render::RenderError;
use crate::serializer::SerializationError;
use crate::validation::Violation;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Document has {} validation violation(s)", .0.len())]
    Validation(Vec<Violation>),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Serialization error: {0}")]
    Serialization(SerializationError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Validator refusals are a client problem; the rest are ours.
impl From<SerializationError> for AppError {
    fn from(err: SerializationError) -> Self {
        match err {
            SerializationError::InvalidDocument(violations) => AppError::Validation(violations),
            other => AppError::Serialization(other),
        }
    }
}

struct ErrorBody {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<Value>,
    retryable: bool,
}

impl ErrorBody {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

fn model_body(err: &ModelError) -> ErrorBody {
    let message = err.to_string();
    match err {
        ModelError::InconsistentEntryType {
            section,
            expected,
            found,
        } => ErrorBody::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "INCONSISTENT_ENTRY_TYPE",
            message,
        )
        .details(json!({ "section": section, "expected": expected, "found": found })),
        ModelError::ExtraKeyCollision { key, kind } => ErrorBody::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "EXTRA_FIELD_COLLISION",
            message,
        )
        .details(json!({ "key": key, "entry_type": kind })),
        ModelError::ExtrasNotSupported => ErrorBody::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "EXTRAS_NOT_SUPPORTED",
            message,
        ),
        ModelError::BlankFieldName => ErrorBody::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_FIELD_NAME",
            message,
        ),
        ModelError::SectionNotFound(_) | ModelError::EntryNotFound { .. } => {
            ErrorBody::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
        }
    }
}

fn render_body(err: &RenderError) -> ErrorBody {
    match err {
        RenderError::Failed {
            exit_code,
            stderr,
            stdout,
        } => {
            tracing::warn!("Render engine failed: {err}");
            ErrorBody::new(StatusCode::BAD_GATEWAY, "RENDER_FAILED", err.to_string()).details(
                json!({ "exit_code": exit_code, "stderr": stderr, "stdout": stdout }),
            )
        }
        RenderError::Timeout { after } => {
            tracing::warn!("Render timed out after {}s", after.as_secs());
            ErrorBody::new(StatusCode::GATEWAY_TIMEOUT, "RENDER_TIMEOUT", err.to_string())
                .details(json!({ "timeout_secs": after.as_secs() }))
                .retryable()
        }
        RenderError::EngineUnavailable(msg) => {
            tracing::error!("Render engine unavailable: {msg}");
            ErrorBody::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "RENDER_ENGINE_UNAVAILABLE",
                err.to_string(),
            )
        }
        RenderError::MissingOutput { stderr } => {
            tracing::error!("Render engine produced no PDF");
            ErrorBody::new(StatusCode::BAD_GATEWAY, "RENDER_NO_OUTPUT", err.to_string())
                .details(json!({ "stderr": stderr }))
        }
        RenderError::Remote { status, body } => {
            tracing::warn!("Render API returned status {status}");
            ErrorBody::new(StatusCode::BAD_GATEWAY, "RENDER_API_ERROR", err.to_string())
                .details(json!({ "status": status, "body": body }))
        }
        RenderError::Http(e) => {
            tracing::error!("Render API request error: {e}");
            ErrorBody::new(
                StatusCode::BAD_GATEWAY,
                "RENDER_API_ERROR",
                "The render service could not be reached",
            )
        }
        RenderError::Io(e) => {
            tracing::error!("Render I/O error: {e}");
            ErrorBody::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred",
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            AppError::NotFound(msg) => ErrorBody::new(StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => {
                ErrorBody::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::Validation(violations) => ErrorBody::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                self.to_string(),
            )
            .details(json!(violations)),
            AppError::Model(e) => model_body(e),
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {e}");
                ErrorBody::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERIALIZATION_ERROR",
                    "The document could not be serialized",
                )
            }
            AppError::Render(e) => render_body(e),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                ErrorBody::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred",
                )
            }
        };

        let mut error = json!({
            "code": body.code,
            "message": body.message,
        });
        if let Some(details) = body.details {
            error["details"] = details;
        }
        if body.retryable {
            error["retryable"] = Value::Bool(true);
        }

        (body.status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;
    use crate::validation::{FieldPath, ViolationKind};
    use std::time::Duration;

    async fn parts(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_document_maps_to_validation_error() {
        let err: AppError = SerializationError::InvalidDocument(vec![Violation {
            kind: ViolationKind::MissingRequiredField,
            location: FieldPath::field("name"),
        }])
        .into();
        let (status, body) = parts(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["error"]["details"],
            json!([{ "kind": "missing_required_field", "location": ["name"] }])
        );
    }

    #[tokio::test]
    async fn test_serialization_error_is_generic_500() {
        let err: AppError = SerializationError::DuplicateSection("skills".to_string()).into();
        let (status, body) = parts(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "SERIALIZATION_ERROR");
        assert!(!body["error"]["message"].as_str().unwrap().contains("skills"));
    }

    #[tokio::test]
    async fn test_model_errors() {
        let (status, body) = parts(AppError::Model(ModelError::InconsistentEntryType {
            section: "education".to_string(),
            expected: EntryKind::Education,
            found: EntryKind::Experience,
        }))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INCONSISTENT_ENTRY_TYPE");
        assert_eq!(body["error"]["details"]["found"], "experience");

        let (status, _) = parts(AppError::Model(ModelError::EntryNotFound {
            section: "education".to_string(),
            index: 4,
        }))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_render_failure_carries_diagnostics_verbatim() {
        let (status, body) = parts(AppError::Render(RenderError::Failed {
            exit_code: Some(1),
            stderr: "Traceback:\n  line 1".to_string(),
            stdout: String::new(),
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "RENDER_FAILED");
        assert_eq!(body["error"]["details"]["exit_code"], 1);
        assert_eq!(body["error"]["details"]["stderr"], "Traceback:\n  line 1");
        assert!(body["error"].get("retryable").is_none());
    }

    #[tokio::test]
    async fn test_render_timeout_is_retryable() {
        let (status, body) = parts(AppError::Render(RenderError::Timeout {
            after: Duration::from_secs(60),
        }))
        .await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"]["code"], "RENDER_TIMEOUT");
        assert_eq!(body["error"]["retryable"], true);
    }

    #[tokio::test]
    async fn test_engine_unavailable_is_503() {
        let (status, body) = parts(AppError::Render(RenderError::EngineUnavailable(
            "'python' not found on PATH".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "RENDER_ENGINE_UNAVAILABLE");
    }
}
