use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::render::{RenderError, RenderedPdf, Renderer};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    yaml: &'a str,
}

/// JSON reply from services that store the PDF and hand back a link.
#[derive(Debug, Deserialize)]
struct RenderLink {
    pdf_url: Option<String>,
}

/// Posts YAML to `{api_url}/render`. Accepts either a PDF body or `{"pdf_url": …}`.
#[derive(Clone)]
pub struct RemoteApiRenderer {
    client: Client,
    api_url: String,
    timeout: Duration,
}

impl RemoteApiRenderer {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, RenderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn request_error(&self, err: reqwest::Error) -> RenderError {
        if err.is_timeout() {
            RenderError::Timeout {
                after: self.timeout,
            }
        } else if err.is_connect() {
            RenderError::EngineUnavailable(format!(
                "cannot connect to render API at {}",
                self.api_url
            ))
        } else {
            RenderError::Http(err)
        }
    }

    async fn download(&self, url: &str) -> Result<RenderedPdf, RenderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenderError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await.map_err(|e| self.request_error(e))?;
        let file_name = url
            .rsplit('/')
            .next()
            .filter(|segment| segment.ends_with(".pdf"))
            .map(str::to_string);
        Ok(RenderedPdf { bytes, file_name })
    }
}

#[async_trait]
impl Renderer for RemoteApiRenderer {
    async fn render(&self, yaml: &str) -> Result<RenderedPdf, RenderError> {
        let response = self
            .client
            .post(format!("{}/render", self.api_url))
            .json(&RenderRequest { yaml })
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "render API rejected document");
            return Err(RenderError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let is_pdf = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/pdf"));

        if is_pdf {
            let bytes = response.bytes().await.map_err(|e| self.request_error(e))?;
            info!(bytes = bytes.len(), "render API returned PDF");
            return Ok(RenderedPdf {
                bytes,
                file_name: None,
            });
        }

        let body = response.text().await.map_err(|e| self.request_error(e))?;
        match serde_json::from_str::<RenderLink>(&body) {
            Ok(RenderLink { pdf_url: Some(url) }) => {
                info!(%url, "render API returned PDF link");
                self.download(&url).await
            }
            _ => Err(RenderError::Remote {
                status: status.as_u16(),
                body,
            }),
        }
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.api_url))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn backend(&self) -> &'static str {
        "api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{header, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    /// Binds an ephemeral port, builds the router with its base URL, serves it.
    async fn serve(build: impl FnOnce(String) -> Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let router = build(base.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        base
    }

    fn renderer(base: &str) -> RemoteApiRenderer {
        RemoteApiRenderer::new(base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_pdf_body_is_returned() {
        let base = serve(|_| {
            Router::new().route(
                "/render",
                post(|Json(body): Json<Value>| async move {
                    let yaml = body["yaml"].as_str().unwrap_or_default().to_string();
                    (
                        [(header::CONTENT_TYPE, "application/pdf")],
                        format!("%PDF {yaml}").into_bytes(),
                    )
                }),
            )
        })
        .await;

        let pdf = renderer(&format!("{base}/")).render("cv:\n  name: X\n").await.unwrap();
        assert_eq!(&pdf.bytes[..], b"%PDF cv:\n  name: X\n");
    }

    #[tokio::test]
    async fn test_pdf_url_is_followed() {
        let base = serve(|base| {
            Router::new()
                .route(
                    "/render",
                    post(move || {
                        let link = format!("{base}/files/X_CV.pdf");
                        async move { Json(json!({ "pdf_url": link })) }
                    }),
                )
                .route("/files/X_CV.pdf", get(|| async { "%PDF linked" }))
        })
        .await;

        let pdf = renderer(&base).render("cv: {}\n").await.unwrap();
        assert_eq!(&pdf.bytes[..], b"%PDF linked");
        assert_eq!(pdf.file_name.as_deref(), Some("X_CV.pdf"));
    }

    #[tokio::test]
    async fn test_error_status_surfaces_body() {
        let base = serve(|_| {
            Router::new().route(
                "/render",
                post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "cv.name: field required") }),
            )
        })
        .await;

        match renderer(&base).render("cv: {}\n").await {
            Err(RenderError::Remote { status, body }) => {
                assert_eq!(status, 422);
                assert_eq!(body, "cv.name: field required");
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unexpected_json_is_remote_error() {
        let base = serve(|_| {
            Router::new().route("/render", post(|| async { Json(json!({ "status": "queued" })) }))
        })
        .await;
        assert!(matches!(
            renderer(&base).render("cv: {}\n").await,
            Err(RenderError::Remote { status: 200, .. })
        ));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let base = serve(|_| {
            Router::new().route(
                "/render",
                post(|| async {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    "late"
                }),
            )
        })
        .await;
        let slow = RemoteApiRenderer::new(&base, Duration::from_millis(200)).unwrap();
        assert!(matches!(
            slow.render("cv: {}\n").await,
            Err(RenderError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_engine_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let unreachable = renderer(&base);
        assert!(matches!(
            unreachable.render("cv: {}\n").await,
            Err(RenderError::EngineUnavailable(_))
        ));
        assert!(!unreachable.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check() {
        let healthy = serve(|_| Router::new().route("/health", get(|| async { "ok" }))).await;
        assert!(renderer(&healthy).health_check().await);

        let missing = serve(|_| Router::new()).await;
        assert!(!renderer(&missing).health_check().await);
        assert_eq!(renderer(&missing).backend(), "api");
    }
}
