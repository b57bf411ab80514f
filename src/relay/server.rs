use std::sync::Arc;

use anyhow::Context as _;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::foundation::error::ReelResult;
use crate::relay::config::RelayConfig;
use crate::relay::graph::{
    DEFAULT_CONTENT_TYPE, DEFAULT_FILE_NAME, GraphForwarder, UploadForwarder, UpstreamError,
    VideoUpload,
};

/// Route that accepts uploads.
pub const UPLOAD_PATH: &str = "/api/upload";
/// Liveness route.
pub const HEALTH_PATH: &str = "/health";

/// A failed relay request, rendered as `{"error": message}`.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// `pageId`, `accessToken` or `file` was absent or empty. Responds 400.
    #[error("Missing required fields")]
    MissingFields,
    /// The remote API rejected the upload or could not be reached. Responds 500.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    /// Anything else, e.g. an unreadable form. Responds 500.
    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingFields => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) | RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Clone)]
struct RelayState {
    forwarder: Arc<dyn UploadForwarder>,
}

/// Relay routes: `POST /api/upload` and `GET /health`.
///
/// Request bodies up to `max_upload_bytes` are accepted.
pub fn router(forwarder: Arc<dyn UploadForwarder>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(UPLOAD_PATH, post(upload))
        .route(HEALTH_PATH, get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(RelayState { forwarder })
}

/// Serve the relay on `config.bind` until Ctrl-C, forwarding to the configured remote API.
pub async fn serve(config: RelayConfig) -> ReelResult<()> {
    config.validate()?;
    let forwarder = Arc::new(GraphForwarder::new(config.graph_base_url.clone()));
    let app = router(forwarder, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("bind relay on {}", config.bind))?;
    tracing::info!(
        addr = %config.bind,
        upstream = %config.graph_base_url,
        "upload relay listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await
        .context("relay server")?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn upload(
    State(state): State<RelayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, RelayError> {
    let multipart = multipart.map_err(|e| RelayError::Internal(e.body_text()))?;
    let upload = read_upload(multipart).await?;
    tracing::info!(
        page_id = %upload.page_id,
        bytes = upload.bytes.len(),
        file_name = %upload.file_name,
        "forwarding upload"
    );
    let body = state.forwarder.forward(upload).await?;
    Ok(Json(body))
}

#[derive(Default)]
struct UploadForm {
    page_id: Option<String>,
    access_token: Option<String>,
    description: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Option<Vec<u8>>,
}

async fn read_upload(mut multipart: Multipart) -> Result<VideoUpload, RelayError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RelayError::Internal(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pageId" => form.page_id = Some(field_text(field).await?),
            "accessToken" => form.access_token = Some(field_text(field).await?),
            "description" => form.description = Some(field_text(field).await?),
            "file" => {
                form.file_name = field.file_name().map(str::to_string);
                form.content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| RelayError::Internal(e.body_text()))?;
                form.bytes = Some(bytes.to_vec());
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }
    form.into_upload()
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, RelayError> {
    field
        .text()
        .await
        .map_err(|e| RelayError::Internal(e.body_text()))
}

impl UploadForm {
    fn into_upload(self) -> Result<VideoUpload, RelayError> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        let (Some(page_id), Some(access_token), Some(bytes)) = (
            non_empty(self.page_id),
            non_empty(self.access_token),
            self.bytes.filter(|b| !b.is_empty()),
        ) else {
            return Err(RelayError::MissingFields);
        };

        Ok(VideoUpload {
            page_id,
            access_token,
            description: non_empty(self.description),
            file_name: non_empty(self.file_name).unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
            content_type: non_empty(self.content_type)
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            bytes,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/relay/server.rs"]
mod tests;
