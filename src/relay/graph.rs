use reqwest::multipart;

/// Default name for an uploaded file part that arrived without one.
pub const DEFAULT_FILE_NAME: &str = "video.mp4";
/// Default content type for an uploaded file part that arrived without one.
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

/// One video to publish to a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoUpload {
    /// Destination page id.
    pub page_id: String,
    /// Token authorizing the upload.
    pub access_token: String,
    /// Optional post text.
    pub description: Option<String>,
    /// File name sent with the video part.
    pub file_name: String,
    /// MIME type sent with the video part.
    pub content_type: String,
    /// Encoded video.
    pub bytes: Vec<u8>,
}

/// Why the remote API did not accept an upload.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The API answered with an error object or a failure status.
    #[error("{0}")]
    Remote(String),
    /// The request never produced a response.
    #[error("upstream request failed: {0}")]
    Transport(String),
    /// The response body was not JSON.
    #[error("upstream returned an unreadable response: {0}")]
    Decode(String),
}

/// Delivers a [`VideoUpload`] somewhere and returns the receiver's JSON reply.
#[async_trait::async_trait]
pub trait UploadForwarder: Send + Sync {
    /// Forward `upload`; `Ok` carries the remote JSON unchanged.
    async fn forward(&self, upload: VideoUpload) -> Result<serde_json::Value, UpstreamError>;
}

/// Forwards uploads to `{base_url}/{page_id}/videos` as a multipart form.
#[derive(Clone, Debug)]
pub struct GraphForwarder {
    base_url: String,
    http: reqwest::Client,
}

impl GraphForwarder {
    /// Forwarder targeting `base_url` (e.g. `https://graph-video.facebook.com/v19.0`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Full upload URL for `page_id`.
    pub fn videos_url(&self, page_id: &str) -> String {
        format!("{}/{}/videos", self.base_url.trim_end_matches('/'), page_id)
    }
}

#[async_trait::async_trait]
impl UploadForwarder for GraphForwarder {
    #[tracing::instrument(skip_all, fields(page_id = %upload.page_id, bytes = upload.bytes.len()))]
    async fn forward(&self, upload: VideoUpload) -> Result<serde_json::Value, UpstreamError> {
        let url = self.videos_url(&upload.page_id);

        let source = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(|e| UpstreamError::Transport(format!("invalid content type: {e}")))?;
        let mut form = multipart::Form::new().part("source", source);
        if let Some(description) = upload.description {
            form = form.text("description", description);
        }
        let form = form.text("access_token", upload.access_token);

        let res = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        let status = res.status();
        let body: serde_json::Value = res
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        if let Some(message) = remote_error_message(&body) {
            tracing::warn!(%status, %message, "upstream rejected upload");
            return Err(UpstreamError::Remote(message));
        }
        if !status.is_success() {
            tracing::warn!(%status, "upstream returned failure status");
            return Err(UpstreamError::Remote(format!("upstream returned {status}")));
        }
        tracing::info!(%status, "upload forwarded");
        Ok(body)
    }
}

/// `error.message` (or a string `error`) from an API reply, if the reply is an error.
pub(crate) fn remote_error_message(body: &serde_json::Value) -> Option<String> {
    let error = body.get("error")?;
    if error.is_null() {
        return None;
    }
    Some(match error {
        serde_json::Value::String(s) => s.clone(),
        other => other
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/relay/graph.rs"]
mod tests;
