use reqwest::multipart;

use crate::encode::assembler::VideoArtifact;
use crate::foundation::error::{ReelError, ReelResult};
use crate::relay::graph::{DEFAULT_FILE_NAME, remote_error_message};

/// Destination and authorization for one upload attempt. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadCredentials {
    /// Page to publish on.
    pub page_id: String,
    /// Page access token.
    pub access_token: String,
}

impl std::fmt::Debug for UploadCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCredentials")
            .field("page_id", &self.page_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl UploadCredentials {
    /// Credentials from a page id and token.
    pub fn new(page_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            access_token: access_token.into(),
        }
    }
}

/// Submits rendered videos to an upload relay.
#[derive(Clone, Debug)]
pub struct RelayClient {
    url: String,
    http: reqwest::Client,
}

impl RelayClient {
    /// Client posting to `url`, the relay's full upload endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Send `artifact` with the relay's form fields and return the remote JSON on success.
    #[tracing::instrument(skip_all, fields(url = %self.url, bytes = artifact.len()))]
    pub async fn upload(
        &self,
        artifact: &VideoArtifact,
        credentials: &UploadCredentials,
        description: Option<&str>,
    ) -> ReelResult<serde_json::Value> {
        let file = multipart::Part::bytes(artifact.bytes().to_vec())
            .file_name(DEFAULT_FILE_NAME)
            .mime_str(artifact.mime_type())
            .map_err(|e| ReelError::upload(format!("build multipart part: {e}")))?;
        let mut form = multipart::Form::new()
            .text("pageId", credentials.page_id.clone())
            .text("accessToken", credentials.access_token.clone());
        if let Some(description) = description {
            form = form.text("description", description.to_string());
        }
        let form = form.part("file", file);

        let res = self
            .http
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ReelError::upload(format!("relay request failed: {e}")))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| ReelError::upload(format!("read relay response: {e}")))?;
        let body: Option<serde_json::Value> = serde_json::from_str(&text).ok();

        if status != reqwest::StatusCode::OK {
            let message = body
                .as_ref()
                .and_then(remote_error_message)
                .unwrap_or_else(|| format!("relay returned {status}"));
            return Err(ReelError::upload(message));
        }
        body.ok_or_else(|| ReelError::serde(format!("relay returned non-JSON body: {text}")))
    }
}
