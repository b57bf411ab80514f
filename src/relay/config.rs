use std::net::SocketAddr;

use crate::foundation::error::{ReelError, ReelResult};

/// Default upstream for page video uploads.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph-video.facebook.com/v19.0";
/// Default request body limit: 512 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

const ENV_BIND: &str = "REELCAST_BIND";
const ENV_GRAPH_BASE_URL: &str = "REELCAST_GRAPH_BASE_URL";
const ENV_MAX_UPLOAD_BYTES: &str = "REELCAST_MAX_UPLOAD_BYTES";

/// Settings for [`crate::relay::server::serve`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RelayConfig {
    /// Address the HTTP server listens on.
    pub bind: SocketAddr,
    /// Base URL of the remote video API, without a trailing `/{page_id}/videos`.
    pub graph_base_url: String,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl RelayConfig {
    /// Defaults overridden by `REELCAST_BIND`, `REELCAST_GRAPH_BASE_URL` and
    /// `REELCAST_MAX_UPLOAD_BYTES` when set.
    pub fn from_env() -> ReelResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ReelResult<Self> {
        let mut cfg = Self::default();
        if let Some(v) = lookup(ENV_BIND) {
            cfg.bind = v
                .trim()
                .parse()
                .map_err(|e| ReelError::validation(format!("{ENV_BIND}='{v}': {e}")))?;
        }
        if let Some(v) = lookup(ENV_GRAPH_BASE_URL) {
            cfg.graph_base_url = v.trim().to_string();
        }
        if let Some(v) = lookup(ENV_MAX_UPLOAD_BYTES) {
            cfg.max_upload_bytes = v
                .trim()
                .parse()
                .map_err(|e| ReelError::validation(format!("{ENV_MAX_UPLOAD_BYTES}='{v}': {e}")))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the upstream URL and body limit are usable.
    pub fn validate(&self) -> ReelResult<()> {
        let base = self.graph_base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ReelError::validation(format!(
                "graph base url must be http(s), got '{base}'"
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(ReelError::validation("max_upload_bytes must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/relay/config.rs"]
mod tests;
