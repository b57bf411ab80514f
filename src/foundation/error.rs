/// Crate-wide result alias.
pub type ReelResult<T> = Result<T, ReelError>;

/// Errors produced while generating, rendering, encoding or uploading a reel.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// The drawing surface could not be created or used.
    #[error("surface error: {0}")]
    Surface(String),

    /// The encoder runtime failed to load or to produce output.
    #[error("encode error: {0}")]
    Encode(String),

    /// Submitting a video to the relay failed.
    #[error("upload error: {0}")]
    Upload(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Surface`].
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Build a [`ReelError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReelError::Upload`].
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    /// Build a [`ReelError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
