use crate::encode::assembler::{RenderConfig, RenderState, VideoArtifact, VideoAssembler};
use crate::encode::runtime::EncoderRuntime;
use crate::foundation::error::{ReelError, ReelResult};
use crate::relay::client::{RelayClient, UploadCredentials};
use crate::render::text::CaptionFont;
use crate::script::Script;

/// What one user is working on: the script, the last render's state, and its video.
///
/// Nothing here is persisted. A render replaces the previous artifact; a failed render
/// leaves none.
#[derive(Debug, Default)]
pub struct Session {
    script: Script,
    state: RenderState,
    artifact: Option<VideoArtifact>,
}

impl Session {
    /// Empty session in the `Idle` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the script with a wrapped script generated from `topic`.
    pub fn generate(&mut self, topic: &str) -> &Script {
        self.script = Script::from_topic(topic);
        tracing::debug!(lines = self.script.len(), "script generated");
        &self.script
    }

    /// Replace the script as given.
    pub fn set_script(&mut self, script: Script) {
        self.script = script;
    }

    /// Current script.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Replace line `idx`.
    pub fn edit_line(&mut self, idx: usize, text: impl Into<String>) -> ReelResult<()> {
        self.script.edit_line(idx, text)
    }

    /// Insert a line before `idx`.
    pub fn insert_line(&mut self, idx: usize, text: impl Into<String>) -> ReelResult<()> {
        self.script.insert_line(idx, text)
    }

    /// Remove line `idx`.
    pub fn remove_line(&mut self, idx: usize) -> ReelResult<String> {
        self.script.remove_line(idx)
    }

    /// Render the current script, tracking every state and forwarding it to `on_state`.
    pub fn render(
        &mut self,
        config: RenderConfig,
        runtime: &mut dyn EncoderRuntime,
        font: Option<CaptionFont>,
        on_state: &mut dyn FnMut(&RenderState),
    ) -> ReelResult<&VideoArtifact> {
        self.artifact = None;

        let mut assembler = VideoAssembler::new(config);
        if let Some(font) = font {
            assembler = assembler.with_font(font);
        }

        let state = &mut self.state;
        let result = assembler.assemble(&self.script, runtime, &mut |s| {
            *state = s.clone();
            on_state(s);
        });
        Ok(self.artifact.insert(result?))
    }

    /// State of the latest render.
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Video from the latest successful render.
    pub fn artifact(&self) -> Option<&VideoArtifact> {
        self.artifact.as_ref()
    }

    /// Submit the current artifact through `client`.
    pub async fn upload(
        &self,
        client: &RelayClient,
        credentials: &UploadCredentials,
        description: Option<&str>,
    ) -> ReelResult<serde_json::Value> {
        let artifact = self
            .artifact
            .as_ref()
            .ok_or_else(|| ReelError::validation("render a video before uploading"))?;
        if credentials.page_id.trim().is_empty() || credentials.access_token.trim().is_empty() {
            return Err(ReelError::validation(
                "page id and access token are required to upload",
            ));
        }
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        client.upload(artifact, credentials, description).await
    }
}

#[cfg(test)]
#[path = "../tests/unit/session/session.rs"]
mod tests;
