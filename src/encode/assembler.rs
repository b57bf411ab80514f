use std::path::Path;

use anyhow::Context as _;

use crate::encode::runtime::EncoderRuntime;
use crate::foundation::core::{Canvas, FPS, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRenderer;
use crate::render::text::CaptionFont;
use crate::script::Script;

/// `ffmpeg` input pattern matching [`FrameIndex::file_name`].
pub const FRAME_PATTERN: &str = "frame_%04d.png";
/// Name of the encoded container inside the runtime.
pub const OUTPUT_NAME: &str = "output.mp4";
/// MIME type of every artifact.
pub const MP4_MIME: &str = "video/mp4";
/// Longest time a single caption line may stay on screen.
pub const MAX_SECONDS_PER_LINE: f64 = 600.0;
/// Frame budget for one render: an hour of video at the output frame rate.
pub const MAX_TOTAL_FRAMES: u64 = 108_000;

/// Output size presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// 720×1280, for short-form vertical video.
    Portrait,
    /// 1280×720.
    Landscape,
    /// 1080×1080.
    Square,
}

impl Resolution {
    /// Canvas for this preset.
    pub fn canvas(self) -> Canvas {
        match self {
            Resolution::Portrait => Canvas {
                width: 720,
                height: 1280,
            },
            Resolution::Landscape => Canvas {
                width: 1280,
                height: 720,
            },
            Resolution::Square => Canvas {
                width: 1080,
                height: 1080,
            },
        }
    }
}

/// Settings for one render pass.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderConfig {
    /// How long each caption line stays on screen.
    pub seconds_per_line: f64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new(2.5, Resolution::Portrait)
    }
}

impl RenderConfig {
    /// Config for a preset resolution.
    pub fn new(seconds_per_line: f64, resolution: Resolution) -> Self {
        let c = resolution.canvas();
        Self {
            seconds_per_line,
            width: c.width,
            height: c.height,
        }
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Check the config can be encoded.
    pub fn validate(&self) -> ReelResult<()> {
        if !self.seconds_per_line.is_finite() || self.seconds_per_line <= 0.0 {
            return Err(ReelError::validation(
                "seconds_per_line must be finite and > 0",
            ));
        }
        if self.seconds_per_line > MAX_SECONDS_PER_LINE {
            return Err(ReelError::validation(format!(
                "seconds_per_line must be at most {MAX_SECONDS_PER_LINE}"
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation(
                "render width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // yuv420p chroma subsampling.
            return Err(ReelError::validation(
                "render width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

/// Frames each caption line is shown for at the fixed output frame rate.
pub fn frames_per_line(seconds_per_line: f64) -> u64 {
    FPS.secs_to_frames_round(seconds_per_line)
}

/// Total frames in a video of `line_count` lines.
pub fn total_frames(line_count: usize, seconds_per_line: f64) -> u64 {
    (line_count as u64).saturating_mul(frames_per_line(seconds_per_line))
}

/// Observable progress of a render.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RenderState {
    /// Nothing rendered yet.
    #[default]
    Idle,
    /// Loading the encoder and validating input.
    Preparing,
    /// Writing frames; `progress` is the fraction written so far.
    Generating {
        /// Fraction in `[0, 1]`.
        progress: f64,
    },
    /// Finished successfully.
    Done {
        /// Size of the encoded video.
        size_bytes: u64,
    },
    /// Failed; the message is meant for the user.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

/// A named encoder configuration (codec, pixel format, container flags).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecProfile {
    /// Short label used in logs and errors.
    pub name: String,
    /// Output-side `ffmpeg` arguments.
    pub args: Vec<String>,
}

impl CodecProfile {
    /// Profile from a label and argument list.
    pub fn new(name: impl Into<String>, args: &[&str]) -> Self {
        Self {
            name: name.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Software MPEG-4 Part 2, `yuv420p`, moov atom up front.
    pub fn mpeg4() -> Self {
        Self::new(
            "mpeg4",
            &[
                "-c:v",
                "mpeg4",
                "-q:v",
                "3",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ],
        )
    }

    /// Motion-JPEG in an MP4 container.
    pub fn mjpeg() -> Self {
        Self::new(
            "mjpeg",
            &[
                "-c:v",
                "mjpeg",
                "-q:v",
                "3",
                "-pix_fmt",
                "yuvj420p",
                "-movflags",
                "+faststart",
            ],
        )
    }

    fn command(&self) -> Vec<String> {
        let mut args = vec![
            "-framerate".to_string(),
            FPS.ffmpeg_arg(),
            "-i".to_string(),
            FRAME_PATTERN.to_string(),
        ];
        args.extend(self.args.iter().cloned());
        args.push(OUTPUT_NAME.to_string());
        args
    }
}

/// An encoded MP4 held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoArtifact {
    bytes: Vec<u8>,
}

impl VideoArtifact {
    /// Wrap encoded MP4 bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// `true` when no bytes were produced.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Always `video/mp4`.
    pub fn mime_type(&self) -> &'static str {
        MP4_MIME
    }

    /// Save to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> ReelResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("write video '{}'", path.display()))?;
        Ok(())
    }
}

/// Turns a script into an MP4 by rendering every frame into an [`EncoderRuntime`].
///
/// Frame files are written as `frame_0000.png, frame_0001.png, ...` in strictly increasing
/// order with no gaps; the encoder reads them back by pattern. All frames and the output are
/// removed from the runtime afterwards so a later, shorter render cannot pick up stale frames.
pub struct VideoAssembler {
    config: RenderConfig,
    profiles: Vec<CodecProfile>,
    font: Option<CaptionFont>,
    renderer: Option<FrameRenderer>,
}

impl VideoAssembler {
    /// Assembler with the default `mpeg4` then `mjpeg` profiles.
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            profiles: vec![CodecProfile::mpeg4(), CodecProfile::mjpeg()],
            font: None,
            renderer: None,
        }
    }

    /// Draw caption text with `font`.
    pub fn with_font(mut self, font: CaptionFont) -> Self {
        self.font = Some(font);
        self.renderer = None;
        self
    }

    /// Replace the codec profiles, tried in order.
    pub fn with_profiles(mut self, profiles: Vec<CodecProfile>) -> Self {
        self.profiles = profiles;
        self
    }

    /// Render configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `script`, reporting every state transition to `on_state`.
    ///
    /// The first state is always [`RenderState::Preparing`] and the last is `Done` or `Error`.
    #[tracing::instrument(
        skip_all,
        fields(lines = script.len(), width = self.config.width, height = self.config.height)
    )]
    pub fn assemble(
        &mut self,
        script: &Script,
        runtime: &mut dyn EncoderRuntime,
        on_state: &mut dyn FnMut(&RenderState),
    ) -> ReelResult<VideoArtifact> {
        on_state(&RenderState::Preparing);
        match self.assemble_inner(script, runtime, on_state) {
            Ok(artifact) => {
                tracing::info!(size_bytes = artifact.len(), "render finished");
                on_state(&RenderState::Done {
                    size_bytes: artifact.len(),
                });
                Ok(artifact)
            }
            Err(e) => {
                tracing::warn!(error = %e, "render failed");
                on_state(&RenderState::Error {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn assemble_inner(
        &mut self,
        script: &Script,
        runtime: &mut dyn EncoderRuntime,
        on_state: &mut dyn FnMut(&RenderState),
    ) -> ReelResult<VideoArtifact> {
        self.config.validate()?;
        if self.profiles.is_empty() {
            return Err(ReelError::validation("at least one codec profile is required"));
        }
        runtime.load()?;

        let per_line = frames_per_line(self.config.seconds_per_line);
        let total = total_frames(script.len(), self.config.seconds_per_line);
        if total == 0 {
            return Err(ReelError::validation(if script.is_empty() {
                "script has no lines to render".to_string()
            } else {
                format!(
                    "{}s per line is shorter than one frame",
                    self.config.seconds_per_line
                )
            }));
        }
        if total > MAX_TOTAL_FRAMES {
            return Err(ReelError::validation(format!(
                "{total} frames exceeds the limit of {MAX_TOTAL_FRAMES}"
            )));
        }
        tracing::debug!(per_line, total, "frame plan");

        if self.renderer.is_none() {
            self.renderer = Some(FrameRenderer::new(
                self.config.canvas(),
                self.font.take(),
            )?);
        }

        let mut written = Vec::new();
        let result = self.write_and_encode(script, runtime, on_state, per_line, total, &mut written);

        for name in written.iter().map(String::as_str).chain([OUTPUT_NAME]) {
            if let Err(e) = runtime.remove_file(name) {
                tracing::warn!(file = name, error = %e, "failed to clean encoder scratch file");
            }
        }
        result
    }

    fn write_and_encode(
        &mut self,
        script: &Script,
        runtime: &mut dyn EncoderRuntime,
        on_state: &mut dyn FnMut(&RenderState),
        per_line: u64,
        total: u64,
        written: &mut Vec<String>,
    ) -> ReelResult<VideoArtifact> {
        let renderer = self
            .renderer
            .as_mut()
            .ok_or_else(|| ReelError::surface("frame renderer missing"))?;

        on_state(&RenderState::Generating { progress: 0.0 });
        for line in script.lines() {
            for _ in 0..per_line {
                let idx = FrameIndex(written.len() as u64);
                let progress = (idx.0 + 1) as f64 / total as f64;
                renderer.render(line, progress)?;
                let png = renderer.encode_png()?;
                let name = idx.file_name();
                runtime.write_file(&name, &png)?;
                written.push(name);
                on_state(&RenderState::Generating { progress });
            }
        }

        runtime.remove_file(OUTPUT_NAME)?;
        self.encode(runtime)?;

        let bytes = runtime.read_file(OUTPUT_NAME)?;
        if bytes.is_empty() {
            return Err(ReelError::encode("encoder produced an empty file"));
        }
        Ok(VideoArtifact::new(bytes))
    }

    fn encode(&self, runtime: &mut dyn EncoderRuntime) -> ReelResult<()> {
        let mut failures = Vec::new();
        for profile in &self.profiles {
            match runtime.exec(&profile.command()) {
                Ok(()) => {
                    tracing::info!(profile = %profile.name, "encoded");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(profile = %profile.name, error = %e, "codec profile failed");
                    failures.push(format!("{}: {e}", profile.name));
                }
            }
        }
        Err(ReelError::encode(format!(
            "all codec profiles failed ({})",
            failures.join("; ")
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/assembler.rs"]
mod tests;
