//! Reelcast turns a topic into a short captioned video and relays it to a video-upload API.
//!
//! The pipeline is linear:
//!
//! - Generate and wrap a [`Script`] from a topic
//! - Render it into an MP4 [`VideoArtifact`] with a [`VideoAssembler`] driving an
//!   [`EncoderRuntime`]
//! - Submit the artifact to the upload relay ([`relay`]) which forwards it upstream
//!
//! [`Session`] bundles these steps the way an interactive front end uses them.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Encoder runtimes and the frame-sequence video assembler.
pub mod encode;
/// Upload relay: HTTP server, upstream forwarder and client.
pub mod relay;
/// Caption frame rendering.
pub mod render;
/// Script generation and line wrapping.
pub mod script;
/// In-memory state of one interactive session.
pub mod session;

pub use crate::foundation::core::{Canvas, FPS, Fps, FrameIndex};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::encode::assembler::{
    CodecProfile, RenderConfig, RenderState, Resolution, VideoArtifact, VideoAssembler,
    frames_per_line, total_frames,
};
pub use crate::encode::runtime::{EncoderRuntime, FfmpegRuntime, is_ffmpeg_available};
pub use crate::relay::client::{RelayClient, UploadCredentials};
pub use crate::relay::config::RelayConfig;
pub use crate::relay::graph::{GraphForwarder, UploadForwarder, UpstreamError, VideoUpload};
pub use crate::relay::server::{RelayError, router, serve};
pub use crate::render::frame::{FrameRGBA, FrameRenderer};
pub use crate::render::text::CaptionFont;
pub use crate::script::{Script, generate_script, wrap_lines};
pub use crate::session::Session;
