use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

/// An encoder that works on files inside its own private scratch filesystem.
///
/// The assembler writes input frames into the runtime by name, runs the encoder with
/// ffmpeg-style arguments that reference those names, then reads the produced file back.
pub trait EncoderRuntime {
    /// Prepare the runtime. Called before every render; must be cheap once loaded.
    fn load(&mut self) -> ReelResult<()>;
    /// Create or replace `name` in the scratch filesystem.
    fn write_file(&mut self, name: &str, bytes: &[u8]) -> ReelResult<()>;
    /// Run the encoder. Relative paths in `args` resolve inside the scratch filesystem.
    fn exec(&mut self, args: &[String]) -> ReelResult<()>;
    /// Read `name` back from the scratch filesystem.
    fn read_file(&mut self, name: &str) -> ReelResult<Vec<u8>>;
    /// Delete `name`; deleting a missing file is not an error.
    fn remove_file(&mut self, name: &str) -> ReelResult<()>;
}

/// `true` when `bin -version` runs successfully.
pub fn is_ffmpeg_available(bin: &Path) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// [`EncoderRuntime`] backed by the system `ffmpeg` binary and a temporary directory.
///
/// We use the `ffmpeg` executable rather than linking FFmpeg so builds need no native headers.
pub struct FfmpegRuntime {
    bin: PathBuf,
    workdir: Option<tempfile::TempDir>,
}

impl Default for FfmpegRuntime {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegRuntime {
    /// Runtime that invokes `bin` (a path, or a name looked up on PATH).
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            workdir: None,
        }
    }

    /// Scratch directory, once loaded.
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(|d| d.path())
    }

    fn scratch_path(&self, name: &str) -> ReelResult<PathBuf> {
        let dir = self
            .workdir
            .as_ref()
            .ok_or_else(|| ReelError::encode("encoder runtime is not loaded"))?;
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ReelError::validation(format!(
                "invalid scratch file name '{name}'"
            )));
        }
        Ok(dir.path().join(name))
    }
}

impl EncoderRuntime for FfmpegRuntime {
    fn load(&mut self) -> ReelResult<()> {
        if self.workdir.is_some() {
            return Ok(());
        }
        if !is_ffmpeg_available(&self.bin) {
            return Err(ReelError::encode(format!(
                "ffmpeg is required for MP4 encoding, but '{}' could not be run",
                self.bin.display()
            )));
        }
        let dir = tempfile::Builder::new()
            .prefix("reelcast-")
            .tempdir()
            .context("create encoder scratch directory")?;
        tracing::debug!(bin = %self.bin.display(), dir = %dir.path().display(), "encoder runtime loaded");
        self.workdir = Some(dir);
        Ok(())
    }

    fn write_file(&mut self, name: &str, bytes: &[u8]) -> ReelResult<()> {
        let path = self.scratch_path(name)?;
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        Ok(())
    }

    fn exec(&mut self, args: &[String]) -> ReelResult<()> {
        let dir = self
            .workdir
            .as_ref()
            .ok_or_else(|| ReelError::encode("encoder runtime is not loaded"))?;

        let output = Command::new(&self.bin)
            .current_dir(dir.path())
            .args(["-y", "-loglevel", "error"])
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                ReelError::encode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn read_file(&mut self, name: &str) -> ReelResult<Vec<u8>> {
        let path = self.scratch_path(name)?;
        let bytes = std::fs::read(&path).with_context(|| format!("read '{}'", path.display()))?;
        Ok(bytes)
    }

    fn remove_file(&mut self, name: &str) -> ReelResult<()> {
        let path = self.scratch_path(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("remove '{}'", path.display()))
                .into()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/runtime.rs"]
mod tests;
