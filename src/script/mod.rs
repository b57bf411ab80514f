//! Caption scripts: canned generation from a topic, width wrapping, and user edits.

mod generate;
mod wrap;

pub use generate::{PLACEHOLDER_LINES, generate_script};
pub use wrap::{WRAP_WIDTH, wrap_lines};

use crate::foundation::error::{ReelError, ReelResult};

/// Ordered caption lines; one line becomes one slide of the video.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Script {
    lines: Vec<String>,
}

impl Script {
    /// Build a script from lines as given.
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Generate a script for `topic` and wrap it for display.
    pub fn from_topic(topic: &str) -> Self {
        Self::new(wrap_lines(&generate_script(topic)))
    }

    /// Parse one caption per text line; blank lines are ignored.
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Caption lines in display order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// `true` when there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Replace line `idx`.
    pub fn edit_line(&mut self, idx: usize, text: impl Into<String>) -> ReelResult<()> {
        let len = self.lines.len();
        let slot = self
            .lines
            .get_mut(idx)
            .ok_or_else(|| ReelError::validation(format!("line {idx} out of range (len {len})")))?;
        *slot = text.into();
        Ok(())
    }

    /// Insert a line before `idx` (`idx == len` appends).
    pub fn insert_line(&mut self, idx: usize, text: impl Into<String>) -> ReelResult<()> {
        if idx > self.lines.len() {
            return Err(ReelError::validation(format!(
                "insert position {idx} out of range (len {})",
                self.lines.len()
            )));
        }
        self.lines.insert(idx, text.into());
        Ok(())
    }

    /// Remove and return line `idx`.
    pub fn remove_line(&mut self, idx: usize) -> ReelResult<String> {
        if idx >= self.lines.len() {
            return Err(ReelError::validation(format!(
                "line {idx} out of range (len {})",
                self.lines.len()
            )));
        }
        Ok(self.lines.remove(idx))
    }

    /// Re-run the wrapper over the current lines, e.g. after edits.
    pub fn rewrap(&mut self) {
        self.lines = wrap_lines(&self.lines);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/script.rs"]
mod tests;
