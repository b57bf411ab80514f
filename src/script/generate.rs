/// Lines shown before the user has typed a topic.
pub const PLACEHOLDER_LINES: [&str; 3] = [
    "Type a topic to get started",
    "Each line becomes a caption slide",
    "Render, preview, then share",
];

/// Produce the three caption lines for `topic`.
///
/// Deterministic: the trimmed topic is interpolated into fixed templates. An empty or
/// whitespace-only topic yields [`PLACEHOLDER_LINES`].
pub fn generate_script(topic: &str) -> Vec<String> {
    let t = topic.trim();
    if t.is_empty() {
        return PLACEHOLDER_LINES.iter().map(|s| s.to_string()).collect();
    }

    vec![
        format!("Nobody tells you this about {t}."),
        format!("{t}: the one idea worth remembering."),
        format!("Follow for more on {t}!"),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/script/generate.rs"]
mod tests;
