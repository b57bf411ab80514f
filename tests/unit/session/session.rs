use std::collections::BTreeMap;

use super::*;
use crate::script::PLACEHOLDER_LINES;

/// Runtime that keeps files in memory and "encodes" by concatenating every frame file.
#[derive(Default)]
struct MemoryRuntime {
    files: BTreeMap<String, Vec<u8>>,
    broken: bool,
}

impl EncoderRuntime for MemoryRuntime {
    fn load(&mut self) -> ReelResult<()> {
        Ok(())
    }

    fn write_file(&mut self, name: &str, bytes: &[u8]) -> ReelResult<()> {
        self.files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn exec(&mut self, _args: &[String]) -> ReelResult<()> {
        if self.broken {
            return Err(ReelError::encode("codec missing"));
        }
        let out: Vec<u8> = self
            .files
            .iter()
            .filter(|(k, _)| k.starts_with("frame_"))
            .flat_map(|(_, v)| v.iter().copied())
            .collect();
        self.files.insert("output.mp4".to_string(), out);
        Ok(())
    }

    fn read_file(&mut self, name: &str) -> ReelResult<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| ReelError::encode(format!("{name} not found")))
    }

    fn remove_file(&mut self, name: &str) -> ReelResult<()> {
        self.files.remove(name);
        Ok(())
    }
}

fn tiny() -> RenderConfig {
    RenderConfig {
        seconds_per_line: 0.1,
        width: 16,
        height: 24,
    }
}

#[test]
fn new_session_is_idle_and_empty() {
    let s = Session::new();
    assert_eq!(s.state(), &RenderState::Idle);
    assert!(s.script().is_empty());
    assert!(s.artifact().is_none());
}

#[test]
fn generate_and_edit_the_script() {
    let mut s = Session::new();
    assert_eq!(s.generate("  ").lines(), PLACEHOLDER_LINES);

    s.generate("rust");
    assert_eq!(s.script().len(), 3);
    assert!(s.script().lines().iter().all(|l| l.contains("rust")));

    s.edit_line(0, "first").unwrap();
    s.insert_line(3, "last").unwrap();
    assert_eq!(s.remove_line(1).unwrap(), "rust: the one idea worth remembering.");
    assert_eq!(s.script().lines().first().map(String::as_str), Some("first"));
    assert_eq!(s.script().lines().last().map(String::as_str), Some("last"));
    assert!(s.edit_line(10, "x").is_err());

    s.set_script(Script::parse("only"));
    assert_eq!(s.script().len(), 1);
}

#[test]
fn successful_render_keeps_the_artifact() {
    let mut s = Session::new();
    s.set_script(Script::parse("a\nb"));
    let mut rt = MemoryRuntime::default();
    let mut seen = Vec::new();

    let size = s
        .render(tiny(), &mut rt, None, &mut |st| seen.push(st.clone()))
        .unwrap()
        .len();

    assert!(size > 0);
    assert_eq!(s.state(), &RenderState::Done { size_bytes: size });
    assert_eq!(seen.first(), Some(&RenderState::Preparing));
    assert_eq!(seen.last(), Some(s.state()));
    assert_eq!(s.artifact().map(VideoArtifact::len), Some(size));
}

#[test]
fn failed_render_drops_the_previous_artifact() {
    let mut s = Session::new();
    s.set_script(Script::parse("a"));
    let mut rt = MemoryRuntime::default();
    s.render(tiny(), &mut rt, None, &mut |_| {}).unwrap();
    assert!(s.artifact().is_some());

    rt.broken = true;
    assert!(s.render(tiny(), &mut rt, None, &mut |_| {}).is_err());
    assert!(s.artifact().is_none());
    let RenderState::Error { message } = s.state() else {
        panic!("expected error state, got {:?}", s.state());
    };
    assert!(message.contains("codec missing"));
}

#[tokio::test]
async fn upload_requires_an_artifact_and_credentials() {
    let client = RelayClient::new("http://127.0.0.1:9/api/upload");
    let creds = UploadCredentials::new("42", "tok");

    let s = Session::new();
    let err = s.upload(&client, &creds, None).await.unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));

    let mut s = Session::new();
    s.set_script(Script::parse("a"));
    s.render(tiny(), &mut MemoryRuntime::default(), None, &mut |_| {})
        .unwrap();
    let err = s
        .upload(&client, &UploadCredentials::new("42", " "), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
}
