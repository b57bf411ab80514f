use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_without_env() {
    let cfg = RelayConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg, RelayConfig::default());
    assert_eq!(cfg.bind.port(), 3000);
    assert_eq!(cfg.graph_base_url, DEFAULT_GRAPH_BASE_URL);
}

#[test]
fn env_overrides_apply() {
    let cfg = RelayConfig::from_lookup(lookup(&[
        ("REELCAST_BIND", "0.0.0.0:8080"),
        ("REELCAST_GRAPH_BASE_URL", "http://localhost:9999/v1"),
        ("REELCAST_MAX_UPLOAD_BYTES", "1024"),
    ]))
    .unwrap();
    assert_eq!(cfg.bind.to_string(), "0.0.0.0:8080");
    assert_eq!(cfg.graph_base_url, "http://localhost:9999/v1");
    assert_eq!(cfg.max_upload_bytes, 1024);
}

#[test]
fn bad_env_values_are_rejected() {
    for pairs in [
        [("REELCAST_BIND", "not an addr")],
        [("REELCAST_MAX_UPLOAD_BYTES", "-3")],
        [("REELCAST_MAX_UPLOAD_BYTES", "0")],
        [("REELCAST_GRAPH_BASE_URL", "ftp://example.com")],
    ] {
        let err = RelayConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ReelError::Validation(_)), "{pairs:?}: {err}");
    }
}
