use super::*;

#[test]
fn from_topic_wraps_generated_lines() {
    let s = Script::from_topic("");
    assert_eq!(s.len(), 3);
    assert_eq!(s.lines()[0], PLACEHOLDER_LINES[0]);

    let s = Script::from_topic("an extraordinarily long topic that will not fit on one caption");
    assert!(s.len() > 3);
    assert!(s.lines().iter().all(|l| l.chars().count() <= WRAP_WIDTH));
}

#[test]
fn parse_ignores_blank_lines() {
    let s = Script::parse("first\n\n  second  \n\t\nthird\n");
    assert_eq!(s.lines(), &["first", "second", "third"]);
}

#[test]
fn edits_are_bounds_checked() {
    let mut s = Script::parse("a\nb");
    s.edit_line(1, "B").unwrap();
    s.insert_line(2, "c").unwrap();
    s.insert_line(0, "start").unwrap();
    assert_eq!(s.lines(), &["start", "a", "B", "c"]);
    assert_eq!(s.remove_line(0).unwrap(), "start");

    assert!(s.edit_line(9, "x").is_err());
    assert!(s.insert_line(9, "x").is_err());
    assert!(s.remove_line(3).is_err());
    assert_eq!(s.len(), 3);
}

#[test]
fn serializes_as_plain_array() {
    let s = Script::parse("one\ntwo");
    let json = serde_json::to_string(&s).unwrap();
    assert_eq!(json, r#"["one","two"]"#);
    let back: Script = serde_json::from_str(&json).unwrap();
    assert_eq!(back, s);
}
