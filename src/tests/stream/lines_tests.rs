use super::*;
use crate::model::DreamStatus;

#[test]
fn framer_reassembles_lines_split_across_chunks() {
    let mut framer = LineFramer::default();
    assert!(framer.push(br#"{"status":"proc"#).is_empty());
    let lines = framer.push(b"essing\",\"progress\":0.3}\r\n{\"a\"");
    assert_eq!(lines, vec![r#"{"status":"processing","progress":0.3}"#.to_string()]);
    assert_eq!(framer.finish().as_deref(), Some(r#"{"a""#));
    assert_eq!(framer.finish(), None);
}

#[test]
fn framer_emits_empty_lines_between_events() {
    let mut framer = LineFramer::default();
    let lines = framer.push(b"a\n\nb\n");
    assert_eq!(lines, vec!["a".to_string(), String::new(), "b".to_string()]);
}

#[test]
fn decodes_plain_json_lines() {
    let e = decode_line(r#"{"status":"processing","progress":0.6,"message":"Building"}"#)
        .expect("event");
    assert_eq!(e.status, DreamStatus::Processing);
    assert_eq!(e.progress, 0.6);
    assert_eq!(e.message.as_deref(), Some("Building"));
}

#[test]
fn strips_sse_data_prefix() {
    let e = decode_line(r#"data: {"status": "completed", "progress": 1.0}"#).expect("event");
    assert_eq!(e.status, DreamStatus::Completed);
}

#[test]
fn skips_heartbeats_comments_and_other_fields() {
    assert!(decode_line("").is_none());
    assert!(decode_line("   ").is_none());
    assert!(decode_line(": keep-alive").is_none());
    assert!(decode_line("event: progress").is_none());
    assert!(decode_line("id: 7").is_none());
    assert!(decode_line("retry: 1000").is_none());
    assert!(decode_line("not json at all").is_none());
    assert!(decode_line(r#"{"status":"exploded","progress":0.1}"#).is_none());
}
