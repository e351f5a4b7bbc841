use super::*;

#[test]
fn parses_rfc3339_with_offset() {
    let t = parse("2024-05-01T10:00:00+02:00").expect("parse");
    assert_eq!(t.offset().whole_hours(), 2);
    assert_eq!(t.hour(), 10);
}

#[test]
fn offsetless_backend_timestamps_are_utc() {
    let t = parse("2024-05-01T10:00:00.123456").expect("parse");
    assert!(t.offset().is_utc());
    assert_eq!(t.microsecond(), 123_456);

    let t = parse("2024-05-01T10:00:00").expect("parse");
    assert_eq!(t.minute(), 0);
}

#[test]
fn garbage_is_rejected() {
    assert!(parse("yesterday").is_err());
    assert!(parse("2024-05-01T10:00:00+25:00").is_err());
}

#[test]
fn format_round_trips_through_parse() {
    let t = parse("2024-05-01T10:00:00Z").expect("parse");
    assert_eq!(format(&t), "2024-05-01T10:00:00Z");
}
