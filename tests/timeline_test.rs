use chrono::FixedOffset;
use quote_thread::{
    Contact, Header, Message, Timestamp, fill_missing_timestamps, normalize_timezone, reconcile,
};

fn moscow() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).unwrap()
}

fn message(sent: Option<&str>) -> Message {
    let header = Header {
        sent: sent.map(|s| s.parse::<Timestamp>().unwrap()),
        ..Header::new(Contact::new("a@x.com", None))
    };
    Message::new(Some(header), "body".to_string())
}

fn sent(message: &Message) -> String {
    message.sent().unwrap().to_string()
}

#[test]
fn test_reconcile_interpolates_middle_message() {
    // Extraction order is newest first
    let messages = vec![
        message(Some("2024-05-14T14:00:00")),
        message(None),
        message(Some("2024-05-14T10:00:00")),
    ];

    let messages = reconcile(messages, moscow());

    assert_eq!(sent(&messages[0]), "2024-05-14T10:00:00+03:00");
    assert_eq!(sent(&messages[1]), "2024-05-14T12:00:00+03:00");
    assert_eq!(sent(&messages[2]), "2024-05-14T14:00:00+03:00");
}

#[test]
fn test_boundaries_borrow_neighbor_hour() {
    let mut messages = vec![message(None), message(Some("2024-05-14T10:00:00"))];
    fill_missing_timestamps(&mut messages, moscow());
    assert_eq!(sent(&messages[0]), "2024-05-14T09:00:00");

    let mut messages = vec![message(Some("2024-05-14T10:00:00")), message(None)];
    fill_missing_timestamps(&mut messages, moscow());
    assert_eq!(sent(&messages[1]), "2024-05-14T11:00:00");
}

#[test]
fn test_filled_estimate_anchors_next_gap() {
    let mut messages = vec![
        message(Some("2024-05-14T10:00:00")),
        message(None),
        message(None),
        message(Some("2024-05-14T14:00:00")),
    ];

    fill_missing_timestamps(&mut messages, moscow());

    assert_eq!(sent(&messages[1]), "2024-05-14T12:00:00");
    assert_eq!(sent(&messages[2]), "2024-05-14T13:00:00");
}

#[test]
fn test_date_only_keeps_its_date() {
    let mut messages = vec![
        message(Some("2024-05-14T10:00:00")),
        message(Some("2024-05-20T00:00:00")),
        message(Some("2024-05-14T14:00:00")),
    ];

    fill_missing_timestamps(&mut messages, moscow());

    assert_eq!(sent(&messages[1]), "2024-05-20T12:00:00");
}

#[test]
fn test_mixed_offsets_meet_in_reference_zone() {
    let mut messages = vec![
        message(Some("2024-05-14T10:00:00")),
        message(None),
        message(Some("2024-05-14T12:00:00+00:00")),
    ];

    fill_missing_timestamps(&mut messages, moscow());

    // 10:00 read as +03:00 is 07:00Z; halfway to 12:00Z is 09:30Z
    assert_eq!(sent(&messages[1]), "2024-05-14T12:30:00+03:00");
}

#[test]
fn test_messages_without_header_are_skipped() {
    let mut messages = vec![
        message(Some("2024-05-14T10:00:00")),
        Message::new(None, "top".to_string()),
    ];

    fill_missing_timestamps(&mut messages, moscow());

    assert!(messages[1].header.is_none());
}

#[test]
fn test_nothing_known_leaves_gaps() {
    let mut messages = vec![message(None), message(None)];

    fill_missing_timestamps(&mut messages, moscow());

    assert!(messages.iter().all(|m| m.sent().is_none()));
}

#[test]
fn test_normalize_timezone() {
    let mut messages = vec![
        message(Some("2024-05-14T09:00:00+00:00")),
        message(Some("2024-05-14T09:00:00")),
        message(None),
    ];

    normalize_timezone(&mut messages, moscow());

    assert_eq!(sent(&messages[0]), "2024-05-14T12:00:00+03:00");
    assert_eq!(sent(&messages[1]), "2024-05-14T09:00:00+03:00");
    assert!(messages[2].sent().is_none());
}
