use quote_thread::{Contact, HeaderParser, parse_contact, parse_datetime};

#[test]
fn test_oneline_numeric_header() {
    let parser = HeaderParser::new(None);
    let header = parser
        .parse_header("21.09.2023, 16:13, 'КАМИН' <hotline@kamin.kaluga.ru>:")
        .unwrap();

    assert_eq!(header.from.name.as_deref(), Some("КАМИН"));
    assert_eq!(header.from.email, "hotline@kamin.kaluga.ru");
    assert_eq!(header.sent.unwrap().to_string(), "2023-09-21T16:13:00");
    assert!(header.to.is_none());
    assert!(header.subject.is_none());
}

#[test]
fn test_oneline_english_header() {
    let parser = HeaderParser::new(None);
    let header = parser
        .parse_header("On Wednesday, May 08, 2024 1:34 PM John Smith <john@example.com> wrote:")
        .unwrap();

    assert_eq!(header.from.name.as_deref(), Some("John Smith"));
    assert_eq!(header.from.email, "john@example.com");
    assert_eq!(header.sent.unwrap().to_string(), "2024-05-08T13:34:00");
}

#[test]
fn test_oneline_with_offset_and_sender_word() {
    let parser = HeaderParser::new(None);
    let header = parser
        .parse_header("Вторник, 14 мая 2024, 17:35 +03:00 от КАМИН <hotline@kamin.kaluga.ru>:")
        .unwrap();

    assert_eq!(header.from.name.as_deref(), Some("КАМИН"));
    assert_eq!(
        header.sent.unwrap().to_string(),
        "2024-05-14T17:35:00+03:00"
    );
}

#[test]
fn test_block_header() {
    let parser = HeaderParser::new(None);
    let header = parser
        .parse_header("From: A <a@x.com> Sent: 14.05.2024, 17:35 To: B <b@x.com> Subject: Hello")
        .unwrap();

    assert_eq!(header.from, Contact::new("a@x.com", Some("A".to_string())));
    assert_eq!(header.to, Some(Contact::new("b@x.com", Some("B".to_string()))));
    assert_eq!(header.subject.as_deref(), Some("Hello"));
    assert_eq!(header.sent.unwrap().to_string(), "2024-05-14T17:35:00");
}

#[test]
fn test_russian_block_header() {
    let parser = HeaderParser::new(None);
    let header = parser
        .parse_header(
            "От: Иван Петров <ivan@example.ru>\nОтправлено: 8 мая 2024 г., 13:55:58\n\
             Кому: support@example.ru\nТема: Заказ",
        )
        .unwrap();

    assert_eq!(header.from.name.as_deref(), Some("Иван Петров"));
    assert_eq!(header.to, Some(Contact::new("support@example.ru", None)));
    assert_eq!(header.subject.as_deref(), Some("Заказ"));
    assert_eq!(header.sent.unwrap().to_string(), "2024-05-08T13:55:58");
}

#[test]
fn test_block_without_sender_address() {
    let parser = HeaderParser::new(None);
    assert!(parser.parse_header("From: nobody Sent: 14.05.2024").is_none());
    assert!(parser.parse_header("   ").is_none());
}

#[test]
fn test_you_wrote_uses_main_contact() {
    let me = Contact::new("me@example.com", Some("Me".to_string()));
    let text = "Вы писали 8 мая 2024 г., 13:55:58:";

    let header = HeaderParser::new(Some(me.clone())).parse_header(text).unwrap();
    assert_eq!(header.from, me);
    assert_eq!(header.sent.unwrap().to_string(), "2024-05-08T13:55:58");

    assert!(HeaderParser::new(None).parse_header(text).is_none());
}

#[test]
fn test_parse_contact_forms() {
    assert_eq!(
        parse_contact("КАМИН <hotline@kamin.kaluga.ru>"),
        Some(Contact::new(
            "hotline@kamin.kaluga.ru",
            Some("КАМИН".to_string())
        ))
    );
    assert_eq!(
        parse_contact("\"Anna\" [anna@example.com]"),
        Some(Contact::new("anna@example.com", Some("Anna".to_string())))
    );
    assert_eq!(
        parse_contact("Name email@test.com [email@test.com]"),
        Some(Contact::new("email@test.com", Some("Name".to_string())))
    );
    assert_eq!(
        parse_contact("<mailto:a@x.com>"),
        Some(Contact::new("a@x.com", None))
    );
    assert_eq!(
        parse_contact("hotline@kamin.kaluga.ru"),
        Some(Contact::new("hotline@kamin.kaluga.ru", None))
    );
    assert_eq!(
        parse_contact("Support team support@example.com"),
        Some(Contact::new(
            "support@example.com",
            Some("Support team".to_string())
        ))
    );
    assert_eq!(parse_contact("no address here"), None);
}

#[test]
fn test_parse_datetime_formats() {
    let cases = [
        ("21.09.2023, 16:13", "2023-09-21T16:13:00"),
        ("пт, 15 апр. 2022 г. в 20:47", "2022-04-15T20:47:00"),
        ("Wednesday, May 08, 2024 12:05 AM", "2024-05-08T00:05:00"),
        ("Wednesday, May 08, 2024 12:05 PM", "2024-05-08T12:05:00"),
        ("8 мая 2024 г., 13:55:58 +03:00", "2024-05-08T13:55:58+03:00"),
        ("8 мая 2024 г., 13:55", "2024-05-08T13:55:00"),
        ("14 May 2024 09:15 -05:00", "2024-05-14T09:15:00-05:00"),
        ("14.05.2024", "2024-05-14T00:00:00"),
    ];
    for (input, expected) in cases {
        let parsed = parse_datetime(input).unwrap_or_else(|| panic!("failed on {input}"));
        assert_eq!(parsed.to_string(), expected, "input: {input}");
    }
}

#[test]
fn test_parse_datetime_rejects_garbage() {
    assert!(parse_datetime("").is_none());
    assert!(parse_datetime("sometime next week").is_none());
    assert!(parse_datetime("31.02.2024, 10:00").is_none());
    assert!(parse_datetime("14 Foo 2024, 10:00").is_none());
}

#[test]
fn test_date_only_value() {
    let ts = parse_datetime("14.05.2024").unwrap();
    assert!(ts.is_date_only());
    assert!(ts.offset().is_none());

    let ts = parse_datetime("14.05.2024, 00:00").unwrap();
    assert!(ts.is_date_only());
}
