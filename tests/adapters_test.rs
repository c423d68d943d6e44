use quote_thread::{
    Document, HeaderKind, HeaderMatch, HeaderThresholds, classify, classify_and_mark,
};

fn first_div(doc: &Document) -> quote_thread::NodeId {
    doc.elements_named(&["div"])[0]
}

fn kind_of(html: &str) -> Option<HeaderKind> {
    let doc = Document::parse_html(html);
    classify(&doc, first_div(&doc), &HeaderThresholds::default()).map(|(kind, _)| kind)
}

#[test]
fn test_forwarded_dividers() {
    assert_eq!(
        kind_of("<div>---------- Forwarded message ----------</div>"),
        Some(HeaderKind::Divider)
    );
    assert_eq!(
        kind_of("<div>-------- Пересылаемое сообщение --------</div>"),
        Some(HeaderKind::Divider)
    );
    assert_eq!(
        kind_of("<div>-------- End of forwarded message --------</div>"),
        Some(HeaderKind::EndDivider)
    );
}

#[test]
fn test_oneline_attribution() {
    assert_eq!(
        kind_of("<div>21.09.2023, 16:13, 'КАМИН' &lt;hotline@kamin.kaluga.ru&gt;:</div>"),
        Some(HeaderKind::OnelineBlock)
    );
    assert_eq!(
        kind_of("<div>On Wednesday, May 08, 2024 1:34 PM you wrote:</div>"),
        Some(HeaderKind::OnelineBlock)
    );
}

#[test]
fn test_key_value_wins_over_oneline() {
    let html = "<div>From: Anna &lt;anna@example.com&gt; Sent: 14.05.2024, 17:35 \
                To: bob@example.com Subject: Hi</div>";
    assert_eq!(kind_of(html), Some(HeaderKind::KeyValueBlock));
}

#[test]
fn test_plain_text_is_not_a_header() {
    assert_eq!(kind_of("<div>Hello there, how are you doing?</div>"), None);
    assert_eq!(kind_of("<div>Meeting at 16:13</div>"), None);
}

#[test]
fn test_marked_descendant_blocks_ancestor() {
    let mut doc = Document::parse_html(
        "<div><div>From: A &lt;a@x.com&gt; Sent: 14.05.2024, 17:35 To: b@x.com</div></div>",
    );
    let divs = doc.elements_named(&["div"]);
    let limits = HeaderThresholds::default();

    let marked = classify_and_mark(&mut doc, divs[1], &limits);

    assert_eq!(marked.map(|(kind, _)| kind), Some(HeaderKind::KeyValueBlock));
    assert!(classify(&doc, divs[0], &limits).is_none());
}

#[test]
fn test_multi_div_run_is_merged() {
    let mut doc = Document::parse_html(
        "<div>From: Anna &lt;anna@example.com&gt;</div>\
         <div>Sent: 14.05.2024, 17:35</div>\
         <div>To: Bob &lt;bob@example.com&gt;</div>\
         <div>Subject: Hi</div>",
    );
    let divs = doc.elements_named(&["div"]);
    let limits = HeaderThresholds::default();

    let (kind, found) = classify(&doc, divs[1], &limits).unwrap();
    assert_eq!(kind, HeaderKind::MultiDivBlock);
    assert_eq!(found, HeaderMatch::Run(divs.clone()));

    let (_, marked) = classify_and_mark(&mut doc, divs[1], &limits).unwrap();

    assert_eq!(marked, divs[0]);
    assert_eq!(doc.elements_named(&["div"]), vec![divs[0]]);
    assert_eq!(
        doc.clean_text(marked),
        "From: Anna <anna@example.com> Sent: 14.05.2024, 17:35 \
         To: Bob <bob@example.com> Subject: Hi"
    );
    assert_eq!(doc.header_kind(marked), Some(HeaderKind::MultiDivBlock));
}

#[test]
fn test_text_node_header_is_wrapped() {
    let mut doc =
        Document::parse_html("21.09.2023, 16:13, 'КАМИН' &lt;hotline@kamin.kaluga.ru&gt;:");
    let text = doc
        .descendants(doc.root())
        .into_iter()
        .find(|&n| doc.is_text(n))
        .unwrap();

    let (kind, marked) =
        classify_and_mark(&mut doc, text, &HeaderThresholds::default()).unwrap();

    assert_eq!(kind, HeaderKind::OnelineBlock);
    assert_ne!(marked, text);
    assert!(doc.is_named(marked, "div"));
    assert!(!doc.is_alive(text));
    assert!(doc.is_quote_header(marked));
}

#[test]
fn test_thresholds_are_configurable() {
    let html = "<div>21.09.2023, 16:13, 'КАМИН' &lt;hotline@kamin.kaluga.ru&gt;:</div>";
    let doc = Document::parse_html(html);
    let strict = HeaderThresholds {
        oneline_max_len: 20,
        ..HeaderThresholds::default()
    };

    assert!(classify(&doc, first_div(&doc), &strict).is_none());
}

#[test]
fn test_kind_tags() {
    for kind in HeaderKind::PRIORITY {
        assert_eq!(HeaderKind::from_tag(kind.tag()), Some(kind));
    }
    assert!(!HeaderKind::Divider.is_quote_header());
    assert!(!HeaderKind::EndDivider.is_quote_header());
    assert!(HeaderKind::OnelineBlock.is_quote_header());
    assert_eq!(HeaderKind::from_tag("quote"), None);
}
