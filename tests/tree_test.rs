use quote_thread::{Document, HeaderKind, MARKER_ATTR, Marker, NodeId};

fn div_with(doc: &mut Document, parts: &[&str]) -> NodeId {
    let div = doc.create_element("div");
    for part in parts {
        let node = if *part == "br" {
            doc.create_element("br")
        } else {
            doc.create_text(*part)
        };
        doc.append(div, node);
    }
    let root = doc.root();
    doc.append(root, div);
    div
}

#[test]
fn test_unwrap_splices_children_in_place() {
    let mut doc = Document::new();
    let div = div_with(&mut doc, &["a"]);
    let span = doc.create_element("span");
    let inner = doc.create_text("b");
    doc.append(span, inner);
    doc.append(div, span);
    let tail = doc.create_text("c");
    doc.append(div, tail);

    doc.unwrap(span);

    assert!(!doc.is_alive(span));
    assert_eq!(doc.children(div).len(), 3);
    assert_eq!(doc.parent(inner), Some(div));
    assert_eq!(doc.outer_html(div), "<div>abc</div>");
}

#[test]
fn test_move_keeps_single_parent() {
    let mut doc = Document::new();
    let first = div_with(&mut doc, &[]);
    let second = div_with(&mut doc, &[]);
    let p = doc.create_element("p");
    doc.append(first, p);

    doc.append(second, p);

    assert!(doc.children(first).is_empty());
    assert_eq!(doc.children(second), &[p]);
    assert_eq!(doc.parent(p), Some(second));
}

#[test]
fn test_decompose_destroys_subtree() {
    let mut doc = Document::new();
    let div = div_with(&mut doc, &["x", "br", "y"]);
    let children = doc.children(div).to_vec();

    doc.decompose(div);

    assert!(!doc.is_alive(div));
    assert!(children.iter().all(|&c| !doc.is_alive(c)));
    assert!(doc.children(doc.root()).is_empty());
}

#[test]
fn test_replace_with() {
    let mut doc = Document::new();
    let div = div_with(&mut doc, &["old"]);
    let old = doc.children(div)[0];
    let new = doc.create_text("new");

    doc.replace_with(old, new);

    assert!(!doc.is_alive(old));
    assert_eq!(doc.text_content(div), "new");
}

#[test]
fn test_significant_siblings() {
    let mut doc = Document::new();
    let div = div_with(&mut doc, &["x", "  ", "br"]);
    let span = doc.create_element("span");
    doc.append(div, span);
    let x = doc.children(div)[0];
    let br = doc.children(div)[2];

    assert_eq!(doc.next_significant_sibling(x, false), Some(br));
    assert_eq!(doc.next_significant_sibling(x, true), Some(span));
    assert_eq!(doc.previous_significant_sibling(span, true), Some(x));
    assert_eq!(doc.previous_significant_sibling(x, true), None);
}

#[test]
fn test_insert_before_and_after() {
    let mut doc = Document::new();
    let div = div_with(&mut doc, &["b"]);
    let b = doc.children(div)[0];
    let a = doc.create_text("a");
    let c = doc.create_text("c");

    doc.insert_before(b, a);
    doc.insert_after(b, c);

    assert_eq!(doc.children(div), &[a, b, c]);
    assert_eq!(doc.child_index(c), Some(2));
}

#[test]
fn test_clean_text_joins_trimmed_fragments() {
    let mut doc = Document::new();
    let div = div_with(&mut doc, &["  From:  ", "br", " A ", "   "]);

    assert_eq!(doc.clean_text(div), "From: A");
    assert_eq!(doc.text_content(div), "  From:   A    ");
}

#[test]
fn test_marker_written_to_markup() {
    let mut doc = Document::new();
    let div = div_with(&mut doc, &["a < b"]);
    doc.set_marker(div, Marker::Header(HeaderKind::KeyValueBlock));

    let html = doc.outer_html(div);

    assert_eq!(
        html,
        format!("<div {MARKER_ATTR}=\"quote_header_block\">a &lt; b</div>")
    );
    assert_eq!(doc.inner_markup(div), "a < b");
    assert_eq!(doc.inner_html(div), "a &lt; b");
    assert_eq!(
        Marker::from_tag("quote_header_block"),
        Some(Marker::Header(HeaderKind::KeyValueBlock))
    );
    assert_eq!(Marker::from_tag("quote"), Some(Marker::Quote));
    assert!(!Marker::Quote.is_quote_header());
}

#[test]
fn test_decompose_drops_marker() {
    let mut doc = Document::new();
    let div = div_with(&mut doc, &["header"]);
    doc.set_marker(div, Marker::Header(HeaderKind::OnelineBlock));

    doc.decompose(div);

    assert_eq!(doc.marker(div), None);
    assert!(doc.quote_headers().is_empty());
}

#[test]
fn test_parse_html_recovers_bracketed_address() {
    let doc = Document::parse_html("<div>From: A <a@x.com> wrote</div>");
    let div = doc.elements_named(&["div"])[0];

    assert_eq!(doc.clean_text(div), "From: A <a@x.com> wrote");
    assert!(doc.elements().iter().all(|&e| !doc.is_named(e, "a@x.com")));
}

#[test]
fn test_parse_html_strips_bom_and_keeps_structure() {
    let doc = Document::parse_html("\u{feff}<p>Hi</p><!-- note -->");
    let p = doc.elements_named(&["p"]);

    assert_eq!(p.len(), 1);
    assert_eq!(doc.text_content(p[0]), "Hi");
    assert_eq!(doc.elements_named(&["body"]).len(), 1);
}

#[test]
fn test_depth_and_ancestry() {
    let mut doc = Document::new();
    let div = div_with(&mut doc, &["x"]);
    let x = doc.children(div)[0];

    assert_eq!(doc.depth(div), 1);
    assert_eq!(doc.depth(x), 2);
    assert!(doc.is_ancestor_of(div, x));
    assert!(!doc.is_ancestor_of(x, div));
    assert!(doc.is_attached(x));
}

#[test]
fn test_move_into_own_subtree_is_refused() {
    let mut doc = Document::new();
    let root = doc.root();
    let outer = doc.create_element("div");
    let inner = doc.create_element("div");
    doc.append(root, outer);
    doc.append(outer, inner);

    doc.append(inner, outer);
    doc.prepend(outer, outer);
    doc.insert_before(inner, outer);
    doc.insert_after(inner, outer);

    assert_eq!(doc.parent(outer), Some(root));
    assert_eq!(doc.parent(inner), Some(outer));
    assert_eq!(doc.children(root), &[outer]);
    assert_eq!(doc.descendants(outer), vec![inner]);
    assert!(!doc.can_adopt(inner, outer));
    assert!(doc.can_adopt(root, inner));
}

#[test]
fn test_parse_html_keeps_address_case() {
    let doc = Document::parse_html("<div>From: Anna <Anna.Smith@X.com> wrote</div>");
    let div = doc.elements_named(&["div"])[0];

    assert_eq!(doc.clean_text(div), "From: Anna <Anna.Smith@X.com> wrote");
}
