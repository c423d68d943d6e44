//! Header detection, span flattening and forwarded-message promotion

use crate::adapters::{self, HeaderKind};
use crate::config::HeaderThresholds;
use crate::tree::{Document, Marker, NodeId};
use std::collections::HashSet;

/// Nodes worth testing against the header adapters, in discovery order
fn candidates(doc: &Document) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    let mut add = |node: Option<NodeId>| {
        if let Some(node) = node
            && !doc.is_blank_text(node)
            && seen.insert(node)
        {
            found.push(node);
        }
    };

    for hr in doc.elements_named(&["hr"]) {
        add(doc.next_significant_sibling(hr, true));
    }

    for quote in doc.elements_named(&["blockquote"]) {
        add(doc.first_significant_child(quote, true));

        if let Some(prev) = doc.previous_significant_sibling(quote, true) {
            add(Some(prev));
        } else if let Some(parent) = doc.parent(quote)
            && doc.is_named_any(parent, &["div", "span"])
            && doc.first_significant_child(parent, true) == Some(quote)
        {
            add(doc.previous_significant_sibling(parent, true));
        }
    }

    for node in doc.elements_named(&["div", "p", "span", "td", "th"]) {
        add(Some(node));
    }

    found
}

/// Mark every header, deepest candidates first
pub(super) fn detect_headers(doc: &mut Document, limits: &HeaderThresholds) {
    let mut nodes = candidates(doc);
    // A text node sits one level below the element it would be wrapped into
    nodes.sort_by_key(|&n| std::cmp::Reverse(doc.depth(n) + usize::from(doc.is_text(n))));

    for node in nodes {
        if !doc.is_alive(node) || doc.parent(node).is_none() || doc.marker(node).is_some() {
            continue;
        }
        // A marked cell leaves its row once relocation unwraps the table
        if let Some((_, marked)) = adapters::classify_and_mark(doc, node, limits)
            && doc.is_named_any(marked, &["td", "th"])
        {
            doc.set_name(marked, "div");
        }
    }
}

/// Remove every `span`, merging inline text into its surroundings
pub(super) fn flatten_spans(doc: &mut Document) {
    for span in doc.elements_named(&["span"]) {
        if doc.header_kind(span).is_some() {
            doc.set_name(span, "div");
        }
    }

    let mut spans = doc.elements_named(&["span"]);
    super::deepest_first(doc, &mut spans);

    for span in spans {
        if !doc.is_alive(span) {
            continue;
        }
        if doc.has_descendant_named(span, &["div", "blockquote"]) {
            doc.unwrap(span);
            continue;
        }

        let has_content = !doc.clean_text(span).is_empty()
            || doc.children(span).iter().any(|&c| doc.is_element(c));
        if !has_content {
            doc.decompose(span);
            continue;
        }

        let before = doc.create_text(" ");
        let after = doc.create_text(" ");
        doc.insert_before(span, before);
        doc.insert_after(span, after);
        doc.unwrap(span);
    }
}

fn introduces_quote(doc: &Document, node: NodeId) -> bool {
    let oneline = Some(HeaderKind::OnelineBlock);
    if doc.header_kind(node) == oneline {
        return true;
    }
    doc.is_named(node, "div")
        && doc
            .descendants(node)
            .into_iter()
            .find(|&n| doc.is_element(n))
            .is_some_and(|first| doc.header_kind(first) == oneline)
}

/// Turn the first divider followed by a one-line header into a quote
///
/// Everything after the divider up to its end divider moves into a new
/// `blockquote`; both dividers are dropped. Returns whether anything moved.
pub(super) fn promote_forwarded(doc: &mut Document) -> bool {
    for divider in doc.marked_with(Marker::Header(HeaderKind::Divider)) {
        let Some(next) = doc.next_significant_sibling(divider, true) else {
            continue;
        };
        if !doc.is_element(next) || !introduces_quote(doc, next) {
            continue;
        }

        let mut content = Vec::new();
        let mut end = None;
        let mut current = doc.next_sibling(divider);
        while let Some(node) = current {
            if doc.header_kind(node) == Some(HeaderKind::EndDivider) {
                end = Some(node);
                break;
            }
            content.push(node);
            current = doc.next_sibling(node);
        }

        let quote = doc.create_element("blockquote");
        doc.insert_before(divider, quote);
        for node in content {
            doc.append(quote, node);
        }
        doc.decompose(divider);
        if let Some(end) = end {
            doc.decompose(end);
        }
        return true;
    }
    false
}
