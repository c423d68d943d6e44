//! Line break and whitespace canonicalization

use crate::tree::{Document, NodeId};
use regex::Regex;
use std::sync::LazyLock;

static SPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new("[ \t\u{a0}]+").unwrap());
static NEWLINE_SPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" *\n *").unwrap());
static MULTI_NEWLINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

const CONTAINERS: &[&str] = &["div", "blockquote", "p", "li", "td", "th"];

enum Item {
    Text(String),
    Node(NodeId),
}

fn canonical_text(raw: &str) -> String {
    let text = raw.replace('\u{ad}', "");
    let text = SPACE_REGEX.replace_all(&text, " ");
    let text = NEWLINE_SPACE_REGEX.replace_all(&text, "\n");
    MULTI_NEWLINE_REGEX.replace_all(&text, "\n\n").into_owned()
}

/// Merge each text run of a container, turning `<br>` into `\n`
pub(super) fn canonicalize(doc: &mut Document) {
    for container in doc.elements_named(CONTAINERS) {
        if doc.is_alive(container) {
            canonicalize_container(doc, container);
        }
    }
}

fn canonicalize_container(doc: &mut Document, container: NodeId) {
    let mut items = Vec::new();
    let mut buffer = String::new();

    for child in doc.children(container).to_vec() {
        if doc.is_named(child, "br") {
            buffer.push('\n');
            doc.decompose(child);
        } else if let Some(text) = doc.text(child) {
            buffer.push_str(text);
            doc.decompose(child);
        } else {
            // Any element ends the current run
            if !buffer.is_empty() {
                items.push(Item::Text(std::mem::take(&mut buffer)));
            }
            doc.extract(child);
            items.push(Item::Node(child));
        }
    }
    if !buffer.is_empty() {
        items.push(Item::Text(buffer));
    }

    for item in items {
        match item {
            Item::Text(raw) => {
                let text = canonical_text(&raw);
                if !text.is_empty() {
                    let node = doc.create_text(text);
                    doc.append(container, node);
                }
            }
            Item::Node(node) => doc.append(container, node),
        }
    }
}
