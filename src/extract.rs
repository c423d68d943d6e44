//! Message extraction from a normalized document

use crate::tree::{Document, NodeId};

/// A message as found in the tree, before its header is parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Header text, set only for quotes that carry a header marker
    pub header: Option<String>,
    pub text: String,
}

/// Walk the document from the outermost message inwards
///
/// The first record is the document body itself; every quote follows its
/// container, so the list runs newest first.
#[must_use]
pub fn extract_messages(doc: &Document) -> Vec<RawMessage> {
    let mut out = Vec::new();
    extract_into(doc, doc.root(), &mut out);
    out
}

fn extract_into(doc: &Document, container: NodeId, out: &mut Vec<RawMessage>) {
    let header_node = if doc.is_named(container, "blockquote") {
        doc.children(container)
            .iter()
            .copied()
            .find(|&c| doc.is_quote_header(c))
    } else {
        None
    };

    let mut parts = Vec::new();
    let mut quotes = Vec::new();
    for &child in doc.children(container) {
        if Some(child) == header_node {
            continue;
        }
        if doc.is_named(child, "blockquote") {
            quotes.push(child);
        } else if doc.is_element(child) {
            let markup = doc.inner_markup(child);
            let markup = markup.trim();
            if !markup.is_empty() {
                parts.push(markup.to_string());
            }
        } else if let Some(text) = doc.text(child) {
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        }
    }

    let header = header_node
        .map(|h| doc.clean_text(h))
        .filter(|h| !h.is_empty());
    out.push(RawMessage {
        header,
        text: parts.join("\n"),
    });

    for quote in quotes {
        extract_into(doc, quote, out);
    }
}
