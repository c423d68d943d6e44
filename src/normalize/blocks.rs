//! Block restructuring: quote relocation, div flattening, quote nesting and
//! remnant redistribution

use super::{Pass, deepest_first, fixpoint, is_removable};
use crate::error::Result;
use crate::tree::{Document, Marker, NodeId};

/// Tags that split a container into separate blocks
const SEPARATOR_TAGS: &[&str] = &[
    "div", "blockquote", "hr", "center", "form", "header", "footer", "ul", "ol",
];

fn is_structural(doc: &Document, node: NodeId) -> bool {
    doc.is_quote_header(node) || doc.is_named_any(node, SEPARATOR_TAGS)
}

fn has_structural_children(doc: &Document, node: NodeId) -> bool {
    doc.children(node).iter().any(|&c| is_structural(doc, c))
}

fn ends_with_br(doc: &Document, node: NodeId) -> bool {
    match doc.children(node).last() {
        Some(&last) if doc.is_named(last, "br") => true,
        Some(&last) if doc.is_element(last) => ends_with_br(doc, last),
        _ => false,
    }
}

fn starts_with_br(doc: &Document, node: NodeId) -> bool {
    doc.children(node)
        .first()
        .is_some_and(|&first| doc.is_named(first, "br"))
}

fn append_br(doc: &mut Document, parent: NodeId) {
    let br = doc.create_element("br");
    doc.append(parent, br);
}

fn prepend_br(doc: &mut Document, parent: NodeId) {
    let br = doc.create_element("br");
    doc.prepend(parent, br);
}

/// Unwrap `parent` if `keep` is its only meaningful child
fn unwrap_sole_wrapper(doc: &mut Document, parent: NodeId, keep: NodeId) -> bool {
    let siblings: Vec<NodeId> = doc
        .children(parent)
        .iter()
        .copied()
        .filter(|&c| c != keep)
        .collect();
    if !siblings.iter().all(|&s| is_removable(doc, s)) {
        return false;
    }
    for sibling in siblings {
        doc.decompose(sibling);
    }
    doc.unwrap(parent);
    true
}

fn unwrap_quotes(doc: &mut Document) -> bool {
    let mut changed = false;
    for quote in doc.elements_named(&["blockquote"]) {
        if !doc.is_alive(quote) {
            continue;
        }
        let Some(parent) = doc.parent(quote) else {
            continue;
        };
        if doc.is_named_any(parent, &["div", "blockquote"])
            && unwrap_sole_wrapper(doc, parent, quote)
        {
            changed = true;
        }
    }
    changed
}

/// Next sibling that is not removable filler
fn next_content_sibling(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut current = doc.next_sibling(node);
    while let Some(n) = current {
        if !is_removable(doc, n) {
            return Some(n);
        }
        current = doc.next_sibling(n);
    }
    None
}

/// Pull each header into the quote that follows it
///
/// Hinted divs become real quotes, headers shed wrappers that hold nothing
/// else, and quotes shed wrappers before and after the move. Returns the
/// iterations of both wrapper sweeps.
pub(super) fn relocate_headers(doc: &mut Document, limit: usize) -> Result<usize> {
    for div in doc.marked_with(Marker::Quote) {
        if doc.is_named(div, "div") {
            doc.set_name(div, "blockquote");
            doc.remove_marker(div);
        }
    }

    for header in doc.quote_headers() {
        while let Some(parent) = doc.parent(header) {
            if parent == doc.root() || doc.is_named(parent, "blockquote") {
                break;
            }
            if !unwrap_sole_wrapper(doc, parent, header) {
                break;
            }
        }
    }

    let mut iterations = fixpoint(Pass::RelocateHeaders, limit, || unwrap_quotes(doc))?;

    for header in doc.quote_headers() {
        let Some(next) = next_content_sibling(doc, header) else {
            continue;
        };
        if !doc.is_named(next, "blockquote") {
            continue;
        }
        let already_headed = doc
            .first_significant_child(next, false)
            .is_some_and(|first| doc.is_quote_header(first));
        if !already_headed {
            doc.prepend(next, header);
        }
    }

    iterations += fixpoint(Pass::RelocateHeaders, limit, || unwrap_quotes(doc))?;
    Ok(iterations)
}

/// Wrap runs of non-structural children of `container` in divs
fn wrap_loose_content(doc: &mut Document, container: NodeId) -> bool {
    let mut modified = false;
    let mut orphans: Vec<NodeId> = Vec::new();

    let mut flush = |doc: &mut Document, orphans: &mut Vec<NodeId>| {
        if let Some(&first) = orphans.first() {
            let div = doc.create_element("div");
            doc.insert_before(first, div);
            for node in orphans.drain(..) {
                doc.append(div, node);
            }
            modified = true;
        }
    };

    for child in doc.children(container).to_vec() {
        if is_structural(doc, child) {
            flush(doc, &mut orphans);
        } else if !(orphans.is_empty() && doc.is_blank_text(child)) {
            orphans.push(child);
        }
    }
    flush(doc, &mut orphans);

    modified
}

/// One round of div flattening
///
/// Loose content in the root and in quotes is wrapped first; only when there
/// is none left are divs unwrapped or merged, deepest first.
pub(super) fn flatten_blocks(doc: &mut Document) -> bool {
    let mut containers = vec![doc.root()];
    containers.extend(doc.elements_named(&["blockquote"]));

    let mut wrapped = false;
    for container in containers {
        wrapped |= wrap_loose_content(doc, container);
    }
    if wrapped {
        return true;
    }

    let mut divs = doc.elements_named(&["div"]);
    deepest_first(doc, &mut divs);

    let mut changed = false;
    for div in divs {
        if !doc.is_alive(div) || doc.is_quote_header(div) {
            continue;
        }
        changed |= flatten_div(doc, div);
    }
    changed
}

fn flatten_div(doc: &mut Document, div: NodeId) -> bool {
    if has_structural_children(doc, div) {
        doc.unwrap(div);
        return true;
    }

    if let Some(prev) = doc.previous_significant_sibling(div, false) {
        if doc.is_named(prev, "div") && !doc.is_quote_header(prev) {
            if !ends_with_br(doc, prev) && !starts_with_br(doc, div) {
                append_br(doc, prev);
            }
            for child in doc.children(div).to_vec() {
                doc.append(prev, child);
            }
            doc.decompose(div);
            return true;
        }

        if !is_structural(doc, prev) {
            let needs_br = !doc.is_named(prev, "br") && !starts_with_br(doc, div);
            doc.extract(prev);
            if needs_br {
                prepend_br(doc, div);
            }
            doc.prepend(div, prev);
            return true;
        }
    }

    if let Some(next) = doc.next_significant_sibling(div, false)
        && !is_structural(doc, next)
    {
        let needs_br = !doc.is_named(next, "br") && !ends_with_br(doc, div);
        doc.extract(next);
        if needs_br {
            append_br(doc, div);
        }
        doc.append(div, next);
        return true;
    }

    false
}

/// Give every header a quote of its own, absorbing what follows it
pub(super) fn ensure_quotes(doc: &mut Document) {
    for header in doc.quote_headers() {
        if !doc.is_alive(header) {
            continue;
        }
        let Some(parent) = doc.parent(header) else {
            continue;
        };
        if doc.is_named(parent, "blockquote")
            && doc.first_significant_child(parent, false) == Some(header)
        {
            continue;
        }

        let quote = doc.create_element("blockquote");
        doc.insert_before(header, quote);
        doc.append(quote, header);

        while let Some(next) = doc.next_sibling(quote) {
            if doc.is_quote_header(next) {
                break;
            }
            doc.append(quote, next);
        }
    }
}

/// Move each quote, with everything after it, into a quote right before it
pub(super) fn nest_quotes(doc: &mut Document) {
    let quotes = doc.elements_named(&["blockquote"]);
    for quote in quotes.into_iter().rev() {
        if !doc.is_alive(quote) {
            continue;
        }
        let Some(prev) = doc.previous_significant_sibling(quote, false) else {
            continue;
        };
        if !doc.is_named(prev, "blockquote") {
            continue;
        }

        let mut moving = vec![quote];
        let mut current = doc.next_sibling(quote);
        while let Some(node) = current {
            moving.push(node);
            current = doc.next_sibling(node);
        }
        for node in moving {
            doc.append(prev, node);
        }
    }
}

fn last_is_br(doc: &Document, node: NodeId) -> bool {
    doc.children(node)
        .last()
        .is_some_and(|&last| doc.is_named(last, "br"))
}

fn separate(doc: &mut Document, target: NodeId) {
    if !doc.children(target).is_empty() && !last_is_br(doc, target) {
        append_br(doc, target);
    }
}

/// Body div directly before `quote`, created when missing
fn body_before(doc: &mut Document, quote: NodeId) -> NodeId {
    let mut prev = doc.previous_sibling(quote);
    while let Some(p) = prev {
        if doc.is_blank_text(p) {
            prev = doc.previous_sibling(p);
            continue;
        }
        if doc.is_named(p, "div") && !doc.is_quote_header(p) {
            return p;
        }
        break;
    }
    let div = doc.create_element("div");
    doc.insert_before(quote, div);
    div
}

/// Move content trailing each quote into the body before it, level by level
pub(super) fn move_remnants(doc: &mut Document) {
    let mut container = doc.root();

    loop {
        let Some(quote) = doc
            .children(container)
            .iter()
            .copied()
            .find(|&c| doc.is_named(c, "blockquote"))
        else {
            break;
        };

        let target = body_before(doc, quote);

        let mut remnants = Vec::new();
        let mut current = doc.next_sibling(quote);
        while let Some(node) = current {
            remnants.push(node);
            current = doc.next_sibling(node);
        }

        if !remnants.is_empty() {
            separate(doc, target);
        }
        for node in remnants {
            doc.extract(node);
            if doc.is_named(node, "div") {
                if doc.children(node).is_empty() {
                    doc.decompose(node);
                    continue;
                }
                separate(doc, target);
                for child in doc.children(node).to_vec() {
                    doc.append(target, child);
                }
                doc.decompose(node);
            } else {
                if !doc.is_named(node, "br") {
                    separate(doc, target);
                }
                doc.append(target, node);
            }
        }

        container = quote;
    }
}
