//! Markup cleanup: media placeholders, system tags, empty nodes, attributes,
//! tag vocabulary, and orphan wrapping

use super::{BLOCK_TAGS, Pass, TABLE_TAGS, fixpoint};
use crate::adapters;
use crate::config::{HeaderThresholds, ParserOptions};
use crate::error::Result;
use crate::patterns::EMAIL_REGEX;
use crate::tree::{Document, MARKER_ATTR, Marker, NodeId};

/// Unwrapped, keeping their content
const TRANSPARENT_TAGS: &[&str] = &["html", "body"];

/// Removed together with their content
const SYSTEM_TAGS: &[&str] = &["head", "style", "meta", "title", "script", "link", "base"];

/// Survive the empty-node sweep even without text
const KEEP_EMPTY_TAGS: &[&str] = &["br", "hr"];

const QUOTE_HINT_CLASS: &str = "mail-quote-collapse";

/// Replace images and links with plain-text equivalents
pub(super) fn convert_media(doc: &mut Document, options: &ParserOptions) {
    for img in doc.elements_named(&["img"]) {
        let label = if options.remove_images {
            options.removed_image_label.clone()
        } else {
            let src = doc.attr(img, "src").unwrap_or_default();
            let alt = doc.attr(img, "alt").unwrap_or_default().trim();
            let mut label = options.image_label.clone();
            if !alt.is_empty() {
                label.push(' ');
                label.push_str(alt);
            }
            format!("![{label}]({src})")
        };

        let p = doc.create_element("p");
        doc.set_text_content(p, label);
        doc.replace_with(img, p);
    }

    for link in doc.elements_named(&["a"]) {
        if !doc.is_alive(link) {
            continue;
        }
        let href = doc.attr(link, "href").unwrap_or_default().trim().to_string();
        let text = doc.clean_text(link);

        if href.is_empty() {
            let replacement = doc.create_text(text);
            doc.replace_with(link, replacement);
            continue;
        }

        let (name, content) = if EMAIL_REGEX.is_match(&text) {
            ("span", text)
        } else {
            let name = if text.contains(&options.image_label) {
                "p"
            } else {
                "span"
            };
            let content = if text == href {
                text
            } else {
                format!("[{text}]({href}) ")
            };
            (name, content)
        };

        let replacement = doc.create_element(name);
        doc.set_text_content(replacement, content);
        doc.replace_with(link, replacement);
    }
}

/// Drop document scaffolding, empty nodes, comments and attributes
///
/// Returns the iteration count of the empty-node sweep.
pub(super) fn clear_html(doc: &mut Document, limit: usize) -> Result<usize> {
    clear_system_tags(doc);
    let iterations = fixpoint(Pass::ClearHtml, limit, || clear_empty(doc))?;
    clear_blank_text(doc);
    clear_attributes(doc);
    Ok(iterations)
}

fn clear_system_tags(doc: &mut Document) {
    for node in doc.elements_named(TRANSPARENT_TAGS) {
        doc.unwrap(node);
    }
    for node in doc.elements_named(SYSTEM_TAGS) {
        if doc.is_alive(node) {
            doc.decompose(node);
        }
    }
    for node in doc.descendants(doc.root()) {
        if doc.is_comment(node) {
            doc.decompose(node);
        }
    }
}

fn clear_empty(doc: &mut Document) -> bool {
    let mut changed = false;
    for node in doc.elements() {
        if !doc.is_alive(node) || doc.is_named_any(node, KEEP_EMPTY_TAGS) {
            continue;
        }
        if doc.clean_text(node).is_empty() && !doc.has_descendant_named(node, KEEP_EMPTY_TAGS) {
            doc.decompose(node);
            changed = true;
        }
    }
    changed
}

fn clear_blank_text(doc: &mut Document) {
    for node in doc.descendants(doc.root()) {
        if doc.is_blank_text(node) {
            doc.decompose(node);
        }
    }
}

fn clear_attributes(doc: &mut Document) {
    for node in doc.elements() {
        if let Some(marker) = doc.attr(node, MARKER_ATTR).and_then(Marker::from_tag) {
            doc.set_marker(node, marker);
        }
        let quote_hint = doc
            .attr(node, "class")
            .is_some_and(|class| class.split_whitespace().any(|c| c == QUOTE_HINT_CLASS));
        if quote_hint {
            doc.set_marker(node, Marker::Quote);
        }
        doc.clear_attrs(node);
    }
}

/// Reduce every tag to `div` or `span`, keeping tables, breaks and quotes
pub(super) fn simplify_tags(doc: &mut Document) {
    for node in doc.elements() {
        let Some(name) = doc.name(node) else {
            continue;
        };
        if TABLE_TAGS.contains(&name)
            || matches!(name, "br" | "hr" | "div" | "span" | "blockquote")
        {
            continue;
        }
        let generic = if BLOCK_TAGS.contains(&name) {
            "div"
        } else {
            "span"
        };
        doc.set_name(node, generic);
    }
}

fn breaks_run(doc: &Document, node: NodeId) -> bool {
    doc.is_named_any(node, &["br", "div", "blockquote"])
}

/// Runs of bare text mixed with spans, directly under `parent`
fn orphan_runs(doc: &Document, parent: NodeId) -> Vec<Vec<NodeId>> {
    let children = doc.children(parent);
    let mut runs = Vec::new();
    let mut i = 0;

    while i < children.len() {
        if doc.is_blank_text(children[i]) || breaks_run(doc, children[i]) {
            i += 1;
            continue;
        }

        let mut run = Vec::new();
        let mut j = i;
        while j < children.len() {
            let child = children[j];
            if doc.is_blank_text(child) {
                j += 1;
                continue;
            }
            if breaks_run(doc, child) {
                break;
            }
            if doc.is_text(child) || doc.is_named(child, "span") {
                run.push(child);
                j += 1;
            } else {
                break;
            }
        }

        let has_text = run.iter().any(|&n| doc.is_text(n));
        let has_span = run.iter().any(|&n| doc.is_named(n, "span"));
        if run.len() > 1 && has_text && has_span {
            runs.push(run);
        }

        i = if j > i { j } else { i + 1 };
    }
    runs
}

/// Wrap orphan runs in a `div` when, and only when, the run reads as a header
pub(super) fn wrap_orphans(doc: &mut Document, limits: &HeaderThresholds) {
    let mut parents = vec![doc.root()];
    parents.extend(doc.elements());

    let runs: Vec<(NodeId, Vec<NodeId>)> = parents
        .into_iter()
        .flat_map(|parent| {
            orphan_runs(doc, parent)
                .into_iter()
                .map(move |run| (parent, run))
        })
        .collect();

    for (parent, run) in runs {
        if !run.iter().all(|&n| doc.parent(n) == Some(parent)) {
            continue;
        }
        let Some(index) = doc.child_index(run[0]) else {
            continue;
        };

        let wrapper = doc.create_element("div");
        for &node in &run {
            doc.append(wrapper, node);
        }

        if adapters::classify(doc, wrapper, limits).is_some() {
            doc.insert_at(parent, index, wrapper);
        } else {
            for (offset, &node) in run.iter().enumerate() {
                doc.insert_at(parent, index + offset, node);
            }
            doc.decompose(wrapper);
        }
    }
}
