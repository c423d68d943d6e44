//! Arena-backed mutable document tree
//!
//! Nodes live in one vector and refer to each other by [`NodeId`]. A node is
//! owned by exactly one parent's child list; the parent link is only used
//! for navigation. Every insertion detaches the node from its previous
//! position first, so a move can never leave a node under two parents.
//!
//! Header classification results are kept in a side table rather than on the
//! nodes themselves (see [`Marker`]).

use crate::adapters::HeaderKind;
use std::collections::HashMap;

/// Attribute that carries a [`Marker`] through serialized markup
pub const MARKER_ATTR: &str = "data-thread-marker";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Stable handle to a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Payload of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The single root
    Document,
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

/// Classification attached to a node by the normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Matched by a header adapter
    Header(HeaderKind),

    /// Webmail hint that the element is a collapsed quote
    Quote,
}

impl Marker {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Header(kind) => kind.tag(),
            Self::Quote => "quote",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag == "quote" {
            return Some(Self::Quote);
        }
        HeaderKind::from_tag(tag).map(Self::Header)
    }

    /// Attribution headers, as opposed to forwarding dividers and quote hints
    #[must_use]
    pub const fn is_quote_header(self) -> bool {
        matches!(self, Self::Header(kind) if kind.is_quote_header())
    }
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    alive: bool,
}

/// A mutable HTML-like tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    markers: HashMap<NodeId, Marker>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document holding only its root
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
                alive: true,
            }],
            markers: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
            alive: true,
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(NodeData::Element {
            name: name.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(text.into()))
    }

    // --- inspection ---

    #[must_use]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    /// False once the node has been unwrapped or decomposed
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).alive
    }

    /// Alive and reachable from the root
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if !self.is_alive(current) {
                return false;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return current == self.root(),
            }
        }
    }

    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn set_name(&mut self, id: NodeId, new_name: &str) {
        if let NodeData::Element { name, .. } = &mut self.node_mut(id).data {
            *name = new_name.to_ascii_lowercase();
        }
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Element { .. })
    }

    #[must_use]
    pub fn is_named(&self, id: NodeId, name: &str) -> bool {
        self.name(id) == Some(name)
    }

    #[must_use]
    pub fn is_named_any(&self, id: NodeId, names: &[&str]) -> bool {
        self.name(id).is_some_and(|n| names.contains(&n))
    }

    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Text(_))
    }

    #[must_use]
    pub fn is_comment(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Comment(_))
    }

    /// Text node made only of whitespace
    #[must_use]
    pub fn is_blank_text(&self, id: NodeId) -> bool {
        self.text(id).is_some_and(|t| t.trim().is_empty())
    }

    #[must_use]
    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        match &self.node(id).data {
            NodeData::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    #[must_use]
    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, key: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data {
            match attrs.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = value.to_string(),
                None => attrs.push((key.to_string(), value.to_string())),
            }
        }
    }

    pub fn clear_attrs(&mut self, id: NodeId) {
        if let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data {
            attrs.clear();
        }
    }

    // --- navigation ---

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    #[must_use]
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.child_index(id)?;
        self.children(parent).get(index + 1).copied()
    }

    #[must_use]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.child_index(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    fn is_insignificant(&self, id: NodeId, skip_br: bool) -> bool {
        self.is_blank_text(id) || (skip_br && self.is_named(id, "br"))
    }

    /// Next sibling that is not blank text (nor a line break when `skip_br`)
    #[must_use]
    pub fn next_significant_sibling(&self, id: NodeId, skip_br: bool) -> Option<NodeId> {
        let mut current = self.next_sibling(id);
        while let Some(node) = current {
            if !self.is_insignificant(node, skip_br) {
                return Some(node);
            }
            current = self.next_sibling(node);
        }
        None
    }

    /// Previous sibling that is not blank text (nor a line break when `skip_br`)
    #[must_use]
    pub fn previous_significant_sibling(&self, id: NodeId, skip_br: bool) -> Option<NodeId> {
        let mut current = self.previous_sibling(id);
        while let Some(node) = current {
            if !self.is_insignificant(node, skip_br) {
                return Some(node);
            }
            current = self.previous_sibling(node);
        }
        None
    }

    #[must_use]
    pub fn first_significant_child(&self, id: NodeId, skip_br: bool) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| !self.is_insignificant(c, skip_br))
    }

    /// Number of ancestors
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    #[must_use]
    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// All descendants in document order, excluding `id`
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    /// Every element under the root, in document order
    #[must_use]
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&n| self.is_element(n))
            .collect()
    }

    /// Elements with one of the given names, in document order
    #[must_use]
    pub fn elements_named(&self, names: &[&str]) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&n| self.is_named_any(n, names))
            .collect()
    }

    #[must_use]
    pub fn has_descendant_named(&self, id: NodeId, names: &[&str]) -> bool {
        self.descendants(id)
            .into_iter()
            .any(|n| self.is_named_any(n, names))
    }

    // --- markers ---

    #[must_use]
    pub fn marker(&self, id: NodeId) -> Option<Marker> {
        self.markers.get(&id).copied()
    }

    pub fn set_marker(&mut self, id: NodeId, marker: Marker) {
        self.markers.insert(id, marker);
    }

    pub fn remove_marker(&mut self, id: NodeId) -> Option<Marker> {
        self.markers.remove(&id)
    }

    #[must_use]
    pub fn header_kind(&self, id: NodeId) -> Option<HeaderKind> {
        match self.marker(id) {
            Some(Marker::Header(kind)) => Some(kind),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_quote_header(&self, id: NodeId) -> bool {
        self.marker(id).is_some_and(Marker::is_quote_header)
    }

    #[must_use]
    pub fn has_marked_descendant(&self, id: NodeId) -> bool {
        self.descendants(id)
            .into_iter()
            .any(|n| self.markers.contains_key(&n))
    }

    /// Attached nodes carrying `marker`, in document order
    #[must_use]
    pub fn marked_with(&self, marker: Marker) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&n| self.marker(n) == Some(marker))
            .collect()
    }

    /// Attached attribution headers, in document order
    #[must_use]
    pub fn quote_headers(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&n| self.is_quote_header(n))
            .collect()
    }

    // --- text ---

    /// Raw concatenation of every text node under `id`
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Each text fragment trimmed, blanks dropped, joined by single spaces
    #[must_use]
    pub fn clean_text(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.trim().to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    // --- mutation ---

    /// Detach `id` from its parent and hand it back to the caller
    pub fn extract(&mut self, id: NodeId) -> NodeId {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|&c| c != id);
            self.node_mut(id).parent = None;
        }
        id
    }

    /// Whether `child` may be moved under `parent` without creating a cycle
    #[must_use]
    pub fn can_adopt(&self, parent: NodeId, child: NodeId) -> bool {
        child != parent && !self.is_ancestor_of(child, parent)
    }

    /// Insert `child` into `parent` at `index`, clamped to the child count
    ///
    /// Moving a node under itself or one of its descendants is refused and
    /// leaves the tree untouched.
    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if !self.can_adopt(parent, child) {
            return;
        }
        self.extract(child);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.insert_at(parent, usize::MAX, child);
    }

    pub fn prepend(&mut self, parent: NodeId, child: NodeId) {
        self.insert_at(parent, 0, child);
    }

    /// Place `node` immediately before `reference`
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        if let Some(parent) = self.parent(reference)
            && !self.can_adopt(parent, node)
        {
            return;
        }
        self.extract(node);
        if let (Some(parent), Some(index)) = (self.parent(reference), self.child_index(reference)) {
            self.insert_at(parent, index, node);
        }
    }

    /// Place `node` immediately after `reference`
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        if let Some(parent) = self.parent(reference)
            && !self.can_adopt(parent, node)
        {
            return;
        }
        self.extract(node);
        if let (Some(parent), Some(index)) = (self.parent(reference), self.child_index(reference)) {
            self.insert_at(parent, index + 1, node);
        }
    }

    /// Replace `id` with its children, in place
    pub fn unwrap(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let Some(index) = self.child_index(id) else {
            return;
        };
        let children = std::mem::take(&mut self.node_mut(id).children);
        self.extract(id);
        for (offset, &child) in children.iter().enumerate() {
            self.node_mut(child).parent = None;
            self.insert_at(parent, index + offset, child);
        }
        self.kill(id);
    }

    /// Destroy `id` and its whole subtree
    pub fn decompose(&mut self, id: NodeId) {
        self.extract(id);
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            stack.extend(std::mem::take(&mut self.node_mut(node).children));
            self.kill(node);
        }
    }

    /// Put `replacement` where `id` is and destroy `id`
    pub fn replace_with(&mut self, id: NodeId, replacement: NodeId) {
        self.insert_before(id, replacement);
        self.decompose(id);
    }

    /// Destroy every child of `id`
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.decompose(child);
        }
    }

    /// Replace the children of `id` with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: impl Into<String>) {
        self.clear_children(id);
        let text = self.create_text(text);
        self.append(id, text);
    }

    fn kill(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.alive = false;
        node.parent = None;
        node.children.clear();
        self.markers.remove(&id);
    }

    // --- serialization ---

    /// Markup of the children of `id`, text escaped
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(&mut out, child, true);
        }
        out
    }

    /// Markup of `id` itself, markers written as [`MARKER_ATTR`]
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, id, true);
        out
    }

    /// Children of `id` as markup with text left verbatim
    ///
    /// Used for message bodies, where the text is the payload and escaping it
    /// would only corrupt addresses like `<a@x.com>`.
    #[must_use]
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(&mut out, child, false);
        }
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId, escape: bool) {
        match &self.node(id).data {
            NodeData::Document => {
                for &child in self.children(id) {
                    self.write_node(out, child, escape);
                }
            }
            NodeData::Text(text) if escape => out.push_str(&escape_text(text)),
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Element { name, attrs } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attrs.iter().filter(|(k, _)| k != MARKER_ATTR) {
                    out.push_str(&format!(" {key}=\"{}\"", escape_attr(value)));
                }
                if let Some(marker) = self.marker(id) {
                    out.push_str(&format!(" {MARKER_ATTR}=\"{}\"", marker.tag()));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    return;
                }
                for &child in self.children(id) {
                    self.write_node(out, child, escape);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\u{a0}', "&nbsp;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}
