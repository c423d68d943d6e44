//! Building a [`Document`] from HTML markup

use crate::patterns::EMAIL_REGEX;
use crate::tree::{Document, NodeId};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as DomData, RcDom};
use tracing::debug;

/// `<Name@Host>` as written, before the tokenizer lowercases it
static BRACKETED_ADDRESS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^\s/<>]+@[^\s/<>]+)>").unwrap());

/// Lowercased address to its spelling in the source
fn address_spellings(input: &str) -> HashMap<String, String> {
    let mut spellings = HashMap::new();
    for caps in BRACKETED_ADDRESS_REGEX.captures_iter(input) {
        let written = &caps[1];
        spellings
            .entry(written.to_ascii_lowercase())
            .or_insert_with(|| written.to_string());
    }
    spellings
}

impl Document {
    /// Parse HTML text into a document
    ///
    /// The whole HTML5 tree is kept, including `html`/`head`/`body`; the
    /// normalizer strips them. Doctypes and processing instructions are
    /// dropped.
    #[must_use]
    pub fn parse_html(input: &str) -> Self {
        let input = input.trim_start_matches('\u{feff}');
        let dom = parse_document(RcDom::default(), Default::default()).one(input);

        let spellings = address_spellings(input);
        let mut doc = Self::new();
        let root = doc.root();
        for child in dom.document.children.borrow().iter() {
            doc.import(root, child, &spellings);
        }

        debug!("Parsed HTML into {} nodes", doc.descendants(root).len());
        doc
    }

    fn import(&mut self, parent: NodeId, handle: &Handle, spellings: &HashMap<String, String>) {
        match &handle.data {
            DomData::Document => self.import_children(parent, handle, spellings),
            DomData::Doctype { .. } | DomData::ProcessingInstruction { .. } => {}
            DomData::Text { contents } => {
                let text = self.create_text(contents.borrow().to_string());
                self.append(parent, text);
            }
            DomData::Comment { contents } => {
                let comment = self.create_comment(contents.to_string());
                self.append(parent, comment);
            }
            DomData::Element { name, attrs, .. } => {
                let tag = name.local.to_string().to_ascii_lowercase();

                // `<user@host>` in text is tokenized as an element named after
                // the address; put the address back as text.
                if EMAIL_REGEX.is_match(&tag) {
                    let address = spellings.get(&tag).unwrap_or(&tag);
                    let text = self.create_text(format!("<{address}>"));
                    self.append(parent, text);
                    self.import_children(parent, handle, spellings);
                    return;
                }

                let element = self.create_element(&tag);
                for attr in attrs.borrow().iter() {
                    self.set_attr(element, &attr.name.local, &attr.value);
                }
                self.append(parent, element);
                self.import_children(element, handle, spellings);
            }
        }
    }

    fn import_children(
        &mut self,
        parent: NodeId,
        handle: &Handle,
        spellings: &HashMap<String, String>,
    ) {
        for child in handle.children.borrow().iter() {
            self.import(parent, child, spellings);
        }
    }
}
