//! Quote header classification
//!
//! Each [`HeaderKind`] knows how to recognize one style of quote attribution
//! and how to collapse a recognized node into a single marked text block.
//! Kinds are tried in [`HeaderKind::PRIORITY`] order and the first match wins.

use crate::config::HeaderThresholds;
use crate::patterns::{
    DATE_REGEX, EMAIL_REGEX, LABEL_REGEXES, LEADING_LABEL_REGEX, TIME_REGEX, has_label,
};
use crate::tree::{Document, Marker, NodeId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

static DIVIDER_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"(?i)^-+\s*(?:Пересылаемое сообщение|Forwarded message|Original Message)\s*-+$")
        .unwrap()
});

static END_DIVIDER_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"(?i)^-+\s*(?:Конец пересылаемого сообщения|End of forwarded message)\s*-+$")
        .unwrap()
});

const SENDER_KEYWORDS: &[&str] = &["от", "from", "sender", "via", "написал", "wrote"];
const ACTION_PHRASES: &[&str] = &["вы писали", "you wrote", "wrote"];

/// Style of a recognized quote header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderKind {
    /// `---- Forwarded message ----`
    Divider,
    /// `---- End of forwarded message ----`
    EndDivider,
    /// Attribution split over several adjacent containers
    MultiDivBlock,
    /// `From: ... Sent: ... To: ... Subject: ...`
    KeyValueBlock,
    /// `On <date>, <name> wrote:`
    OnelineBlock,
}

/// What a successful match learned about the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderMatch {
    /// The node alone is the header
    Single,
    /// The header spans these sibling containers, in document order
    Run(Vec<NodeId>),
}

impl HeaderKind {
    pub const PRIORITY: [Self; 5] = [
        Self::Divider,
        Self::EndDivider,
        Self::MultiDivBlock,
        Self::KeyValueBlock,
        Self::OnelineBlock,
    ];

    /// Marker value written into serialized markup
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Divider => "divider",
            Self::EndDivider => "end_divider",
            Self::MultiDivBlock => "quote_header_multiple_block",
            Self::KeyValueBlock => "quote_header_block",
            Self::OnelineBlock => "quote_header_oneline",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Dividers only bound forwarded regions; the rest attribute a message
    #[must_use]
    pub const fn is_quote_header(self) -> bool {
        !matches!(self, Self::Divider | Self::EndDivider)
    }

    /// Test `node` against this kind
    #[must_use]
    pub fn matches(
        self,
        doc: &Document,
        node: NodeId,
        limits: &HeaderThresholds,
    ) -> Option<HeaderMatch> {
        if doc.has_marked_descendant(node) {
            return None;
        }
        match self {
            Self::Divider => is_divider(doc, node, &DIVIDER_REGEX).then_some(HeaderMatch::Single),
            Self::EndDivider => {
                is_divider(doc, node, &END_DIVIDER_REGEX).then_some(HeaderMatch::Single)
            }
            Self::MultiDivBlock => match_multi_div(doc, node, limits),
            Self::KeyValueBlock => {
                is_key_value_block(doc, node, limits).then_some(HeaderMatch::Single)
            }
            Self::OnelineBlock => is_oneline(doc, node, limits).then_some(HeaderMatch::Single),
        }
    }

    /// Collapse a matched node into one marked text block
    ///
    /// Returns the marked node, which differs from `node` when a bare text
    /// node had to be wrapped. Nothing changes when the node has no text.
    pub fn mark(self, doc: &mut Document, node: NodeId, found: HeaderMatch) -> Option<NodeId> {
        match found {
            HeaderMatch::Single => mark_single(doc, node, self),
            HeaderMatch::Run(members) => mark_run(doc, &members, self),
        }
    }
}

/// First kind in priority order that matches `node`
#[must_use]
pub fn classify(
    doc: &Document,
    node: NodeId,
    limits: &HeaderThresholds,
) -> Option<(HeaderKind, HeaderMatch)> {
    HeaderKind::PRIORITY
        .into_iter()
        .find_map(|kind| kind.matches(doc, node, limits).map(|found| (kind, found)))
}

/// Classify `node` and mark it with the winning kind
pub fn classify_and_mark(
    doc: &mut Document,
    node: NodeId,
    limits: &HeaderThresholds,
) -> Option<(HeaderKind, NodeId)> {
    let (kind, found) = classify(doc, node, limits)?;
    let marked = kind.mark(doc, node, found)?;
    trace!("Marked node {} as {}", marked.index(), kind.tag());
    Some((kind, marked))
}

fn is_divider(doc: &Document, node: NodeId, pattern: &Regex) -> bool {
    pattern.is_match(&doc.clean_text(node))
}

/// Date, time and address signals of a candidate line
struct LineSignals {
    date: bool,
    time: bool,
    email: bool,
    colon: bool,
}

impl LineSignals {
    fn of(text: &str) -> Self {
        Self {
            date: DATE_REGEX.is_match(text),
            time: TIME_REGEX.is_match(text),
            email: EMAIL_REGEX.is_match(text),
            colon: text.trim_end().ends_with(':'),
        }
    }

    /// `21.09.2023, 16:13, "Name" <a@x.com>:`
    const fn is_datetime_line(&self) -> bool {
        self.date && self.time && self.email && self.colon
    }
}

fn is_oneline(doc: &Document, node: NodeId, limits: &HeaderThresholds) -> bool {
    let text = doc.clean_text(node);
    let len = text.chars().count();
    if len < limits.oneline_min_len || len > limits.oneline_max_len {
        return false;
    }
    if text.matches('\n').count() > limits.oneline_max_newlines {
        return false;
    }

    let lower = text.to_lowercase();
    let signals = LineSignals::of(&text);
    let has_keyword = SENDER_KEYWORDS.iter().any(|k| lower.contains(k));
    let has_action = ACTION_PHRASES.iter().any(|p| lower.contains(p));

    if has_action && signals.colon && (signals.date || signals.time) {
        return true;
    }

    signals.date && signals.time && (signals.email || (has_keyword && signals.colon))
}

fn is_key_value_block(doc: &Document, node: NodeId, limits: &HeaderThresholds) -> bool {
    if !doc.is_element(node) {
        return false;
    }

    let text = doc.clean_text(node);
    let len = text.chars().count();
    if len < limits.key_value_min_len || len > limits.key_value_max_len {
        return false;
    }

    let starts: Vec<usize> = LABEL_REGEXES
        .iter()
        .filter_map(|re| re.find(&text))
        .map(|m| text[..m.start()].chars().count())
        .collect();
    if starts.len() < 2 {
        return false;
    }
    if starts.iter().min().is_some_and(|&first| first > limits.key_value_label_window) {
        return false;
    }

    // A labelled predecessor means this block is the tail of an earlier header
    let mut prev = doc.previous_sibling(node);
    while let Some(p) = prev {
        if !doc.is_blank_text(p) {
            break;
        }
        prev = doc.previous_sibling(p);
    }
    !prev.is_some_and(|p| has_label(&doc.clean_text(p)))
}

fn match_multi_div(doc: &Document, node: NodeId, limits: &HeaderThresholds) -> Option<HeaderMatch> {
    if !doc.is_named(node, "div") {
        return None;
    }

    let text = doc.clean_text(node);
    if !has_label(&text) && !LineSignals::of(&text).is_datetime_line() {
        return None;
    }

    let mut before = Vec::new();
    let mut prev = doc.previous_sibling(node);
    while let Some(p) = prev {
        if doc.is_blank_text(p) {
            prev = doc.previous_sibling(p);
            continue;
        }
        if !doc.is_named(p, "div") || doc.marker(p).is_some() || !has_label(&doc.clean_text(p)) {
            break;
        }
        before.push(p);
        prev = doc.previous_sibling(p);
    }
    before.reverse();

    let mut after = Vec::new();
    let mut next = doc.next_sibling(node);
    while let Some(n) = next {
        if doc.is_blank_text(n) {
            next = doc.next_sibling(n);
            continue;
        }
        if !doc.is_named(n, "div") || doc.marker(n).is_some() {
            break;
        }
        let next_text = doc.clean_text(n);
        if !has_label(&next_text) && !LineSignals::of(&next_text).is_datetime_line() {
            break;
        }
        after.push(n);
        next = doc.next_sibling(n);
    }

    if before.is_empty() && after.is_empty() {
        return None;
    }

    let first = before.first().copied().unwrap_or(node);
    if !LEADING_LABEL_REGEX.is_match(doc.clean_text(first).trim()) {
        return None;
    }

    let members: Vec<NodeId> = before
        .into_iter()
        .chain(std::iter::once(node))
        .chain(after)
        .collect();
    if members.len() > limits.multi_div_max_members {
        return None;
    }

    let total: usize = members
        .iter()
        .map(|&m| doc.clean_text(m).chars().count())
        .sum();
    if total > limits.multi_div_max_len {
        return None;
    }

    Some(HeaderMatch::Run(members))
}

fn mark_single(doc: &mut Document, node: NodeId, kind: HeaderKind) -> Option<NodeId> {
    let text = doc.clean_text(node);
    if text.is_empty() {
        return None;
    }

    let target = if doc.is_text(node) {
        let wrapper = doc.create_element("div");
        doc.replace_with(node, wrapper);
        wrapper
    } else {
        node
    };

    doc.set_text_content(target, text);
    doc.set_marker(target, Marker::Header(kind));
    Some(target)
}

fn mark_run(doc: &mut Document, members: &[NodeId], kind: HeaderKind) -> Option<NodeId> {
    let (&first, rest) = members.split_first()?;
    let text = members
        .iter()
        .map(|&m| doc.clean_text(m))
        .collect::<Vec<_>>()
        .join(" ");
    if text.trim().is_empty() {
        return None;
    }

    doc.set_text_content(first, text);
    doc.set_marker(first, Marker::Header(kind));
    for &member in rest {
        doc.decompose(member);
    }
    Some(first)
}
