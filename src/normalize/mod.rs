//! Tree normalization
//!
//! Rewrites a freshly parsed webmail document until every quoted message is a
//! `blockquote` whose first child is its marked header, nested strictly
//! inside the message that quoted it. Passes run in a fixed order; the ones
//! that rewrite to a fixpoint are capped by
//! [`ParserOptions::max_iterations`](crate::ParserOptions::max_iterations).

mod blocks;
mod cleanup;
mod headers;
mod whitespace;

use crate::config::ParserOptions;
use crate::error::{ParseError, Result};
use crate::tree::Document;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

const TABLE_TAGS: &[&str] = &[
    "table", "thead", "tbody", "tr", "td", "th", "tfoot", "caption", "colgroup", "col",
];

const BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "dl", "dt", "dd", "header",
    "footer", "nav", "section", "article", "aside", "main", "address", "figure", "figcaption",
    "pre", "form", "fieldset", "center", "noscript", "dir", "menu", "details", "summary",
];

/// One rewrite of the pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    ConvertMedia,
    ClearHtml,
    SimplifyTags,
    WrapOrphans,
    DetectHeaders,
    FlattenSpans,
    PromoteForwarded,
    RelocateHeaders,
    FlattenBlocks,
    EnsureQuotes,
    NestQuotes,
    MoveRemnants,
    CanonicalizeWhitespace,
}

impl Pass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConvertMedia => "convert_media",
            Self::ClearHtml => "clear_html",
            Self::SimplifyTags => "simplify_tags",
            Self::WrapOrphans => "wrap_orphans",
            Self::DetectHeaders => "detect_headers",
            Self::FlattenSpans => "flatten_spans",
            Self::PromoteForwarded => "promote_forwarded",
            Self::RelocateHeaders => "relocate_headers",
            Self::FlattenBlocks => "flatten_blocks",
            Self::EnsureQuotes => "ensure_quotes",
            Self::NestQuotes => "nest_quotes",
            Self::MoveRemnants => "move_remnants",
            Self::CanonicalizeWhitespace => "canonicalize_whitespace",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Iterations executed by one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub pass: Pass,
    pub iterations: usize,
}

/// Diagnostics of a normalizer run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub passes: Vec<PassReport>,
}

impl NormalizeReport {
    #[must_use]
    pub fn iterations(&self, pass: Pass) -> usize {
        self.passes
            .iter()
            .filter(|r| r.pass == pass)
            .map(|r| r.iterations)
            .sum()
    }

    #[must_use]
    pub fn total_iterations(&self) -> usize {
        self.passes.iter().map(|r| r.iterations).sum()
    }

    fn record(&mut self, pass: Pass, iterations: usize) {
        debug!("Pass {pass} finished after {iterations} iteration(s)");
        self.passes.push(PassReport { pass, iterations });
    }
}

/// Runs the rewrite pipeline over a document
pub struct Normalizer<'a> {
    options: &'a ParserOptions,
}

impl<'a> Normalizer<'a> {
    #[must_use]
    pub const fn new(options: &'a ParserOptions) -> Self {
        Self { options }
    }

    pub fn run(&self, doc: &mut Document) -> Result<NormalizeReport> {
        let limit = self.options.max_iterations;
        let limits = &self.options.thresholds;
        let mut report = NormalizeReport::default();

        cleanup::convert_media(doc, self.options);
        report.record(Pass::ConvertMedia, 1);

        let iterations = cleanup::clear_html(doc, limit)?;
        report.record(Pass::ClearHtml, iterations);

        cleanup::simplify_tags(doc);
        report.record(Pass::SimplifyTags, 1);

        cleanup::wrap_orphans(doc, limits);
        report.record(Pass::WrapOrphans, 1);

        headers::detect_headers(doc, limits);
        report.record(Pass::DetectHeaders, 1);

        headers::flatten_spans(doc);
        report.record(Pass::FlattenSpans, 1);

        let iterations = fixpoint(Pass::PromoteForwarded, limit, || {
            headers::promote_forwarded(doc)
        })?;
        report.record(Pass::PromoteForwarded, iterations);

        let iterations = blocks::relocate_headers(doc, limit)?;
        report.record(Pass::RelocateHeaders, iterations);

        let iterations = fixpoint(Pass::FlattenBlocks, limit, || blocks::flatten_blocks(doc))?;
        report.record(Pass::FlattenBlocks, iterations);

        blocks::ensure_quotes(doc);
        report.record(Pass::EnsureQuotes, 1);

        blocks::nest_quotes(doc);
        report.record(Pass::NestQuotes, 1);

        blocks::move_remnants(doc);
        report.record(Pass::MoveRemnants, 1);

        whitespace::canonicalize(doc);
        report.record(Pass::CanonicalizeWhitespace, 1);

        Ok(report)
    }
}

/// Repeat `step` until it reports no change
///
/// Returns the number of iterations, the last one being the quiet one.
fn fixpoint(pass: Pass, limit: usize, mut step: impl FnMut() -> bool) -> Result<usize> {
    for iteration in 1..=limit {
        if !step() {
            return Ok(iteration);
        }
    }
    warn!("Pass {pass} still changing the tree after {limit} iterations");
    Err(ParseError::NotConverged { pass, limit })
}

/// Blank text, line breaks, and divs holding nothing else
fn is_removable(doc: &Document, node: crate::tree::NodeId) -> bool {
    if doc.is_text(node) {
        return doc.is_blank_text(node);
    }
    if doc.is_named(node, "br") {
        return true;
    }
    doc.is_named(node, "div")
        && doc
            .children(node)
            .iter()
            .all(|&child| is_removable(doc, child))
}

/// Depth-first ordering key: deeper nodes first, document order among equals
fn deepest_first(doc: &Document, nodes: &mut [crate::tree::NodeId]) {
    nodes.sort_by_key(|&n| std::cmp::Reverse(doc.depth(n)));
}
