//! Thread parser: markup in, ordered messages out

use crate::config::ParserOptions;
use crate::error::{ParseError, Result};
use crate::extract::extract_messages;
use crate::header::HeaderParser;
use crate::normalize::{NormalizeReport, Normalizer};
use crate::timeline;
use crate::tree::Document;
use crate::types::{Header, Message, Thread};
use tracing::debug;

/// Parse webmail HTML into a thread, oldest message first
pub fn parse_thread(html: &str, options: &ParserOptions) -> Result<Thread> {
    ThreadParser::new(options.clone()).parse(html)
}

/// Reusable parser holding its options
#[derive(Debug, Clone, Default)]
pub struct ThreadParser {
    options: ParserOptions,
    headers: HeaderParser,
}

impl ThreadParser {
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        let headers = HeaderParser::new(options.main_contact.clone());
        Self { options, headers }
    }

    #[must_use]
    pub const fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn parse(&self, html: &str) -> Result<Thread> {
        if html.trim().is_empty() {
            return Err(ParseError::EmptyDocument);
        }
        let mut doc = Document::parse_html(html);
        self.parse_document(&mut doc)
    }

    /// Normalize `doc` in place and read the thread out of it
    pub fn parse_document(&self, doc: &mut Document) -> Result<Thread> {
        self.normalize(doc)?;

        let messages: Vec<Message> = extract_messages(doc)
            .into_iter()
            .map(|raw| {
                let header = match raw.header {
                    Some(text) => self.headers.parse_header(&text),
                    None => self.options.main_contact.clone().map(Header::new),
                };
                Message::new(header, raw.text)
            })
            .collect();

        let messages = timeline::reconcile(messages, self.options.timezone());
        debug!("Parsed thread with {} message(s)", messages.len());
        Ok(Thread::new(messages))
    }

    /// Run only the normalizer, returning its diagnostics
    pub fn normalize(&self, doc: &mut Document) -> Result<NormalizeReport> {
        Normalizer::new(&self.options).run(doc)
    }
}
