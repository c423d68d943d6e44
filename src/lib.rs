// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

//! Quote Thread
//!
//! Rebuilds a chronological email conversation from one HTML document
//! exported by a webmail client, where earlier messages sit nested inside
//! later ones as quoted or forwarded blocks.
//!
//! # Pipeline
//!
//! - HTML is parsed into an arena-backed [`Document`]
//! - The [`Normalizer`] detects quote headers and restructures the tree so
//!   every quoted message is a `blockquote` headed by its attribution
//! - Messages are extracted level by level, their headers parsed into
//!   [`Contact`]s and [`Timestamp`]s
//! - The timeline is reversed to oldest first and missing send times are
//!   estimated from their neighbors
//!
//! # Example
//!
//! ```rust
//! use quote_thread::{ParserOptions, parse_thread};
//!
//! let html = "<div>Thanks!</div>\
//!             <blockquote><div>From: Anna &lt;anna@example.com&gt; \
//!             Sent: 14.05.2024, 17:35 To: Bob &lt;bob@example.com&gt; \
//!             Subject: Hello</div><div>Are you coming?</div></blockquote>";
//! let thread = parse_thread(html, &ParserOptions::default()).unwrap();
//!
//! assert_eq!(thread.len(), 2);
//! let first = thread.messages()[0].header.as_ref().unwrap();
//! assert_eq!(first.from.email, "anna@example.com");
//! println!("{}", thread.to_json().unwrap());
//! ```

mod adapters;
mod config;
mod error;
mod extract;
mod header;
mod html;
mod normalize;
mod parser;
mod patterns;
mod timeline;
mod tree;
mod types;

pub use adapters::{HeaderKind, HeaderMatch, classify, classify_and_mark};
pub use config::{HeaderThresholds, ParserOptions};
pub use error::{ParseError, Result};
pub use extract::{RawMessage, extract_messages};
pub use header::{HeaderParser, parse_contact, parse_datetime};
pub use normalize::{NormalizeReport, Normalizer, Pass, PassReport};
pub use parser::{ThreadParser, parse_thread};
pub use timeline::{fill_missing_timestamps, normalize_timezone, reconcile};
pub use tree::{Document, MARKER_ATTR, Marker, NodeData, NodeId};
pub use types::*;
