//! Core types for reconstructed threads

use crate::error::Result;
use crate::patterns::{EMAIL_PATTERN, EMAIL_REGEX};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const QUOTES: [char; 2] = ['\'', '"'];

static NAMED_CONTACT_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(&format!(
        r"^(.+?)\s*[<\[]\s*(?:mailto:)?({EMAIL_PATTERN})\s*[>\]]"
    ))
    .unwrap()
});

static BRACKETED_CONTACT_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(&format!(r"[<\[]\s*(?:mailto:)?({EMAIL_PATTERN})\s*[>\]]")).unwrap()
});

/// A correspondent: email address with optional display name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    /// Display name (e.g., "КАМИН")
    pub name: Option<String>,

    /// Email address, never empty
    pub email: String,
}

impl Contact {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            name,
            email: email.into(),
        }
    }

    /// Parse a contact from free text
    ///
    /// Accepts `Name <email>`, `Name [email]`, a bare `<email>`, or the first
    /// bare address found, in that order. Text before a bare address becomes
    /// the name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().trim_matches(QUOTES);
        if s.is_empty() {
            return None;
        }

        if let Some(caps) = NAMED_CONTACT_REGEX.captures(s) {
            let email = caps[2].trim().to_string();
            let name = EMAIL_REGEX.replace_all(caps[1].trim(), "");
            return Some(Self::new(email, non_empty(name.trim().trim_matches(QUOTES))));
        }

        if let Some(caps) = BRACKETED_CONTACT_REGEX.captures(s) {
            return Some(Self::new(caps[1].trim(), None));
        }

        let found = EMAIL_REGEX.find(s)?;
        let name = s[..found.start()].trim().trim_matches(QUOTES);
        Some(Self::new(found.as_str(), non_empty(name)))
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => write!(f, "{}", self.email),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// A send time whose UTC offset may be unknown
///
/// Headers in quoted text often carry a wall-clock time with no zone, or only
/// a date. The offset stays `None` until the timeline assigns one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    local: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl Timestamp {
    #[must_use]
    pub const fn naive(local: NaiveDateTime) -> Self {
        Self {
            local,
            offset: None,
        }
    }

    #[must_use]
    pub const fn with_offset(local: NaiveDateTime, offset: FixedOffset) -> Self {
        Self {
            local,
            offset: Some(offset),
        }
    }

    #[must_use]
    pub fn from_fixed(dt: DateTime<FixedOffset>) -> Self {
        Self::with_offset(dt.naive_local(), *dt.offset())
    }

    /// Wall-clock date and time as written
    #[must_use]
    pub const fn local(&self) -> NaiveDateTime {
        self.local
    }

    #[must_use]
    pub const fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// Midnight with no offset means only the date was known
    #[must_use]
    pub fn is_date_only(&self) -> bool {
        self.offset.is_none() && self.local.time() == NaiveTime::MIN
    }

    /// Resolve to an absolute instant, reading offset-naive values in `assumed`
    #[must_use]
    pub fn to_fixed(&self, assumed: FixedOffset) -> DateTime<FixedOffset> {
        let offset = self.offset.unwrap_or(assumed);
        let utc = self.local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
        DateTime::from_naive_utc_and_offset(utc, offset)
    }

    /// Express the same instant in `zone`
    #[must_use]
    pub fn in_zone(&self, zone: FixedOffset) -> Self {
        Self::from_fixed(self.to_fixed(zone).with_timezone(&zone))
    }

    /// Keep the time of day and offset but move onto `date`
    #[must_use]
    pub fn on_date(&self, date: NaiveDate) -> Self {
        Self {
            local: date.and_time(self.local.time()),
            offset: self.offset,
        }
    }

    #[must_use]
    pub fn checked_add(&self, delta: TimeDelta) -> Option<Self> {
        Some(Self {
            local: self.local.checked_add_signed(delta)?,
            offset: self.offset,
        })
    }

    #[must_use]
    pub fn checked_sub(&self, delta: TimeDelta) -> Option<Self> {
        Some(Self {
            local: self.local.checked_sub_signed(delta)?,
            offset: self.offset,
        })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(
                f,
                "{}",
                self.to_fixed(offset).format("%Y-%m-%dT%H:%M:%S%:z")
            ),
            None => write!(f, "{}", self.local.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::from_fixed(dt));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(Self::naive)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Attribution of a quoted message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
    /// Sender, always resolved
    pub from: Contact,

    /// Send time
    pub sent: Option<Timestamp>,

    /// Primary recipient
    pub to: Option<Contact>,

    /// Subject line
    pub subject: Option<String>,
}

impl Header {
    #[must_use]
    pub const fn new(from: Contact) -> Self {
        Self {
            from,
            sent: None,
            to: None,
            subject: None,
        }
    }
}

/// One message of a thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// `None` for the newest message when no main contact is configured
    pub header: Option<Header>,

    /// Body text with whitespace canonicalized
    pub text: String,
}

impl Message {
    #[must_use]
    pub const fn new(header: Option<Header>, text: String) -> Self {
        Self { header, text }
    }

    #[must_use]
    pub fn sent(&self) -> Option<Timestamp> {
        self.header.as_ref().and_then(|h| h.sent)
    }
}

/// Messages of one conversation, oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Thread {
    messages: Vec<Message>,
}

impl Thread {
    #[must_use]
    pub const fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Most recent message
    #[must_use]
    pub fn latest(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Pretty-printed JSON, non-ASCII text kept verbatim
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl IntoIterator for Thread {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a Thread {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
