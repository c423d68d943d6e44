//! Parser configuration

use crate::types::Contact;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

const DEFAULT_UTC_OFFSET_MINUTES: i32 = 180;

/// Size limits used by the header classifiers
///
/// These were tuned against real webmail exports and are the first thing to
/// revisit when a new client's quoting style is misclassified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeaderThresholds {
    /// Shortest text accepted as a one-line attribution
    pub oneline_min_len: usize,

    /// Longest text accepted as a one-line attribution
    pub oneline_max_len: usize,

    /// Maximum newlines inside a one-line attribution
    pub oneline_max_newlines: usize,

    /// Shortest text accepted as a key/value block
    pub key_value_min_len: usize,

    /// Longest text accepted as a key/value block
    pub key_value_max_len: usize,

    /// The first label must start within this many characters
    pub key_value_label_window: usize,

    /// Maximum containers merged into one multi-div header
    pub multi_div_max_members: usize,

    /// Maximum combined text length of a multi-div header
    pub multi_div_max_len: usize,
}

impl Default for HeaderThresholds {
    fn default() -> Self {
        Self {
            oneline_min_len: 10,
            oneline_max_len: 350,
            oneline_max_newlines: 3,
            key_value_min_len: 15,
            key_value_max_len: 1000,
            key_value_label_window: 50,
            multi_div_max_members: 5,
            multi_div_max_len: 600,
        }
    }
}

/// Options accepted by [`crate::ThreadParser`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserOptions {
    /// Owner of the mailbox; used as sender of the newest message and of
    /// "you wrote" attributions
    pub main_contact: Option<Contact>,

    /// Replace images with a fixed placeholder instead of a markdown link
    pub remove_images: bool,

    /// Label written into image placeholders
    pub image_label: String,

    /// Placeholder text when `remove_images` is set
    pub removed_image_label: String,

    /// Zone all send times are normalized to, in minutes east of UTC
    pub utc_offset_minutes: i32,

    /// Ceiling for every fixpoint rewrite in the normalizer
    pub max_iterations: usize,

    pub thresholds: HeaderThresholds,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            main_contact: None,
            remove_images: false,
            image_label: "ИЗОБРАЖЕНИЕ".to_string(),
            removed_image_label: "ИЗОБРАЖЕНИЕ УДАЛЕНО".to_string(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            max_iterations: 100,
            thresholds: HeaderThresholds::default(),
        }
    }
}

impl ParserOptions {
    #[must_use]
    pub fn with_main_contact(mut self, contact: Contact) -> Self {
        self.main_contact = Some(contact);
        self
    }

    #[must_use]
    pub fn with_remove_images(mut self, remove: bool) -> Self {
        self.remove_images = remove;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, limit: usize) -> Self {
        self.max_iterations = limit;
        self
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: HeaderThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Target zone; out-of-range offsets fall back to UTC+3
    #[must_use]
    pub fn timezone(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(default_zone)
    }
}

fn default_zone() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60).expect("UTC+3 is a valid offset")
}
