//! Parsing of quote header text into [`Header`] records

use crate::patterns::{EMAIL_REGEX, SENDER_LABEL_REGEX};
use crate::types::{Contact, Header, Timestamp};
use chrono::{FixedOffset, NaiveDate};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static YOU_WROTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:Вы\s+писали|You\s+wrote)\s+").unwrap());

static ONELINE_TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}(?::\d{2})?").unwrap());

static LEADING_OFFSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[+-]\d{2}:\d{2}\s*").unwrap());

static LEADING_MERIDIEM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*[AP]M\b").unwrap());

static LEADING_SENDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[,\s]*(?:от|from)?\s*").unwrap());

/// A header field: where its value starts and what ends it
struct Field {
    label: Regex,
    stop: Regex,
}

impl Field {
    fn new(label: &str, stops: &str) -> Self {
        Self {
            label: Regex::new(&format!(r"(?i)\b(?:{label})\s*:\s*")).unwrap(),
            stop: Regex::new(&format!(r"(?i)\s+\b(?:{stops})\s*:")).unwrap(),
        }
    }

    /// Value between this field's label and the next stop label
    fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        let start = self.label.find(text)?.end();
        let rest = &text[start..];
        let value = match self.stop.find(rest) {
            Some(stop) => &rest[..stop.start()],
            None => rest,
        };
        (!value.is_empty()).then_some(value)
    }
}

static FROM_FIELD: LazyLock<Field> =
    LazyLock::new(|| Field::new("From|От", "Sent|Date|Отправлено|Дата|To|Кому"));
static SENT_FIELD: LazyLock<Field> =
    LazyLock::new(|| Field::new("Sent|Date|Отправлено|Дата", "To|Кому|Subject|Тема|Cc|Копия"));
static TO_FIELD: LazyLock<Field> =
    LazyLock::new(|| Field::new("To|Кому", "Subject|Тема|Cc|Копия"));
static SUBJECT_FIELD: LazyLock<Field> = LazyLock::new(|| Field::new("Subject|Тема", "Cc|Копия"));

/// Turns header text into structured fields
///
/// The main contact stands in for the sender of "you wrote" attributions,
/// which name no address.
#[derive(Debug, Clone, Default)]
pub struct HeaderParser {
    main_contact: Option<Contact>,
}

impl HeaderParser {
    #[must_use]
    pub const fn new(main_contact: Option<Contact>) -> Self {
        Self { main_contact }
    }

    /// Parse header text, `None` when no sender can be resolved
    ///
    /// Text carrying a `From:` label is read as a labelled block, anything
    /// else as a one-line attribution.
    #[must_use]
    pub fn parse_header(&self, text: &str) -> Option<Header> {
        let text = WHITESPACE_REGEX.replace_all(text.trim(), " ");
        if text.is_empty() {
            return None;
        }
        if SENDER_LABEL_REGEX.is_match(&text) {
            parse_block(&text)
        } else {
            self.parse_oneline(&text)
        }
    }

    fn parse_oneline(&self, text: &str) -> Option<Header> {
        let sent = parse_datetime(text);

        if YOU_WROTE_REGEX.is_match(text) {
            let from = self.main_contact.clone()?;
            return Some(Header {
                sent,
                ..Header::new(from)
            });
        }

        let email = EMAIL_REGEX.find(text)?.as_str();
        let from = match ONELINE_TIME_REGEX.find(text) {
            Some(time) => Contact::new(email, name_after_time(&text[time.end()..], email)),
            None => parse_contact(text)?,
        };

        Some(Header {
            sent,
            ..Header::new(from)
        })
    }
}

fn parse_block(text: &str) -> Option<Header> {
    let from = FROM_FIELD.capture(text).and_then(parse_contact)?;
    Some(Header {
        from,
        sent: SENT_FIELD.capture(text).and_then(parse_datetime),
        to: TO_FIELD.capture(text).and_then(parse_contact),
        subject: SUBJECT_FIELD
            .capture(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    })
}

/// Display name between the time and the address, if any
fn name_after_time(after: &str, email: &str) -> Option<String> {
    let after = after.trim();
    let after = LEADING_OFFSET_REGEX.replace(after, "");
    let after = LEADING_MERIDIEM_REGEX.replace(&after, "");
    let after = LEADING_SENDER_REGEX.replace(&after, "");

    let name_regex = Regex::new(&format!(
        r#"^['"]*(.+?)['"]*\s*[<\[]?\s*{}"#,
        regex::escape(email)
    ))
    .ok()?;
    let caps = name_regex.captures(&after)?;
    let name = caps[1].trim().trim_matches(['\'', '"']).trim_matches(',');
    (!name.is_empty()).then(|| name.to_string())
}

/// Parse a contact from free text; see [`Contact::parse`]
#[must_use]
pub fn parse_contact(text: &str) -> Option<Contact> {
    Contact::parse(text)
}

const MONTHS: &[(&str, u32)] = &[
    ("янв", 1),
    ("фев", 2),
    ("мар", 3),
    ("апр", 4),
    ("май", 5),
    ("мая", 5),
    ("июн", 6),
    ("июл", 7),
    ("авг", 8),
    ("сен", 9),
    ("окт", 10),
    ("ноя", 11),
    ("дек", 12),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

/// Month number from a localized month name or abbreviation
fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    MONTHS
        .iter()
        .find(|(abbr, _)| *abbr == prefix)
        .map(|&(_, month)| month)
}

/// `+03:00` style offsets
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, digits) = raw.split_at(1);
    let (hours, minutes) = digits.split_once(':')?;
    let seconds = hours.parse::<i32>().ok()? * 3600 + minutes.parse::<i32>().ok()? * 60;
    FixedOffset::east_opt(if sign == "-" { -seconds } else { seconds })
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, group: usize) -> Option<T> {
    caps.get(group)?.as_str().parse().ok()
}

fn timestamp(
    date: (i32, u32, u32),
    time: (u32, u32, u32),
    offset: Option<FixedOffset>,
) -> Option<Timestamp> {
    let (year, month, day) = date;
    let (hour, minute, second) = time;
    let local = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    Some(match offset {
        Some(offset) => Timestamp::with_offset(local, offset),
        None => Timestamp::naive(local),
    })
}

type DatetimeRule = fn(&Captures<'_>) -> Option<Timestamp>;

/// `21.09.2023, 16:13`
fn numeric_date_time(caps: &Captures<'_>) -> Option<Timestamp> {
    timestamp(
        (number(caps, 3)?, number(caps, 2)?, number(caps, 1)?),
        (number(caps, 4)?, number(caps, 5)?, 0),
        None,
    )
}

/// `пт, 15 апр. 2022 г. в 20:47`
fn russian_long(caps: &Captures<'_>) -> Option<Timestamp> {
    timestamp(
        (number(caps, 3)?, month_number(&caps[2])?, number(caps, 1)?),
        (number(caps, 4)?, number(caps, 5)?, 0),
        None,
    )
}

/// `Wednesday, May 08, 2024 1:34 PM`
fn english_meridiem(caps: &Captures<'_>) -> Option<Timestamp> {
    let hour: u32 = number(caps, 4)?;
    let pm = caps[6].eq_ignore_ascii_case("pm");
    let hour = match (pm, hour) {
        (true, 12) => 12,
        (true, h) => h + 12,
        (false, 12) => 0,
        (false, h) => h,
    };
    timestamp(
        (number(caps, 3)?, month_number(&caps[1])?, number(caps, 2)?),
        (hour, number(caps, 5)?, 0),
        None,
    )
}

/// `8 мая 2024 г., 13:55:58 +03:00`
fn russian_year_marker(caps: &Captures<'_>) -> Option<Timestamp> {
    timestamp(
        (number(caps, 3)?, month_number(&caps[2])?, number(caps, 1)?),
        (
            number(caps, 4)?,
            number(caps, 5)?,
            number(caps, 6).unwrap_or(0),
        ),
        caps.get(7).and_then(|m| parse_offset(m.as_str())),
    )
}

/// `14 мая 2024, 17:35 +03:00`
fn day_month_year(caps: &Captures<'_>) -> Option<Timestamp> {
    timestamp(
        (number(caps, 3)?, month_number(&caps[2])?, number(caps, 1)?),
        (number(caps, 4)?, number(caps, 5)?, 0),
        caps.get(6).and_then(|m| parse_offset(m.as_str())),
    )
}

/// `14.05.2024`, taken as midnight
fn numeric_date(caps: &Captures<'_>) -> Option<Timestamp> {
    timestamp(
        (number(caps, 3)?, number(caps, 2)?, number(caps, 1)?),
        (0, 0, 0),
        None,
    )
}

static DATETIME_RULES: LazyLock<Vec<(Regex, DatetimeRule)>> = LazyLock::new(|| {
    let rules: [(&str, DatetimeRule); 6] = [
        (
            r"(\d{2})\.(\d{2})\.(\d{4})[,\s]+(\d{1,2}):(\d{2})",
            numeric_date_time,
        ),
        (
            r"(?i)(?:\w+,\s+)?(\d{1,2})\s+(\w+)\.?\s+(\d{4})\s+г\.\s+в\s+(\d{1,2}):(\d{2})",
            russian_long,
        ),
        (
            r"(?i)(?:\w+,\s+)?(\w+)\s+(\d{1,2}),\s+(\d{4})\s+(\d{1,2}):(\d{2})\s+(AM|PM)",
            english_meridiem,
        ),
        (
            r"(?i)(\d{1,2})\s+(\w+)\s+(\d{4})\s+г\.[,\s]+(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s*([+-]\d{2}:\d{2}))?",
            russian_year_marker,
        ),
        (
            r"(?i)(\d{1,2})\s+(\w+)\s+(\d{4})[,\s]+(\d{1,2}):(\d{2})(?:\s*([+-]\d{2}:\d{2}))?",
            day_month_year,
        ),
        (r"(\d{2})\.(\d{2})\.(\d{4})", numeric_date),
    ];
    rules
        .into_iter()
        .map(|(pattern, rule)| (Regex::new(pattern).unwrap(), rule))
        .collect()
});

/// Parse the first recognizable date and time in `text`
///
/// Formats are tried in a fixed order and the first one that yields a valid
/// date wins. A bare numeric date parses as midnight with no offset.
#[must_use]
pub fn parse_datetime(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATETIME_RULES
        .iter()
        .find_map(|(regex, rule)| regex.captures(text).and_then(|caps| rule(&caps)))
}
