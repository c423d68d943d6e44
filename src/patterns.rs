//! Regular expressions shared by header detection and header parsing

use regex::Regex;

pub(crate) const EMAIL_PATTERN: &str = r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+";

pub(crate) static EMAIL_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(EMAIL_PATTERN).unwrap());

/// `14 мая 2024`, `8 May 2024`, `14.05.2024`
pub(crate) static DATE_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"\d{1,2}[.\s]+\w+[.\s]+\d{4}|\d{2}\.\d{2}\.\d{4}").unwrap()
});

pub(crate) static TIME_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}").unwrap());

/// Header field labels, one expression per field, English and Russian
pub(crate) static LABEL_REGEXES: std::sync::LazyLock<[Regex; 5]> = std::sync::LazyLock::new(|| {
    [
        Regex::new(r"(?i)(?:From|От)\s*:").unwrap(),
        Regex::new(r"(?i)(?:Sent|Date|Отправлено|Дата)\s*:").unwrap(),
        Regex::new(r"(?i)(?:To|Кому)\s*:").unwrap(),
        Regex::new(r"(?i)(?:Subject|Тема)\s*:").unwrap(),
        Regex::new(r"(?i)(?:Cc|Копия)\s*:").unwrap(),
    ]
});

/// Same labels, anchored to the start of the text
pub(crate) static LEADING_LABEL_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:From|От|Sent|Date|Отправлено|Дата|To|Кому|Subject|Тема|Cc|Копия)\s*:",
    )
    .unwrap()
});

pub(crate) static SENDER_LABEL_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?i)(?:From|От)\s*:").unwrap());

pub(crate) fn has_label(text: &str) -> bool {
    LABEL_REGEXES.iter().any(|re| re.is_match(text))
}
