//! Chronological ordering and timestamp reconciliation

use crate::types::{Message, Timestamp};
use chrono::{FixedOffset, NaiveDate, TimeDelta};

/// Order messages oldest first and give every header a zoned send time
///
/// `messages` comes from extraction, newest first.
#[must_use]
pub fn reconcile(mut messages: Vec<Message>, zone: FixedOffset) -> Vec<Message> {
    messages.reverse();
    fill_missing_timestamps(&mut messages, zone);
    normalize_timezone(&mut messages, zone);
    messages
}

/// Send time that can anchor interpolation
fn known(message: &Message) -> Option<Timestamp> {
    message.sent().filter(|ts| !ts.is_date_only())
}

/// Estimate send times that are absent or carry only a date
///
/// Messages are filled oldest first, so an estimate can anchor the next one.
/// The first and last message borrow their nearest known neighbor one hour
/// off; an interior message takes the midpoint of its known neighbors. When
/// only the date was known, the estimated time of day lands on that date.
pub fn fill_missing_timestamps(messages: &mut [Message], zone: FixedOffset) {
    let hour = TimeDelta::hours(1);

    for i in 0..messages.len() {
        let Some(header) = &messages[i].header else {
            continue;
        };
        let base_date: Option<NaiveDate> = match header.sent {
            None => None,
            Some(ts) if ts.is_date_only() => Some(ts.local().date()),
            Some(_) => continue,
        };

        let prev = messages[..i].iter().rev().find_map(known);
        let next = messages[i + 1..].iter().find_map(known);

        let estimate = match (prev, next) {
            (Some(prev), Some(next)) => midpoint(prev, next, zone),
            (Some(prev), None) => prev.checked_add(hour),
            (None, Some(next)) => next.checked_sub(hour),
            (None, None) => None,
        };

        let Some(estimate) = estimate else {
            continue;
        };
        let estimate = match base_date {
            Some(date) => estimate.on_date(date),
            None => estimate,
        };
        if let Some(header) = messages[i].header.as_mut() {
            header.sent = Some(estimate);
        }
    }
}

fn midpoint(prev: Timestamp, next: Timestamp, zone: FixedOffset) -> Option<Timestamp> {
    if prev.offset().is_none() && next.offset().is_none() {
        let half = (next.local() - prev.local()) / 2;
        return prev.checked_add(half);
    }
    let prev = prev.to_fixed(zone);
    let next = next.to_fixed(zone);
    let half = (next - prev) / 2;
    prev.checked_add_signed(half).map(Timestamp::from_fixed)
}

/// Express every send time in `zone`, reading naive times as already in it
pub fn normalize_timezone(messages: &mut [Message], zone: FixedOffset) {
    for header in messages.iter_mut().filter_map(|m| m.header.as_mut()) {
        if let Some(sent) = header.sent {
            header.sent = Some(sent.in_zone(zone));
        }
    }
}
