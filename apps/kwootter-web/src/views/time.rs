//! Relative "time ago" labels.
//!
//! Rounding thresholds follow the common `fromNow` convention: up to 44 seconds is "a few
//! seconds", up to 89 seconds "a minute", up to 44 minutes "N minutes", and so on up to years.

use chrono::{DateTime, Utc};

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const MONTH: f64 = 30.4375 * DAY;
const YEAR: f64 = 12.0 * MONTH;

#[derive(Debug, Clone, Copy)]
enum Label {
    FewSeconds,
    Minute,
    Minutes,
    Hour,
    Hours,
    Day,
    Days,
    Month,
    Months,
    Year,
    Years,
}

/// `(label, largest amount it covers, unit in seconds)`. Rows without a unit reuse the amount
/// computed by the row above.
const THRESHOLDS: [(Label, Option<u64>, Option<f64>); 11] = [
    (Label::FewSeconds, Some(44), Some(1.0)),
    (Label::Minute, Some(89), None),
    (Label::Minutes, Some(44), Some(MINUTE)),
    (Label::Hour, Some(89), None),
    (Label::Hours, Some(21), Some(HOUR)),
    (Label::Day, Some(35), None),
    (Label::Days, Some(25), Some(DAY)),
    (Label::Month, Some(45), None),
    (Label::Months, Some(10), Some(MONTH)),
    (Label::Year, Some(17), None),
    (Label::Years, None, Some(YEAR)),
];

/// Label `then` relative to `now`, e.g. "5 minutes ago" or "in an hour".
pub fn time_ago(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let millis = (now - then).num_milliseconds();
    let phrase = phrase(millis.unsigned_abs() as f64 / 1000.0);

    if millis < 0 {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}

fn phrase(seconds: f64) -> String {
    let mut amount = 0u64;

    for (i, (label, max, unit)) in THRESHOLDS.iter().enumerate() {
        if let Some(unit) = unit {
            amount = (seconds / unit).round() as u64;
        }
        if max.is_none_or(|max| amount <= max) {
            // "1 minutes" reads as "a minute".
            let label = if amount <= 1 && i > 0 {
                THRESHOLDS[i - 1].0
            } else {
                *label
            };
            return render(label, amount);
        }
    }

    render(Label::Years, amount)
}

fn render(label: Label, amount: u64) -> String {
    match label {
        Label::FewSeconds => "a few seconds".to_string(),
        Label::Minute => "a minute".to_string(),
        Label::Minutes => format!("{amount} minutes"),
        Label::Hour => "an hour".to_string(),
        Label::Hours => format!("{amount} hours"),
        Label::Day => "a day".to_string(),
        Label::Days => format!("{amount} days"),
        Label::Month => "a month".to_string(),
        Label::Months => format!("{amount} months"),
        Label::Year => "a year".to_string(),
        Label::Years => format!("{amount} years"),
    }
}
