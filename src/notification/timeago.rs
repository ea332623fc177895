//! Relative-age buckets for sidebar timestamps.
//!
//! The engine only classifies the duration since publication; adapters own
//! locale and phrasing. The `Display` impl is an English convenience.

use std::fmt;

use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeAge {
    JustNow,
    Minutes(i64),
    Hours(i64),
    Yesterday,
    Days(i64),
    Months(i64),
    Years(i64),
}

/// Bucket the duration between `published` and `now`.
pub fn relative_age(published: NaiveDateTime, now: NaiveDateTime) -> RelativeAge {
    let seconds = (now - published).num_seconds().max(0);

    let years = seconds / 31_536_000;
    if years > 1 {
        return RelativeAge::Years(years);
    }
    let months = seconds / 2_592_000;
    if months > 1 {
        return RelativeAge::Months(months);
    }
    let days = seconds / 86_400;
    if days > 1 {
        return RelativeAge::Days(days);
    }
    if days == 1 {
        return RelativeAge::Yesterday;
    }
    let hours = seconds / 3_600;
    if hours >= 1 {
        return RelativeAge::Hours(hours);
    }
    let minutes = seconds / 60;
    if minutes >= 1 {
        return RelativeAge::Minutes(minutes);
    }
    RelativeAge::JustNow
}

impl fmt::Display for RelativeAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelativeAge::JustNow => write!(f, "just now"),
            RelativeAge::Minutes(1) => write!(f, "1 minute ago"),
            RelativeAge::Minutes(m) => write!(f, "{m} minutes ago"),
            RelativeAge::Hours(1) => write!(f, "1 hour ago"),
            RelativeAge::Hours(h) => write!(f, "{h} hours ago"),
            RelativeAge::Yesterday => write!(f, "yesterday"),
            RelativeAge::Days(d) => write!(f, "{d} days ago"),
            RelativeAge::Months(m) => write!(f, "{m} months ago"),
            RelativeAge::Years(y) => write!(f, "{y} years ago"),
        }
    }
}
