//! Live countdowns for notifications that opted in.
//!
//! A countdown is either a fixed `date` target or a `daily` time that rolls
//! to the next day once passed. One global one-second tick recomputes every
//! registered countdown; daily targets that have lapsed are re-derived on
//! the fly, so a recurring countdown heals itself without a re-fetch.

use chrono::{Duration, NaiveDateTime};

use crate::notification::{CountdownKind, CountdownSettings, Notification, NotificationId};

/// Remaining time split into display segments. The days segment is omitted
/// by adapters when zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLeft {
    pub expired: bool,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeLeft {
    const ZERO: TimeLeft = TimeLeft {
        expired: true,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };
}

/// Resolve the target instant for a countdown, if it has one.
pub fn target_instant(cfg: &CountdownSettings, now: NaiveDateTime) -> Option<NaiveDateTime> {
    match cfg.kind {
        CountdownKind::Date => cfg.date,
        CountdownKind::Daily => {
            let mut target = now.date().and_time(cfg.time);
            if target < now {
                target = target + Duration::days(1);
            }
            Some(target)
        }
    }
}

/// Split the distance from `now` to `target` into display segments.
pub fn time_left(target: NaiveDateTime, now: NaiveDateTime) -> TimeLeft {
    let diff = target - now;
    if diff.num_milliseconds() <= 0 {
        return TimeLeft::ZERO;
    }
    let total = diff.num_seconds();
    TimeLeft {
        expired: false,
        days: total / 86_400,
        hours: (total % 86_400) / 3_600,
        minutes: (total % 3_600) / 60,
        seconds: total % 60,
    }
}

/// One countdown update delivered to the render sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTick {
    pub id: NotificationId,
    pub remaining: TimeLeft,
}

struct Entry {
    id: NotificationId,
    settings: CountdownSettings,
    target: Option<NaiveDateTime>,
}

/// Registry of active countdowns, rebuilt on each fetch cycle and advanced
/// by the global second tick.
#[derive(Default)]
pub struct CountdownBoard {
    entries: Vec<Entry>,
}

impl CountdownBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registry with the countdown-enabled subset of the
    /// current candidates.
    pub fn sync(&mut self, notifications: &[Notification], now: NaiveDateTime) {
        self.entries = notifications
            .iter()
            .filter_map(|n| {
                n.settings.countdown.as_ref().map(|c| Entry {
                    id: n.id,
                    settings: c.clone(),
                    target: target_instant(c, now),
                })
            })
            .collect();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance all countdowns to `now`, re-deriving lapsed daily targets.
    pub fn tick(&mut self, now: NaiveDateTime) -> Vec<CountdownTick> {
        self.entries
            .iter_mut()
            .filter_map(|entry| {
                if entry.settings.kind == CountdownKind::Daily {
                    if let Some(target) = entry.target {
                        if target < now {
                            entry.target = target_instant(&entry.settings, now);
                        }
                    }
                }
                let target = entry.target?;
                Some(CountdownTick {
                    id: entry.id,
                    remaining: time_left(target, now),
                })
            })
            .collect()
    }
}
