use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::raw::{RawCountdown, RawNotification, RawTriggers};

/// Server-assigned identifier, stable across fetches.
pub type NotificationId = u64;

/// Canonical notification record, produced from a raw record by
/// [`Notification::from_raw`] after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub cta_label: Option<String>,
    pub cta_url: Option<String>,
    pub published_at: Option<NaiveDateTime>,
    pub settings: DisplaySettings,
}

/// Per-notification display configuration with all defaults resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub show_in_sidebar: bool,
    pub sidebar_pinned: bool,
    pub sidebar_permanent: bool,
    /// Legacy pinned flag; still feeds the badge exclusions.
    pub pinned: bool,
    pub floating: Option<FloatingSettings>,
    pub topbar: Option<TopBarSettings>,
    pub repeat: RepeatPolicy,
    pub countdown: Option<CountdownSettings>,
}

impl DisplaySettings {
    /// A centered floating notification is the popup of the legacy model.
    pub fn is_popup(&self) -> bool {
        self.floating
            .as_ref()
            .map(|f| f.position == FloatingPosition::Center)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatingSettings {
    pub position: FloatingPosition,
    /// Pixel width; 0 = let the adapter decide.
    pub width: u32,
    /// Auto-close after this many seconds; 0 = stays until closed.
    pub duration_seconds: u32,
    pub triggers: TriggerSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatingPosition {
    /// Modal overlay.
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl FloatingPosition {
    pub fn parse(value: &str) -> Self {
        match value {
            "center" => FloatingPosition::Center,
            "top_left" => FloatingPosition::TopLeft,
            "top_right" => FloatingPosition::TopRight,
            "bottom_left" => FloatingPosition::BottomLeft,
            _ => FloatingPosition::BottomRight,
        }
    }

    /// Queue priority: center before top corners before bottom corners.
    pub fn priority(&self) -> u8 {
        match self {
            FloatingPosition::Center => 0,
            FloatingPosition::TopLeft | FloatingPosition::TopRight => 1,
            FloatingPosition::BottomLeft | FloatingPosition::BottomRight => 2,
        }
    }
}

/// Behavioral activation rules for the floating surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerSettings {
    pub delay: bool,
    pub delay_seconds: u32,
    pub exit_intent: bool,
    pub scroll_depth: bool,
    pub scroll_percent: u8,
    pub time_on_page: bool,
    pub time_seconds: u32,
    pub inactivity: bool,
    pub idle_seconds: u32,
    pub click: bool,
    pub click_selector: String,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            delay: false,
            delay_seconds: 0,
            exit_intent: false,
            scroll_depth: false,
            scroll_percent: 50,
            time_on_page: false,
            time_seconds: 30,
            inactivity: false,
            idle_seconds: 15,
            click: false,
            click_selector: String::new(),
        }
    }
}

impl TriggerSettings {
    fn from_raw(raw: Option<&RawTriggers>) -> Self {
        let Some(t) = raw else {
            return Self::default();
        };
        let defaults = Self::default();
        Self {
            delay: t.delay.0,
            delay_seconds: clamp_u32(t.delay_seconds.0),
            exit_intent: t.exit_intent.0,
            scroll_depth: t.scroll_depth.0,
            scroll_percent: if t.scroll_percent.0 > 0 {
                t.scroll_percent.0.min(100) as u8
            } else {
                defaults.scroll_percent
            },
            time_on_page: t.time_on_page.0,
            time_seconds: if t.time_seconds.0 > 0 {
                clamp_u32(t.time_seconds.0)
            } else {
                defaults.time_seconds
            },
            inactivity: t.inactivity.0,
            idle_seconds: if t.idle_seconds.0 > 0 {
                clamp_u32(t.idle_seconds.0)
            } else {
                defaults.idle_seconds
            },
            click: t.click.0,
            click_selector: t.click_selector.trim().to_string(),
        }
    }

    /// Any event-driven trigger configured (everything except `delay`).
    pub fn has_behavioral(&self) -> bool {
        self.exit_intent || self.scroll_depth || self.time_on_page || self.inactivity || self.click
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopBarSettings {
    pub permanent: bool,
    pub position: TopBarPosition,
    pub style: TopBarStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopBarPosition {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopBarStyle {
    Full,
    Compact,
}

/// Re-show cadence after a dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatPolicy {
    pub value: i64,
    pub unit: RepeatUnit,
}

impl RepeatPolicy {
    /// Interval in milliseconds; `None` means dismissal is permanent.
    pub fn interval_ms(&self) -> Option<i64> {
        if self.value <= 0 {
            None
        } else {
            Some(self.value.saturating_mul(self.unit.millis()))
        }
    }
}

impl Default for RepeatPolicy {
    fn default() -> Self {
        Self {
            value: 0,
            unit: RepeatUnit::Days,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatUnit {
    Minutes,
    Hours,
    Days,
}

impl RepeatUnit {
    pub fn millis(&self) -> i64 {
        match self {
            RepeatUnit::Minutes => 60_000,
            RepeatUnit::Hours => 3_600_000,
            RepeatUnit::Days => 86_400_000,
        }
    }

    /// Unknown units read as minutes (the smallest multiplier); an absent
    /// unit means the server default, days.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None => RepeatUnit::Days,
            Some("hours") => RepeatUnit::Hours,
            Some("days") => RepeatUnit::Days,
            Some(_) => RepeatUnit::Minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountdownSettings {
    pub kind: CountdownKind,
    /// Absolute target for [`CountdownKind::Date`].
    pub date: Option<NaiveDateTime>,
    /// Daily target time for [`CountdownKind::Daily`].
    pub time: NaiveTime,
    pub label: Option<String>,
    /// Consumed by the external eligibility filter, carried for adapters.
    pub autohide: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownKind {
    Date,
    Daily,
}

impl CountdownSettings {
    fn from_raw(raw: Option<&RawCountdown>) -> Option<Self> {
        let c = raw?;
        if !c.enabled.0 {
            return None;
        }
        let kind = match c.kind.as_deref() {
            Some("daily") => CountdownKind::Daily,
            _ => CountdownKind::Date,
        };
        Some(Self {
            kind,
            date: parse_server_datetime(&c.date),
            time: NaiveTime::parse_from_str(c.time.trim(), "%H:%M")
                .ok()
                .or_else(|| NaiveTime::from_hms_opt(10, 0, 0))
                .unwrap_or_default(),
            label: non_empty(&c.label),
            autohide: c.autohide.0,
        })
    }
}

/// Rough shape of an icon value, so adapters know how to paint it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    /// Image URL (contains a dot or slash).
    Image,
    /// Named icon-font class.
    Class,
    /// Emoji or other literal glyph.
    Glyph,
}

impl IconKind {
    pub fn classify(icon: &str) -> Self {
        if icon.contains('.') || icon.contains('/') {
            IconKind::Image
        } else if icon.starts_with("dashicons-") || icon.starts_with("icon-") {
            IconKind::Class
        } else {
            IconKind::Glyph
        }
    }
}

impl Notification {
    /// Normalize a raw record and resolve it into the canonical model.
    pub fn from_raw(mut raw: RawNotification) -> Self {
        raw.settings.normalize();
        let s = &raw.settings;

        let floating = if s.show_as_floating.map(|f| f.0).unwrap_or(false) {
            Some(FloatingSettings {
                position: FloatingPosition::parse(
                    s.floating_position.as_deref().unwrap_or("bottom_right"),
                ),
                width: clamp_u32(s.floating_width.0),
                duration_seconds: clamp_u32(s.floating_duration.0),
                triggers: TriggerSettings::from_raw(s.triggers.as_ref()),
            })
        } else {
            None
        };

        let topbar = if s.topbar.0 {
            Some(TopBarSettings {
                permanent: s.topbar_permanent.0,
                position: match s.topbar_position.as_deref() {
                    Some("below") => TopBarPosition::Below,
                    _ => TopBarPosition::Above,
                },
                style: match s.topbar_style.as_deref() {
                    Some("compact") => TopBarStyle::Compact,
                    _ => TopBarStyle::Full,
                },
            })
        } else {
            None
        };

        let settings = DisplaySettings {
            show_in_sidebar: s.show_in_sidebar.as_deref() == Some("1"),
            sidebar_pinned: s.sidebar_pinned.0,
            sidebar_permanent: s.sidebar_permanent.0,
            pinned: s.pinned.0,
            floating,
            topbar,
            repeat: RepeatPolicy {
                value: s.repeat_val.0,
                unit: RepeatUnit::parse(s.repeat_unit.as_deref()),
            },
            countdown: CountdownSettings::from_raw(s.countdown.as_ref()),
        };

        Self {
            id: raw.id,
            title: raw.title,
            body: raw.body,
            icon: non_empty(&raw.icon),
            cta_label: non_empty(&raw.cta_label),
            cta_url: non_empty(&raw.cta_url),
            published_at: parse_server_datetime(&raw.date),
            settings,
        }
    }

    /// Call-to-action, present only when both label and URL are set.
    pub fn cta(&self) -> Option<(&str, &str)> {
        match (self.cta_label.as_deref(), self.cta_url.as_deref()) {
            (Some(label), Some(url)) => Some((label, url)),
            _ => None,
        }
    }
}

fn clamp_u32(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

fn non_empty(value: &str) -> Option<String> {
    let t = value.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Parse the server's local-time strings; several generations of format.
pub(crate) fn parse_server_datetime(value: &str) -> Option<NaiveDateTime> {
    let t = value.trim();
    if t.is_empty() {
        return None;
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(t, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn from_json(value: serde_json::Value) -> Notification {
        Notification::from_raw(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_legacy_toast_record_resolves_to_floating() {
        let n = from_json(json!({
            "id": 1,
            "title": "t",
            "body": "b",
            "settings": { "toast": true, "toast_width": 320 }
        }));

        let floating = n.settings.floating.expect("floating surface");
        assert_eq!(floating.position, FloatingPosition::BottomRight);
        assert_eq!(floating.width, 320);
    }

    #[test]
    fn test_repeat_unit_conversions() {
        let policy = |value, unit| RepeatPolicy {
            value,
            unit: RepeatUnit::parse(unit),
        };
        assert_eq!(policy(1, Some("hours")).interval_ms(), Some(3_600_000));
        assert_eq!(policy(1, Some("days")).interval_ms(), Some(86_400_000));
        assert_eq!(policy(2, Some("minutes")).interval_ms(), Some(120_000));
        assert_eq!(policy(5, Some("bogus")).interval_ms(), Some(300_000));
        assert_eq!(policy(0, Some("days")).interval_ms(), None);
        assert_eq!(policy(-1, None).interval_ms(), None);
    }

    #[test]
    fn test_position_priority_ordering() {
        assert!(FloatingPosition::Center.priority() < FloatingPosition::TopRight.priority());
        assert_eq!(
            FloatingPosition::TopLeft.priority(),
            FloatingPosition::TopRight.priority()
        );
        assert!(FloatingPosition::TopRight.priority() < FloatingPosition::BottomLeft.priority());
    }

    #[test]
    fn test_trigger_defaults_applied() {
        let n = from_json(json!({
            "id": 2,
            "settings": {
                "show_as_floating": "1",
                "triggers": { "scroll_depth": "1", "scroll_percent": 0 }
            }
        }));

        let triggers = &n.settings.floating.unwrap().triggers;
        assert!(triggers.scroll_depth);
        assert_eq!(triggers.scroll_percent, 50);
        assert_eq!(triggers.time_seconds, 30);
        assert_eq!(triggers.idle_seconds, 15);
        assert!(triggers.has_behavioral());
    }

    #[test]
    fn test_cta_requires_both_fields() {
        let n = from_json(json!({
            "id": 3,
            "cta_label": "Go",
            "settings": {}
        }));
        assert_eq!(n.cta(), None);

        let n = from_json(json!({
            "id": 3,
            "cta_label": "Go",
            "cta_url": "https://example.com",
            "settings": {}
        }));
        assert_eq!(n.cta(), Some(("Go", "https://example.com")));
    }

    #[test]
    fn test_date_parsing_variants() {
        assert!(parse_server_datetime("2025-11-03 14:05").is_some());
        assert!(parse_server_datetime("2025-11-03 14:05:59").is_some());
        assert!(parse_server_datetime("2025-11-03").is_some());
        assert!(parse_server_datetime("").is_none());
        assert!(parse_server_datetime("soon").is_none());
    }

    #[test]
    fn test_icon_classification() {
        assert_eq!(IconKind::classify("https://x/y.png"), IconKind::Image);
        assert_eq!(IconKind::classify("dashicons-bell"), IconKind::Class);
        assert_eq!(IconKind::classify("🔥"), IconKind::Glyph);
    }

    #[test]
    fn test_popup_detection() {
        let popup = from_json(json!({
            "id": 4,
            "settings": { "popup": true }
        }));
        assert!(popup.settings.is_popup());
        assert!(!popup.settings.show_in_sidebar);

        let toast = from_json(json!({
            "id": 5,
            "settings": { "toast": true }
        }));
        assert!(!toast.settings.is_popup());
    }
}
