//! Rendering contracts.
//!
//! The engine never touches a real page. It resolves and filters data into
//! the view structs below and hands them to a [`RenderSink`]; the host
//! adapter paints them and wires user actions (dismiss, mark-read, close)
//! back into the engine's mutation methods. Each sink method is expected to
//! no-op independently when its target container is absent, so one missing
//! surface never blocks the others.

use std::time::Duration;

use dashmap::DashMap;

use crate::config::BadgeStyle;
use crate::countdown::CountdownTick;
use crate::notification::{
    relative_age, FloatingPosition, Notification, NotificationId, RelativeAge,
};

/// Bodies longer than this get an expand/collapse control in the sidebar.
const EXPANDABLE_BODY_CHARS: usize = 150;

/// One entry of the sidebar list, fully resolved.
#[derive(Debug, Clone)]
pub struct SidebarItem {
    pub notification: Notification,
    pub read: bool,
    pub pinned: bool,
    /// False for permanent entries, which hide their dismiss control.
    pub dismissible: bool,
    pub expandable: bool,
    pub age: Option<RelativeAge>,
}

impl SidebarItem {
    pub fn new(n: &Notification, read: bool, now_local: chrono::NaiveDateTime) -> Self {
        Self {
            notification: n.clone(),
            read,
            pinned: n.settings.sidebar_pinned,
            dismissible: !n.settings.sidebar_permanent,
            expandable: n.body.chars().count() > EXPANDABLE_BODY_CHARS,
            age: n.published_at.map(|d| relative_age(d, now_local)),
        }
    }
}

/// Unread badge state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeView {
    pub count: usize,
    /// Pre-formatted label: empty in dot style, count clamped to "9+".
    pub label: String,
    pub style: BadgeStyle,
    pub visible: bool,
}

impl BadgeView {
    pub fn new(count: usize, style: BadgeStyle) -> Self {
        let label = match style {
            BadgeStyle::Dot => String::new(),
            BadgeStyle::Count => {
                if count > 9 {
                    "9+".to_string()
                } else {
                    count.to_string()
                }
            }
        };
        Self {
            count,
            label,
            style,
            visible: count > 0,
        }
    }
}

/// The floating item to put on screen.
#[derive(Debug, Clone)]
pub struct FloatingView {
    pub notification: Notification,
    pub position: FloatingPosition,
    /// Fixed pixel width, when configured.
    pub width: Option<u32>,
    /// Auto-close duration, when configured.
    pub auto_close: Option<Duration>,
}

impl FloatingView {
    pub fn new(n: &Notification) -> Self {
        let floating = n.settings.floating.as_ref();
        let position = floating
            .map(|f| f.position)
            .unwrap_or(FloatingPosition::BottomRight);
        let width = floating.map(|f| f.width).filter(|w| *w > 0);
        let auto_close = floating
            .map(|f| f.duration_seconds)
            .filter(|d| *d > 0)
            .map(|d| Duration::from_secs(u64::from(d)));
        Self {
            notification: n.clone(),
            position,
            width,
            auto_close,
        }
    }
}

/// Top bar state: the full item list plus which entry is active and which
/// is mid-transition out.
#[derive(Debug, Clone)]
pub struct TopBarView {
    pub items: Vec<Notification>,
    pub active: usize,
    pub exiting: Option<usize>,
    pub show_dots: bool,
    pub dismissible: bool,
    pub sticky: bool,
    pub compact: bool,
    pub below_header: bool,
}

/// Rendering surface implemented by host adapters.
pub trait RenderSink: Send + Sync {
    fn render_list(&self, items: &[SidebarItem]);
    fn render_badge(&self, badge: &BadgeView);
    fn show_floating(&self, view: &FloatingView);
    fn remove_floating(&self, id: NotificationId);
    /// Whether a floating element for `id` is already on screen. Sinks
    /// without real presence tracking may keep the default.
    fn floating_present(&self, _id: NotificationId) -> bool {
        false
    }
    /// `None` hides the bar.
    fn render_topbar(&self, view: Option<&TopBarView>);
    fn update_countdowns(&self, ticks: &[CountdownTick]);
    fn play_sound(&self) {}
}

/// Sink that narrates every render through `tracing`. Used by the demo
/// binary; doubles as a reference for adapter authors.
#[derive(Debug, Default)]
pub struct LogSink {
    floating: DashMap<NotificationId, ()>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSink for LogSink {
    fn render_list(&self, items: &[SidebarItem]) {
        tracing::info!(count = items.len(), "render sidebar list");
        for item in items {
            tracing::debug!(
                id = item.notification.id,
                read = item.read,
                pinned = item.pinned,
                title = %item.notification.title,
                "sidebar item"
            );
        }
    }

    fn render_badge(&self, badge: &BadgeView) {
        tracing::info!(count = badge.count, label = %badge.label, visible = badge.visible, "render badge");
    }

    fn show_floating(&self, view: &FloatingView) {
        self.floating.insert(view.notification.id, ());
        tracing::info!(
            id = view.notification.id,
            position = ?view.position,
            title = %view.notification.title,
            "show floating notification"
        );
    }

    fn remove_floating(&self, id: NotificationId) {
        self.floating.remove(&id);
        tracing::info!(id, "remove floating notification");
    }

    fn floating_present(&self, id: NotificationId) -> bool {
        self.floating.contains_key(&id)
    }

    fn render_topbar(&self, view: Option<&TopBarView>) {
        match view {
            Some(view) => tracing::info!(
                items = view.items.len(),
                active = view.active,
                exiting = ?view.exiting,
                "render top bar"
            ),
            None => tracing::info!("hide top bar"),
        }
    }

    fn update_countdowns(&self, ticks: &[CountdownTick]) {
        for tick in ticks {
            tracing::trace!(
                id = tick.id,
                expired = tick.remaining.expired,
                "countdown tick"
            );
        }
    }

    fn play_sound(&self) {
        tracing::debug!("notification sound");
    }
}
