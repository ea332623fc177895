use std::collections::HashSet;

use crate::notification::{Notification, NotificationId, TriggerSettings};
use crate::runtime::ClickEvent;
use crate::storage::{StateStore, Surface};
use crate::visibility;

/// Behavioral-trigger subsystem for the floating surface.
///
/// Holds the notifications waiting on exit-intent / scroll-depth /
/// time-on-page / inactivity / click conditions. A notification's triggers
/// are OR-combined: the first condition to hit fires the notification as a
/// whole and latches it for the rest of the session. Suppressed
/// notifications are skipped by every check.
///
/// Listeners install at most once per page lifetime; until then the watch
/// ignores events, matching a page with no trigger subscriptions.
#[derive(Debug)]
pub struct TriggerWatch {
    pending: Vec<Notification>,
    fired: HashSet<NotificationId>,
    installed: bool,
    page_loaded_ms: i64,
    last_activity_ms: i64,
    max_scroll_percent: u8,
}

impl TriggerWatch {
    pub fn new(now_ms: i64) -> Self {
        Self {
            pending: Vec::new(),
            fired: HashSet::new(),
            installed: false,
            page_loaded_ms: now_ms,
            last_activity_ms: now_ms,
            max_scroll_percent: 0,
        }
    }

    /// Replace the pending list on a fetch cycle. Fired ids stay latched
    /// across rebuilds.
    pub fn rebuild(&mut self, pending: Vec<Notification>) {
        self.pending = pending;
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether `id` has already fired (and latched) this session.
    pub fn has_fired(&self, id: NotificationId) -> bool {
        self.fired.contains(&id)
    }

    pub fn installed(&self) -> bool {
        self.installed
    }

    /// Idempotent; listeners are never torn down once installed.
    pub fn install(&mut self) {
        self.installed = true;
    }

    /// Pointer movement or scrolling resets the idle clock.
    pub fn note_activity(&mut self, now_ms: i64) {
        self.last_activity_ms = now_ms;
    }

    /// Scroll depth only ever increases; scrolling back up neither resets
    /// nor re-fires.
    pub fn on_scroll(
        &mut self,
        depth_percent: u8,
        store: &StateStore,
        now_ms: i64,
    ) -> Vec<Notification> {
        self.note_activity(now_ms);
        let depth = depth_percent.min(100);
        if depth <= self.max_scroll_percent {
            return Vec::new();
        }
        self.max_scroll_percent = depth;
        self.fire_matching(store, now_ms, |t| {
            t.scroll_depth && depth >= t.scroll_percent
        })
    }

    pub fn on_exit_intent(&mut self, store: &StateStore, now_ms: i64) -> Vec<Notification> {
        self.fire_matching(store, now_ms, |t| t.exit_intent)
    }

    pub fn on_click(
        &mut self,
        event: &ClickEvent,
        store: &StateStore,
        now_ms: i64,
    ) -> Vec<Notification> {
        self.fire_matching(store, now_ms, |t| {
            t.click && event.matches(&t.click_selector)
        })
    }

    /// One-second poll: time-on-page and inactivity thresholds.
    pub fn poll(&mut self, store: &StateStore, now_ms: i64) -> Vec<Notification> {
        let on_page_seconds = (now_ms - self.page_loaded_ms) / 1000;
        let idle_seconds = (now_ms - self.last_activity_ms) / 1000;
        self.fire_matching(store, now_ms, |t| {
            (t.time_on_page && on_page_seconds >= i64::from(t.time_seconds))
                || (t.inactivity && idle_seconds >= i64::from(t.idle_seconds))
        })
    }

    fn fire_matching<F>(&mut self, store: &StateStore, now_ms: i64, matches: F) -> Vec<Notification>
    where
        F: Fn(&TriggerSettings) -> bool,
    {
        let mut fired = Vec::new();
        for n in &self.pending {
            if self.fired.contains(&n.id) {
                continue;
            }
            if visibility::is_suppressed(store, Surface::Floating, n, now_ms) {
                continue;
            }
            let Some(floating) = n.settings.floating.as_ref() else {
                continue;
            };
            if matches(&floating.triggers) {
                fired.push(n.clone());
            }
        }
        for n in &fired {
            self.fired.insert(n.id);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::notification::RawNotification;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn notif(id: u64, triggers: serde_json::Value) -> Notification {
        Notification::from_raw(
            serde_json::from_value::<RawNotification>(json!({
                "id": id,
                "settings": { "show_as_floating": "1", "triggers": triggers }
            }))
            .unwrap(),
        )
    }

    fn store() -> StateStore {
        StateStore::new(Arc::new(MemoryStorage::new()), 0)
    }

    #[test]
    fn test_scroll_depth_fires_at_threshold() {
        let mut watch = TriggerWatch::new(0);
        watch.install();
        watch.rebuild(vec![notif(1, json!({ "scroll_depth": true, "scroll_percent": 50 }))]);
        let store = store();

        assert!(watch.on_scroll(30, &store, 100).is_empty());
        let fired = watch.on_scroll(55, &store, 200);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, 1);
    }

    #[test]
    fn test_scroll_depth_is_monotonic() {
        let mut watch = TriggerWatch::new(0);
        watch.install();
        watch.rebuild(vec![notif(1, json!({ "scroll_depth": true, "scroll_percent": 50 }))]);
        let store = store();

        watch.on_scroll(60, &store, 100);
        // Scrolling back up and down again must not re-fire.
        assert!(watch.on_scroll(10, &store, 200).is_empty());
        assert!(watch.on_scroll(70, &store, 300).is_empty());
    }

    #[test]
    fn test_or_combination_latches_whole_notification() {
        let mut watch = TriggerWatch::new(0);
        watch.install();
        watch.rebuild(vec![notif(
            7,
            json!({ "scroll_depth": true, "scroll_percent": 50, "time_on_page": true, "time_seconds": 30 }),
        )]);
        let store = store();

        let fired = watch.on_scroll(80, &store, 5_000);
        assert_eq!(fired.len(), 1);

        // The other configured trigger reaching its threshold later must
        // not fire the notification a second time.
        assert!(watch.poll(&store, 60_000).is_empty());
    }

    #[test]
    fn test_time_on_page_poll() {
        let mut watch = TriggerWatch::new(0);
        watch.install();
        watch.rebuild(vec![notif(2, json!({ "time_on_page": true, "time_seconds": 30 }))]);
        let store = store();

        assert!(watch.poll(&store, 29_000).is_empty());
        assert_eq!(watch.poll(&store, 30_000).len(), 1);
    }

    #[test]
    fn test_inactivity_resets_on_activity() {
        let mut watch = TriggerWatch::new(0);
        watch.install();
        watch.rebuild(vec![notif(3, json!({ "inactivity": true, "idle_seconds": 15 }))]);
        let store = store();

        watch.note_activity(10_000);
        assert!(watch.poll(&store, 20_000).is_empty());

        // 15 idle seconds after the last activity.
        assert_eq!(watch.poll(&store, 25_000).len(), 1);
    }

    #[test]
    fn test_click_selector_matching() {
        let mut watch = TriggerWatch::new(0);
        watch.install();
        watch.rebuild(vec![notif(4, json!({ "click": true, "click_selector": "#buy" }))]);
        let store = store();

        let miss = ClickEvent::new(["#other"]);
        assert!(watch.on_click(&miss, &store, 100).is_empty());

        let hit = ClickEvent::new(["#buy"]);
        assert_eq!(watch.on_click(&hit, &store, 200).len(), 1);

        // Latched.
        assert!(watch.on_click(&hit, &store, 300).is_empty());
    }

    #[test]
    fn test_exit_intent_fires_once() {
        let mut watch = TriggerWatch::new(0);
        watch.install();
        watch.rebuild(vec![notif(5, json!({ "exit_intent": true }))]);
        let store = store();

        assert_eq!(watch.on_exit_intent(&store, 100).len(), 1);
        assert!(watch.on_exit_intent(&store, 200).is_empty());
    }

    #[test]
    fn test_suppressed_notifications_are_skipped() {
        let mut watch = TriggerWatch::new(0);
        watch.install();
        watch.rebuild(vec![notif(6, json!({ "exit_intent": true }))]);
        let store = store();
        store.record_dismissal(Surface::Floating, 6, 50);

        assert!(watch.on_exit_intent(&store, 100).is_empty());
        // Not latched by the suppressed attempt: nothing fired.
        assert!(watch.on_exit_intent(&store, 200).is_empty());
    }

    #[test]
    fn test_latch_survives_rebuild() {
        let mut watch = TriggerWatch::new(0);
        watch.install();
        let n = notif(8, json!({ "exit_intent": true }));
        watch.rebuild(vec![n.clone()]);
        let store = store();

        assert_eq!(watch.on_exit_intent(&store, 100).len(), 1);
        watch.rebuild(vec![n]);
        assert!(watch.on_exit_intent(&store, 200).is_empty());
    }
}
