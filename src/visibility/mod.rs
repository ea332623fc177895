//! Per-surface candidate filters.
//!
//! A dismissal suppresses a notification on one surface only, until the
//! repeat policy's window has elapsed (or forever when no repeat interval
//! is configured). Each surface combines that predicate with its own
//! structural rules.

use std::collections::HashSet;

use crate::notification::{Notification, NotificationId};
use crate::storage::{StateStore, Surface};

/// Whether `n` is currently suppressed on `surface`.
///
/// Dismissed at `t` with repeat interval `R`: suppressed while
/// `now < t + R`; with no interval, suppressed forever.
pub fn is_suppressed(store: &StateStore, surface: Surface, n: &Notification, now_ms: i64) -> bool {
    let Some(dismissed_at) = store.dismissed_at(surface, n.id) else {
        return false;
    };
    match n.settings.repeat.interval_ms() {
        None => true,
        Some(interval) => now_ms < dismissed_at + interval,
    }
}

/// Sidebar list: opted-in items that are not suppressed, pinned first
/// (stable within each group).
pub fn sidebar_candidates<'a>(
    notifications: &'a [Notification],
    store: &StateStore,
    now_ms: i64,
) -> Vec<&'a Notification> {
    let mut items: Vec<&Notification> = notifications
        .iter()
        .filter(|n| n.settings.show_in_sidebar)
        .filter(|n| !is_suppressed(store, Surface::Sidebar, n, now_ms))
        .collect();
    items.sort_by_key(|n| !n.settings.sidebar_pinned);
    items
}

/// Badge count: top-bar items and non-pinned popups never count; read and
/// suppressed items are then removed. Suppression is checked against the
/// sidebar dismissal map (the badge is a sidebar affordance).
pub fn badge_count(
    notifications: &[Notification],
    store: &StateStore,
    read_ids: &HashSet<NotificationId>,
    now_ms: i64,
) -> usize {
    notifications
        .iter()
        .filter(|n| n.settings.topbar.is_none())
        .filter(|n| !(n.settings.is_popup() && !n.settings.pinned))
        .filter(|n| !read_ids.contains(&n.id))
        .filter(|n| !is_suppressed(store, Surface::Sidebar, n, now_ms))
        .count()
}

/// Top bar: flagged items that are not suppressed on the top-bar surface.
pub fn topbar_candidates<'a>(
    notifications: &'a [Notification],
    store: &StateStore,
    now_ms: i64,
) -> Vec<&'a Notification> {
    notifications
        .iter()
        .filter(|n| n.settings.topbar.is_some())
        .filter(|n| !is_suppressed(store, Surface::TopBar, n, now_ms))
        .collect()
}

/// Floating: opted-in items not yet surfaced this session and not
/// suppressed on the floating surface.
pub fn floating_candidates<'a>(
    notifications: &'a [Notification],
    store: &StateStore,
    session_shown: &HashSet<NotificationId>,
    now_ms: i64,
) -> Vec<&'a Notification> {
    notifications
        .iter()
        .filter(|n| n.settings.floating.is_some())
        .filter(|n| !session_shown.contains(&n.id))
        .filter(|n| !is_suppressed(store, Surface::Floating, n, now_ms))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::notification::RawNotification;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn notif(value: serde_json::Value) -> Notification {
        Notification::from_raw(serde_json::from_value::<RawNotification>(value).unwrap())
    }

    fn store() -> StateStore {
        StateStore::new(Arc::new(MemoryStorage::new()), 0)
    }

    #[test]
    fn test_permanent_suppression() {
        let n = notif(json!({ "id": 1, "settings": { "show_in_sidebar": "1" } }));
        let store = store();

        assert!(!is_suppressed(&store, Surface::Sidebar, &n, 1_000));
        store.record_dismissal(Surface::Sidebar, 1, 1_000);
        assert!(is_suppressed(&store, Surface::Sidebar, &n, 1_001));
        assert!(is_suppressed(&store, Surface::Sidebar, &n, i64::MAX));
    }

    #[test]
    fn test_repeat_window_boundaries() {
        let n = notif(json!({
            "id": 9,
            "settings": { "show_in_sidebar": "1", "repeat_val": 1, "repeat_unit": "days" }
        }));
        let store = store();
        let t = 500_000;
        store.record_dismissal(Surface::Sidebar, 9, t);

        assert!(is_suppressed(&store, Surface::Sidebar, &n, t));
        assert!(is_suppressed(&store, Surface::Sidebar, &n, t + 86_399_999));
        assert!(!is_suppressed(&store, Surface::Sidebar, &n, t + 86_400_000));
        assert!(!is_suppressed(&store, Surface::Sidebar, &n, t + 86_400_001));
    }

    #[test]
    fn test_dismissal_on_one_surface_leaves_others() {
        let n = notif(json!({
            "id": 3,
            "settings": { "show_in_sidebar": "1", "toast": true, "topbar": true }
        }));
        let store = store();
        store.record_dismissal(Surface::Floating, 3, 10);

        assert!(is_suppressed(&store, Surface::Floating, &n, 20));
        assert!(!is_suppressed(&store, Surface::Sidebar, &n, 20));
        assert!(!is_suppressed(&store, Surface::TopBar, &n, 20));
    }

    #[test]
    fn test_sidebar_candidates_pinned_first() {
        let items = vec![
            notif(json!({ "id": 1, "settings": { "show_in_sidebar": "1" } })),
            notif(json!({ "id": 2, "settings": { "show_in_sidebar": "1", "sidebar_pinned": true } })),
            notif(json!({ "id": 3, "settings": { "show_in_sidebar": "0" } })),
        ];
        let store = store();

        let list = sidebar_candidates(&items, &store, 0);
        let ids: Vec<_> = list.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_badge_exclusions() {
        let items = vec![
            notif(json!({ "id": 1, "settings": { "show_in_sidebar": "1" } })),
            notif(json!({ "id": 2, "settings": { "topbar": true } })),
            notif(json!({ "id": 3, "settings": { "popup": true } })),
            notif(json!({ "id": 4, "settings": { "popup": true, "pinned": true } })),
        ];
        let store = store();
        let mut read = HashSet::new();

        // topbar (2) and non-pinned popup (3) excluded structurally.
        assert_eq!(badge_count(&items, &store, &read, 0), 2);

        read.insert(1);
        assert_eq!(badge_count(&items, &store, &read, 0), 1);

        store.record_dismissal(Surface::Sidebar, 4, 0);
        assert_eq!(badge_count(&items, &store, &read, 1), 0);
    }

    #[test]
    fn test_floating_candidates_skip_session_shown() {
        let items = vec![
            notif(json!({ "id": 1, "settings": { "toast": true } })),
            notif(json!({ "id": 2, "settings": { "toast": true } })),
        ];
        let store = store();
        let mut shown = HashSet::new();
        shown.insert(1);

        let eligible = floating_candidates(&items, &store, &shown, 0);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, 2);
    }
}
