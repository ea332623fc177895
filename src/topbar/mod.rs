//! Top bar rotation.
//!
//! Holds the ordered list of topbar-eligible notifications and the rotation
//! cursor. With more than one item the engine rotates on a timer using a
//! two-phase transition: the outgoing item is marked exiting, the incoming
//! one active, and both settle after the transition duration. Dismissing
//! the bar dismisses every item currently in the list and stops rotation.

use crate::config::TopBarGlobalConfig;
use crate::notification::{Notification, NotificationId, TopBarPosition, TopBarStyle};
use crate::render::TopBarView;

#[derive(Debug, Default)]
pub struct TopBarRotator {
    items: Vec<Notification>,
    active: usize,
    exiting: Option<usize>,
}

impl TopBarRotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the item list and reset the rotation cursor.
    pub fn sync(&mut self, items: Vec<Notification>) {
        self.items = items;
        self.active = 0;
        self.exiting = None;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_ids(&self) -> Vec<NotificationId> {
        self.items.iter().map(|n| n.id).collect()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Advance the cursor, wrapping modulo list length. Returns false when
    /// there is nothing to rotate to.
    pub fn rotate(&mut self) -> bool {
        if self.items.len() <= 1 {
            return false;
        }
        self.exiting = Some(self.active);
        self.active = (self.active + 1) % self.items.len();
        tracing::debug!(active = self.active, "Top bar rotated");
        true
    }

    /// Transition finished: clear the exiting mark.
    pub fn settle(&mut self) {
        self.exiting = None;
    }

    /// Empty the bar (after a bulk dismissal).
    pub fn clear(&mut self) {
        self.items.clear();
        self.active = 0;
        self.exiting = None;
    }

    /// Resolved view for the sink; `None` when the bar has nothing to show.
    pub fn view(&self, config: &TopBarGlobalConfig) -> Option<TopBarView> {
        if self.items.is_empty() {
            return None;
        }
        let any_permanent = self
            .items
            .iter()
            .any(|n| n.settings.topbar.as_ref().is_some_and(|t| t.permanent));
        let compact = self
            .items
            .iter()
            .any(|n| {
                n.settings
                    .topbar
                    .as_ref()
                    .is_some_and(|t| t.style == TopBarStyle::Compact)
            });
        let below_header = self
            .items
            .iter()
            .any(|n| {
                n.settings
                    .topbar
                    .as_ref()
                    .is_some_and(|t| t.position == TopBarPosition::Below)
            });

        Some(TopBarView {
            items: self.items.clone(),
            active: self.active,
            exiting: self.exiting,
            show_dots: self.items.len() > 1,
            dismissible: config.dismissible && !any_permanent,
            sticky: config.sticky,
            compact,
            below_header,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::RawNotification;
    use serde_json::json;

    fn topbar_notif(id: u64, extra: serde_json::Value) -> Notification {
        let mut settings = json!({ "topbar": true });
        if let (Some(a), Some(b)) = (settings.as_object_mut(), extra.as_object()) {
            for (k, v) in b {
                a.insert(k.clone(), v.clone());
            }
        }
        Notification::from_raw(
            serde_json::from_value::<RawNotification>(json!({ "id": id, "settings": settings }))
                .unwrap(),
        )
    }

    fn config() -> TopBarGlobalConfig {
        TopBarGlobalConfig::default()
    }

    #[test]
    fn test_rotation_wraps() {
        let mut rotator = TopBarRotator::new();
        rotator.sync(vec![
            topbar_notif(1, json!({})),
            topbar_notif(2, json!({})),
            topbar_notif(3, json!({})),
        ]);

        assert!(rotator.rotate());
        assert_eq!(rotator.active_index(), 1);
        assert!(rotator.rotate());
        assert!(rotator.rotate());
        assert_eq!(rotator.active_index(), 0);
    }

    #[test]
    fn test_single_item_does_not_rotate() {
        let mut rotator = TopBarRotator::new();
        rotator.sync(vec![topbar_notif(1, json!({}))]);
        assert!(!rotator.rotate());
        assert_eq!(rotator.active_index(), 0);
    }

    #[test]
    fn test_two_phase_transition_marks() {
        let mut rotator = TopBarRotator::new();
        rotator.sync(vec![topbar_notif(1, json!({})), topbar_notif(2, json!({}))]);

        rotator.rotate();
        let view = rotator.view(&config()).unwrap();
        assert_eq!(view.active, 1);
        assert_eq!(view.exiting, Some(0));

        rotator.settle();
        let view = rotator.view(&config()).unwrap();
        assert_eq!(view.exiting, None);
    }

    #[test]
    fn test_view_flags() {
        let mut rotator = TopBarRotator::new();
        rotator.sync(vec![
            topbar_notif(1, json!({ "topbar_style": "compact" })),
            topbar_notif(2, json!({ "topbar_position": "below", "topbar_permanent": true })),
        ]);

        let view = rotator.view(&config()).unwrap();
        assert!(view.show_dots);
        assert!(view.compact);
        assert!(view.below_header);
        // A permanent item hides the dismiss control for the whole bar.
        assert!(!view.dismissible);
    }

    #[test]
    fn test_empty_view() {
        let rotator = TopBarRotator::new();
        assert!(rotator.view(&config()).is_none());
    }
}
