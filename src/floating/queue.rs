use std::collections::VecDeque;

use crate::notification::{FloatingPosition, Notification};

/// The global immediate queue for the floating slot.
///
/// Ordered by position priority — center (modal) first, then the top
/// corners, then the bottom corners — stable within each band, so the
/// server's candidate order breaks ties. Trigger-fired notifications bypass
/// the ordering entirely via [`push_front`](Self::push_front).
#[derive(Debug, Default)]
pub struct FloatingQueue {
    items: VecDeque<Notification>,
}

impl FloatingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue contents and re-sort by position priority.
    pub fn rebuild(&mut self, mut items: Vec<Notification>) {
        items.sort_by_key(Self::priority);
        self.items = items.into();
    }

    fn priority(n: &Notification) -> u8 {
        n.settings
            .floating
            .as_ref()
            .map(|f| f.position.priority())
            .unwrap_or_else(|| FloatingPosition::BottomRight.priority())
    }

    /// Most urgent position: used by trigger firings and delay re-queues.
    pub fn push_front(&mut self, n: Notification) {
        self.items.push_front(n);
    }

    pub fn pop(&mut self) -> Option<Notification> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::RawNotification;
    use serde_json::json;

    fn floating(id: u64, position: &str) -> Notification {
        Notification::from_raw(
            serde_json::from_value::<RawNotification>(json!({
                "id": id,
                "settings": { "show_as_floating": "1", "floating_position": position }
            }))
            .unwrap(),
        )
    }

    #[test]
    fn test_priority_sort() {
        let mut queue = FloatingQueue::new();
        queue.rebuild(vec![
            floating(1, "bottom_right"),
            floating(2, "top_right"),
            floating(3, "center"),
            floating(4, "bottom_left"),
        ]);

        let order: Vec<u64> = std::iter::from_fn(|| queue.pop()).map(|n| n.id).collect();
        assert_eq!(order, vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_sort_is_stable_within_band() {
        let mut queue = FloatingQueue::new();
        queue.rebuild(vec![
            floating(10, "bottom_left"),
            floating(11, "bottom_right"),
            floating(12, "bottom_left"),
        ]);

        let order: Vec<u64> = std::iter::from_fn(|| queue.pop()).map(|n| n.id).collect();
        assert_eq!(order, vec![10, 11, 12]);
    }

    #[test]
    fn test_push_front_beats_priority() {
        let mut queue = FloatingQueue::new();
        queue.rebuild(vec![floating(1, "center")]);
        queue.push_front(floating(2, "bottom_right"));

        assert_eq!(queue.pop().map(|n| n.id), Some(2));
        assert_eq!(queue.pop().map(|n| n.id), Some(1));
        assert!(queue.is_empty());
    }
}
