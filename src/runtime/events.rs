/// User-behavior events forwarded into the engine by the host's event
/// source (the page adapter in production, the test harness otherwise).
#[derive(Debug, Clone)]
pub enum ActivityEvent {
    /// Pointer moved anywhere on the page.
    PointerMove,
    /// Page scrolled; `depth_percent` is the current scroll depth 0..=100.
    Scroll { depth_percent: u8 },
    /// Pointer left the viewport through the top edge.
    ExitIntent,
    /// A click happened somewhere on the page.
    Click(ClickEvent),
}

/// A click, pre-resolved by the host adapter.
///
/// Selector matching is a DOM concern: the adapter reports every configured
/// selector that the clicked element (or one of its ancestors) matched, and
/// the engine only tests membership.
#[derive(Debug, Clone, Default)]
pub struct ClickEvent {
    matched_selectors: Vec<String>,
}

impl ClickEvent {
    pub fn new<I, S>(matched_selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            matched_selectors: matched_selectors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, selector: &str) -> bool {
        !selector.is_empty() && self.matched_selectors.iter().any(|s| s == selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_matching() {
        let event = ClickEvent::new(["#cta", ".pricing a"]);
        assert!(event.matches("#cta"));
        assert!(event.matches(".pricing a"));
        assert!(!event.matches("#other"));
    }

    #[test]
    fn test_empty_selector_never_matches() {
        let event = ClickEvent::new([""]);
        assert!(!event.matches(""));
    }
}
