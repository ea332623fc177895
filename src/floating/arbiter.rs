use std::collections::HashSet;
use std::time::Duration;

use crate::engine::EngineCtx;
use crate::notification::{Notification, NotificationId};
use crate::render::FloatingView;
use crate::runtime::{ActivityEvent, EngineTimer};
use crate::storage::Surface;

use super::{FloatingQueue, TriggerWatch};

/// Pause between a close and the next queue advance, so the outgoing
/// element's exit animation settles before anything new appears.
const SETTLE_DELAY: Duration = Duration::from_millis(400);

/// Arbitration engine for the single floating slot.
///
/// Conceptually a three-state machine — idle, scheduled (an item popped and
/// waiting out its delay), showing — held as two payload slots. Mutual
/// exclusion is enforced by checking the showing slot synchronously before
/// every transition; the engine is single-threaded, so that check is
/// sufficient. A delay window does not occupy the screen: a trigger firing
/// during it may show first, in which case the delayed item returns to the
/// head of the queue when its timer lapses.
pub struct FloatingArbiter {
    queue: FloatingQueue,
    watch: TriggerWatch,
    session_shown: HashSet<NotificationId>,
    showing: Option<Notification>,
    delayed: Option<Notification>,
}

impl FloatingArbiter {
    pub fn new(now_ms: i64) -> Self {
        Self {
            queue: FloatingQueue::new(),
            watch: TriggerWatch::new(now_ms),
            session_shown: HashSet::new(),
            showing: None,
            delayed: None,
        }
    }

    /// Ids already surfaced since the engine started. Feeds the floating
    /// eligibility filter; cleared only by constructing a fresh engine
    /// (a full page load).
    pub fn session_shown(&self) -> &HashSet<NotificationId> {
        &self.session_shown
    }

    pub fn active_id(&self) -> Option<NotificationId> {
        self.showing.as_ref().map(|n| n.id)
    }

    pub fn active(&self) -> Option<&Notification> {
        self.showing.as_ref()
    }

    /// Fetch-cycle entry point: split eligible candidates into the
    /// immediate queue and the pending-trigger list, then try to advance.
    ///
    /// An item with a delay trigger stays in the immediate queue and
    /// carries its delay forward, even when behavioral triggers are also
    /// configured; behavioral-only items wait for their events. An item
    /// whose trigger already fired but that has not reached the screen yet
    /// re-enters the immediate queue, so a rebuild cannot strand it behind
    /// its own latch. The item currently waiting out a delay is skipped —
    /// it is already scheduled.
    pub(crate) fn sync(&mut self, candidates: Vec<Notification>, ctx: &EngineCtx<'_>) {
        let delayed_id = self.delayed.as_ref().map(|n| n.id);
        let mut immediate = Vec::new();
        let mut pending = Vec::new();
        for n in candidates {
            if Some(n.id) == delayed_id {
                continue;
            }
            let Some(floating) = n.settings.floating.as_ref() else {
                continue;
            };
            let awaiting_trigger = !floating.triggers.delay
                && floating.triggers.has_behavioral()
                && !self.watch.has_fired(n.id);
            if awaiting_trigger {
                pending.push(n);
            } else {
                immediate.push(n);
            }
        }
        self.queue.rebuild(immediate);
        self.watch.rebuild(pending);

        if self.watch.has_pending() && !self.watch.installed() {
            self.watch.install();
            tracing::debug!("Behavioral trigger listeners installed");
        }

        tracing::debug!(
            immediate = self.queue.len(),
            pending = self.watch.pending_len(),
            "Floating queues rebuilt"
        );
        self.advance(ctx);
    }

    /// Pop and present the next immediate item, unless the slot is taken.
    pub(crate) fn advance(&mut self, ctx: &EngineCtx<'_>) {
        if self.showing.is_some() {
            tracing::trace!("Floating slot occupied, holding queue");
            return;
        }
        let Some(n) = self.queue.pop() else {
            return;
        };

        let delay_seconds = n
            .settings
            .floating
            .as_ref()
            .map(|f| {
                if f.triggers.delay {
                    f.triggers.delay_seconds
                } else {
                    0
                }
            })
            .unwrap_or(0);

        if delay_seconds > 0 {
            // Single delayed slot: a second delay-carrying pop waits its turn.
            if self.delayed.is_some() {
                self.queue.push_front(n);
                return;
            }
            tracing::debug!(id = n.id, delay_seconds, "Floating item scheduled");
            ctx.scheduler.arm(
                EngineTimer::FloatingDelay(n.id),
                Duration::from_secs(u64::from(delay_seconds)),
            );
            self.delayed = Some(n);
        } else {
            self.show(n, ctx);
        }
    }

    /// A delay timer lapsed. If something else claimed the slot in the
    /// interim, the delayed item goes back to the head of the queue.
    pub(crate) fn on_delay_elapsed(&mut self, id: NotificationId, ctx: &EngineCtx<'_>) {
        match self.delayed.take() {
            Some(n) if n.id == id => {
                if self.showing.is_some() {
                    tracing::debug!(id, "Slot taken during delay, re-queued at front");
                    self.queue.push_front(n);
                } else {
                    self.show(n, ctx);
                }
            }
            other => self.delayed = other,
        }
    }

    /// Auto-close timer lapsed; only acts if the item is still the one on
    /// screen (the user may have closed it already).
    pub(crate) fn on_auto_close(&mut self, id: NotificationId, ctx: &EngineCtx<'_>) {
        if self.active_id() == Some(id) {
            tracing::debug!(id, "Auto-close duration elapsed");
            self.close(id, ctx);
        }
    }

    /// Settle pause after a close finished; re-arbitrate.
    pub(crate) fn on_settle(&mut self, ctx: &EngineCtx<'_>) {
        self.advance(ctx);
    }

    /// Close the floating item: record the dismissal, drop the element,
    /// free the slot, and schedule the next advance.
    pub(crate) fn close(&mut self, id: NotificationId, ctx: &EngineCtx<'_>) {
        ctx.store
            .record_dismissal(Surface::Floating, id, ctx.clock.now_ms());
        ctx.sink.remove_floating(id);
        if self.active_id() == Some(id) {
            self.showing = None;
            ctx.scheduler.arm(EngineTimer::FloatingSettle, SETTLE_DELAY);
            tracing::debug!(id, "Floating slot freed");
        }
    }

    /// Route a user-behavior event through the trigger watch. Events are
    /// ignored until listeners install (first sync with pending triggers).
    pub(crate) fn handle_activity(&mut self, event: &ActivityEvent, ctx: &EngineCtx<'_>) {
        if !self.watch.installed() {
            return;
        }
        let now_ms = ctx.clock.now_ms();
        let fired = match event {
            ActivityEvent::PointerMove => {
                self.watch.note_activity(now_ms);
                Vec::new()
            }
            ActivityEvent::Scroll { depth_percent } => {
                self.watch.on_scroll(*depth_percent, ctx.store, now_ms)
            }
            ActivityEvent::ExitIntent => self.watch.on_exit_intent(ctx.store, now_ms),
            ActivityEvent::Click(click) => self.watch.on_click(click, ctx.store, now_ms),
        };
        self.fire_all(fired, ctx);
    }

    /// One-second poll for the clock-based triggers.
    pub(crate) fn poll_triggers(&mut self, ctx: &EngineCtx<'_>) {
        if !self.watch.installed() {
            return;
        }
        let fired = self.watch.poll(ctx.store, ctx.clock.now_ms());
        self.fire_all(fired, ctx);
    }

    fn fire_all(&mut self, fired: Vec<Notification>, ctx: &EngineCtx<'_>) {
        for n in fired {
            tracing::info!(id = n.id, "Behavioral trigger fired");
            self.queue.push_front(n);
            self.advance(ctx);
        }
    }

    fn show(&mut self, n: Notification, ctx: &EngineCtx<'_>) {
        // Duplicate render attempt: the element is already on screen.
        if ctx.sink.floating_present(n.id) {
            tracing::debug!(id = n.id, "Floating element already present, skipping");
            return;
        }
        self.session_shown.insert(n.id);
        if ctx.settings.display.sound_enabled {
            ctx.sink.play_sound();
        }
        let view = FloatingView::new(&n);
        if let Some(auto_close) = view.auto_close {
            ctx.scheduler
                .arm(EngineTimer::FloatingAutoClose(n.id), auto_close);
        }
        ctx.sink.show_floating(&view);
        tracing::info!(id = n.id, position = ?view.position, "Floating notification shown");
        self.showing = Some(n);
    }
}
