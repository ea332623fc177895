//! Engine facade.
//!
//! [`NotificationCenter`] owns every piece of engine state — candidate
//! list, arbiter, rotator, countdown board, persistent store — behind
//! injected clock/scheduler/sink/storage seams. Hosts drive it with three
//! inputs: fired timers, user-behavior events, and the user-action
//! mutations wired up by the render adapter.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::countdown::CountdownBoard;
use crate::fetch::{CandidateSource, PageContext};
use crate::floating::FloatingArbiter;
use crate::notification::{Notification, NotificationId, RawNotification};
use crate::render::{BadgeView, RenderSink, SidebarItem};
use crate::runtime::{ActivityEvent, Clock, EngineTimer, Scheduler, TimerId};
use crate::storage::{StateStore, StorageBackend, Surface};
use crate::topbar::TopBarRotator;
use crate::visibility;

/// Heartbeat driving trigger polls and countdown updates.
const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Top bar cross-fade duration.
const TOPBAR_TRANSITION: Duration = Duration::from_millis(400);

/// Borrowed handles passed into subcomponents for one operation.
pub(crate) struct EngineCtx<'a> {
    pub clock: &'a dyn Clock,
    pub scheduler: &'a dyn Scheduler,
    pub sink: &'a dyn RenderSink,
    pub store: &'a StateStore,
    pub settings: &'a Settings,
}

/// One engine instance per page load. No ambient module state: several
/// independent instances can coexist (and do, in tests).
pub struct NotificationCenter {
    settings: Settings,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    sink: Arc<dyn RenderSink>,
    store: StateStore,
    notifications: Vec<Notification>,
    arbiter: FloatingArbiter,
    topbar: TopBarRotator,
    countdowns: CountdownBoard,
    topbar_rotate_timer: Option<TimerId>,
    ticker_armed: bool,
}

macro_rules! ctx {
    ($self:ident) => {
        EngineCtx {
            clock: $self.clock.as_ref(),
            scheduler: $self.scheduler.as_ref(),
            sink: $self.sink.as_ref(),
            store: &$self.store,
            settings: &$self.settings,
        }
    };
}

impl NotificationCenter {
    pub fn new(
        settings: Settings,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn Scheduler>,
        sink: Arc<dyn RenderSink>,
        backend: Arc<dyn StorageBackend>,
    ) -> Self {
        let now_ms = clock.now_ms();
        let store = StateStore::new(backend, now_ms);
        Self {
            settings,
            clock,
            scheduler,
            sink,
            store,
            notifications: Vec::new(),
            arbiter: FloatingArbiter::new(now_ms),
            topbar: TopBarRotator::new(),
            countdowns: CountdownBoard::new(),
            topbar_rotate_timer: None,
            ticker_armed: false,
        }
    }

    /// Fetch candidates once and run the first render cycle. A fetch
    /// failure is logged and leaves the notification list empty; there is
    /// no retry.
    pub async fn start(&mut self, source: &dyn CandidateSource, page: &PageContext) {
        tracing::info!(url = %page.url, pid = page.page_id, "Fetching candidate notifications");
        let candidates = match source.fetch(page).await {
            Ok(candidates) => {
                tracing::info!(count = candidates.len(), "Candidates fetched");
                candidates
            }
            Err(e) => {
                tracing::error!(error = %e, "Candidate fetch failed, running with zero notifications");
                Vec::new()
            }
        };
        self.ingest(candidates);
    }

    /// Normalize and wholesale-replace the candidate list, then re-render
    /// every surface. Dismissal memory and the session-shown set persist
    /// across ingests.
    pub fn ingest(&mut self, candidates: Vec<RawNotification>) {
        self.notifications = candidates
            .into_iter()
            .map(Notification::from_raw)
            .collect();
        tracing::debug!(count = self.notifications.len(), "Candidate list replaced");
        self.render_all();
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// A fired timer, delivered by the host's scheduler loop.
    pub fn handle_timer(&mut self, timer: EngineTimer) {
        match timer {
            EngineTimer::FloatingDelay(id) => {
                let ctx = ctx!(self);
                self.arbiter.on_delay_elapsed(id, &ctx);
            }
            EngineTimer::FloatingAutoClose(id) => {
                let ctx = ctx!(self);
                self.arbiter.on_auto_close(id, &ctx);
            }
            EngineTimer::FloatingSettle => {
                let ctx = ctx!(self);
                self.arbiter.on_settle(&ctx);
            }
            EngineTimer::TopBarRotate => self.rotate_topbar(),
            EngineTimer::TopBarSettle => {
                self.topbar.settle();
                let view = self.topbar.view(&self.settings.topbar);
                self.sink.render_topbar(view.as_ref());
            }
            EngineTimer::SecondTick => self.second_tick(),
        }
    }

    /// A user-behavior event from the host's event source.
    pub fn handle_activity(&mut self, event: ActivityEvent) {
        let ctx = ctx!(self);
        self.arbiter.handle_activity(&event, &ctx);
    }

    pub fn mark_read(&mut self, id: NotificationId) {
        self.store.mark_read(id);
        self.render_all();
    }

    pub fn mark_all_read(&mut self) {
        let ids: Vec<NotificationId> = self.notifications.iter().map(|n| n.id).collect();
        self.store.mark_read_many(&ids);
        self.render_all();
    }

    pub fn dismiss_sidebar(&mut self, id: NotificationId) {
        self.store
            .record_dismissal(Surface::Sidebar, id, self.clock.now_ms());
        self.render_all();
    }

    /// Close the floating item (user action or adapter callback).
    pub fn close_floating(&mut self, id: NotificationId) {
        let ctx = ctx!(self);
        self.arbiter.close(id, &ctx);
    }

    /// Dismiss every item currently in the top bar and stop rotation.
    pub fn dismiss_topbar(&mut self) {
        let ids = self.topbar.item_ids();
        self.store
            .record_dismissals(Surface::TopBar, &ids, self.clock.now_ms());
        self.topbar.clear();
        if let Some(timer) = self.topbar_rotate_timer.take() {
            self.scheduler.cancel(timer);
        }
        self.sink.render_topbar(None);
        tracing::info!(count = ids.len(), "Top bar dismissed");
    }

    /// The visitor opened the notification panel: an active corner toast is
    /// treated as acknowledged and closed. Centered popups stay up.
    pub fn drawer_opened(&mut self) {
        let Some(active) = self.arbiter.active() else {
            return;
        };
        if active.settings.is_popup() {
            return;
        }
        let id = active.id;
        let ctx = ctx!(self);
        self.arbiter.close(id, &ctx);
    }

    /// Re-resolve and re-render every surface. Each sink call is expected
    /// to no-op independently when its target is absent.
    fn render_all(&mut self) {
        let now_ms = self.clock.now_ms();
        let now_local = self.clock.now_local();

        let read_ids = self.store.read_ids();
        let items: Vec<SidebarItem> =
            visibility::sidebar_candidates(&self.notifications, &self.store, now_ms)
                .into_iter()
                .map(|n| SidebarItem::new(n, read_ids.contains(&n.id), now_local))
                .collect();
        self.sink.render_list(&items);

        let count = visibility::badge_count(&self.notifications, &self.store, &read_ids, now_ms);
        self.sink
            .render_badge(&BadgeView::new(count, self.settings.display.badge_style));

        let eligible: Vec<Notification> = visibility::floating_candidates(
            &self.notifications,
            &self.store,
            self.arbiter.session_shown(),
            now_ms,
        )
        .into_iter()
        .cloned()
        .collect();
        let ctx = ctx!(self);
        self.arbiter.sync(eligible, &ctx);

        self.sync_topbar(now_ms);

        self.countdowns.sync(&self.notifications, now_local);
        self.ensure_ticker();
    }

    fn sync_topbar(&mut self, now_ms: i64) {
        if let Some(timer) = self.topbar_rotate_timer.take() {
            self.scheduler.cancel(timer);
        }
        if self.settings.topbar.disabled {
            self.topbar.clear();
            self.sink.render_topbar(None);
            return;
        }
        let items: Vec<Notification> =
            visibility::topbar_candidates(&self.notifications, &self.store, now_ms)
                .into_iter()
                .cloned()
                .collect();
        self.topbar.sync(items);
        let view = self.topbar.view(&self.settings.topbar);
        self.sink.render_topbar(view.as_ref());
        if self.topbar.len() > 1 {
            self.arm_topbar_rotation();
        }
    }

    fn rotate_topbar(&mut self) {
        self.topbar_rotate_timer = None;
        if !self.topbar.rotate() {
            return;
        }
        let view = self.topbar.view(&self.settings.topbar);
        self.sink.render_topbar(view.as_ref());
        self.scheduler
            .arm(EngineTimer::TopBarSettle, TOPBAR_TRANSITION);
        self.arm_topbar_rotation();
    }

    fn arm_topbar_rotation(&mut self) {
        let delay = Duration::from_secs(self.settings.topbar.rotation_seconds.max(1));
        self.topbar_rotate_timer = Some(self.scheduler.arm(EngineTimer::TopBarRotate, delay));
    }

    fn second_tick(&mut self) {
        let now_local = self.clock.now_local();
        let ticks = self.countdowns.tick(now_local);
        if !ticks.is_empty() {
            self.sink.update_countdowns(&ticks);
        }

        let ctx = ctx!(self);
        self.arbiter.poll_triggers(&ctx);

        self.scheduler.arm(EngineTimer::SecondTick, TICK_INTERVAL);
    }

    fn ensure_ticker(&mut self) {
        if !self.ticker_armed {
            self.ticker_armed = true;
            self.scheduler.arm(EngineTimer::SecondTick, TICK_INTERVAL);
        }
    }
}
