use std::sync::Mutex;
use std::time::Duration;

use crate::notification::NotificationId;

/// Opaque handle for a timer armed through a [`Scheduler`].
pub type TimerId = u64;

/// Every timer the engine arms. The host delivers fired timers back into
/// `NotificationCenter::handle_timer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineTimer {
    /// Delay-trigger wait before a popped floating item may show.
    FloatingDelay(NotificationId),
    /// Auto-close deadline for the floating item currently on screen.
    FloatingAutoClose(NotificationId),
    /// Animation-settle pause between a floating close and the next advance.
    FloatingSettle,
    /// Top bar rotation interval elapsed.
    TopBarRotate,
    /// Top bar cross-fade transition finished.
    TopBarSettle,
    /// Global one-second heartbeat: trigger polls and countdown updates.
    SecondTick,
}

/// Timer capability injected into the engine.
///
/// One-shot semantics: a timer fires once and is forgotten; recurring
/// behavior is expressed by re-arming from the handler.
pub trait Scheduler: Send + Sync {
    fn arm(&self, timer: EngineTimer, delay: Duration) -> TimerId;
    fn cancel(&self, id: TimerId);
}

/// A timer recorded by [`ManualScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub id: TimerId,
    pub timer: EngineTimer,
    pub delay: Duration,
}

/// Deterministic scheduler: records armed timers instead of waiting.
///
/// Embedders and tests pull the armed set and decide which timers "fire" by
/// feeding them back into the engine, usually after advancing a
/// [`ManualClock`](crate::runtime::ManualClock) by the recorded delay.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    inner: Mutex<ManualState>,
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: TimerId,
    armed: Vec<ArmedTimer>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of currently armed timers, in arming order.
    pub fn armed(&self) -> Vec<ArmedTimer> {
        self.inner.lock().map(|s| s.armed.clone()).unwrap_or_default()
    }

    /// Remove and return all armed timers.
    pub fn take_armed(&self) -> Vec<ArmedTimer> {
        self.inner
            .lock()
            .map(|mut s| std::mem::take(&mut s.armed))
            .unwrap_or_default()
    }

    /// Remove and return armed timers matching `timer`.
    pub fn take_matching(&self, timer: EngineTimer) -> Vec<ArmedTimer> {
        let Ok(mut state) = self.inner.lock() else {
            return Vec::new();
        };
        let (matching, rest): (Vec<ArmedTimer>, Vec<ArmedTimer>) =
            state.armed.drain(..).partition(|t| t.timer == timer);
        state.armed = rest;
        matching
    }
}

impl Scheduler for ManualScheduler {
    fn arm(&self, timer: EngineTimer, delay: Duration) -> TimerId {
        let Ok(mut state) = self.inner.lock() else {
            return 0;
        };
        state.next_id += 1;
        let id = state.next_id;
        state.armed.push(ArmedTimer { id, timer, delay });
        id
    }

    fn cancel(&self, id: TimerId) {
        if let Ok(mut state) = self.inner.lock() {
            state.armed.retain(|t| t.id != id);
        }
    }
}
