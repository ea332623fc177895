use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{EngineTimer, Scheduler, TimerId};

/// Production scheduler: each armed timer is a spawned sleep that delivers
/// the [`EngineTimer`] over an unbounded channel. The host drains the
/// receiver on its single engine thread, which preserves the engine's
/// cooperative single-threaded model.
///
/// Must be used from within a tokio runtime.
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<EngineTimer>,
    tasks: DashMap<TimerId, JoinHandle<()>>,
    next_id: AtomicU64,
}

impl TokioScheduler {
    /// Create the scheduler plus the receiver the host loop drains.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<EngineTimer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                tx,
                tasks: DashMap::new(),
                next_id: AtomicU64::new(0),
            }),
            rx,
        )
    }
}

impl Scheduler for TokioScheduler {
    fn arm(&self, timer: EngineTimer, delay: Duration) -> TimerId {
        // Completed sleeps leave finished handles behind; purge lazily.
        self.tasks.retain(|_, handle| !handle.is_finished());

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(timer).is_err() {
                tracing::debug!(?timer, "Timer fired after engine loop ended");
            }
        });
        self.tasks.insert(id, handle);
        id
    }

    fn cancel(&self, id: TimerId) {
        if let Some((_, handle)) = self.tasks.remove(&id) {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_armed_timer_fires() {
        let (scheduler, mut rx) = TokioScheduler::new();
        scheduler.arm(EngineTimer::SecondTick, Duration::from_millis(5));

        let fired = rx.recv().await;
        assert_eq!(fired, Some(EngineTimer::SecondTick));
    }

    #[test]
    fn test_cancelled_timer_does_not_fire() {
        tokio_test::block_on(async {
            let (scheduler, mut rx) = TokioScheduler::new();
            let id = scheduler.arm(EngineTimer::TopBarRotate, Duration::from_millis(50));
            scheduler.cancel(id);
            scheduler.arm(EngineTimer::SecondTick, Duration::from_millis(100));

            // The first timer to arrive must be the later, uncancelled one.
            let fired = rx.recv().await;
            assert_eq!(fired, Some(EngineTimer::SecondTick));
        });
    }
}
