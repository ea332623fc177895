//! Durable client-side memory for read and dismissal state.
//!
//! The backing store is modeled after origin-scoped browser storage:
//! synchronous, string-valued, durable. All structured values are JSON;
//! corrupt or missing data falls back to an empty structure instead of
//! failing, and every mutation is written through before the mutating call
//! returns so a read in the same tick observes it.

mod file_backend;
mod memory_backend;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub use file_backend::FileStorage;
pub use memory_backend::MemoryStorage;

use crate::notification::NotificationId;

/// Storage keys owned by the engine, namespaced to avoid collisions with
/// unrelated data in the same store.
pub mod keys {
    pub const READ_IDS: &str = "pulse_read_ids";
    pub const SIDEBAR_DISMISSED: &str = "pulse_dismissed_ids";
    pub const FLOATING_DISMISSED: &str = "pulse_dismissed_floating_ids";
    pub const TOPBAR_DISMISSED: &str = "pulse_topbar_dismissed";
}

/// Synchronous, string-valued key-value store.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Display surfaces with independent dismissal memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Sidebar,
    Floating,
    TopBar,
}

impl Surface {
    fn dismissal_key(&self) -> &'static str {
        match self {
            Surface::Sidebar => keys::SIDEBAR_DISMISSED,
            Surface::Floating => keys::FLOATING_DISMISSED,
            Surface::TopBar => keys::TOPBAR_DISMISSED,
        }
    }
}

/// Typed facade over a [`StorageBackend`].
///
/// Holds no in-memory copy of the data: every accessor reads through and
/// every mutation writes through, which keeps the "flushed before return"
/// ordering trivially true.
#[derive(Clone)]
pub struct StateStore {
    backend: Arc<dyn StorageBackend>,
}

impl StateStore {
    /// Wrap a backend, converting the floating-dismissal store from the
    /// legacy "list of ids" shape to "id → timestamp" if found. The
    /// conversion moment (`now_ms`) becomes the timestamp of every migrated
    /// id, and the converted form is persisted before any read.
    pub fn new(backend: Arc<dyn StorageBackend>, now_ms: i64) -> Self {
        let store = Self { backend };
        store.migrate_legacy_floating(now_ms);
        store
    }

    fn migrate_legacy_floating(&self, now_ms: i64) {
        let Some(raw) = self.backend.get(keys::FLOATING_DISMISSED) else {
            return;
        };
        let Ok(ids) = serde_json::from_str::<Vec<NotificationId>>(&raw) else {
            return;
        };
        let map: HashMap<NotificationId, i64> = ids.into_iter().map(|id| (id, now_ms)).collect();
        tracing::info!(
            migrated = map.len(),
            "Converted legacy floating-dismissal list to timestamp map"
        );
        self.write_map(keys::FLOATING_DISMISSED, &map);
    }

    /// Ids the visitor has marked read (sidebar surface only).
    pub fn read_ids(&self) -> HashSet<NotificationId> {
        self.backend
            .get(keys::READ_IDS)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn mark_read(&self, id: NotificationId) {
        let mut ids = self.read_ids();
        if ids.insert(id) {
            self.write_set(&ids);
        }
    }

    pub fn mark_read_many(&self, new_ids: &[NotificationId]) {
        let mut ids = self.read_ids();
        let before = ids.len();
        ids.extend(new_ids.iter().copied());
        if ids.len() != before {
            self.write_set(&ids);
        }
    }

    /// When `id` was dismissed on `surface`, if ever.
    pub fn dismissed_at(&self, surface: Surface, id: NotificationId) -> Option<i64> {
        self.dismissal_map(surface).get(&id).copied()
    }

    pub fn record_dismissal(&self, surface: Surface, id: NotificationId, now_ms: i64) {
        let key = surface.dismissal_key();
        let mut map = self.read_map(key);
        map.insert(id, now_ms);
        self.write_map(key, &map);
        tracing::debug!(?surface, id, "Recorded dismissal");
    }

    /// Bulk dismissal: one read-modify-write for all ids.
    pub fn record_dismissals(&self, surface: Surface, ids: &[NotificationId], now_ms: i64) {
        if ids.is_empty() {
            return;
        }
        let key = surface.dismissal_key();
        let mut map = self.read_map(key);
        for id in ids {
            map.insert(*id, now_ms);
        }
        self.write_map(key, &map);
        tracing::debug!(?surface, count = ids.len(), "Recorded bulk dismissal");
    }

    /// Full dismissal map for a surface.
    pub fn dismissal_map(&self, surface: Surface) -> HashMap<NotificationId, i64> {
        self.read_map(surface.dismissal_key())
    }

    fn read_map(&self, key: &str) -> HashMap<NotificationId, i64> {
        self.backend
            .get(key)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn write_map(&self, key: &str, map: &HashMap<NotificationId, i64>) {
        match serde_json::to_string(map) {
            Ok(raw) => self.backend.set(key, &raw),
            Err(e) => tracing::warn!(key, error = %e, "Failed to serialize dismissal map"),
        }
    }

    fn write_set(&self, ids: &HashSet<NotificationId>) {
        match serde_json::to_string(ids) {
            Ok(raw) => self.backend.set(keys::READ_IDS, &raw),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize read ids"),
        }
    }
}
