//! The floating surface: one global slot shared by every toast and popup.
//!
//! Candidates are split per fetch cycle into an immediate priority queue
//! and a pending list waiting on behavioral triggers. The arbiter owns the
//! single on-screen slot and decides, for every queue push, timer fire, and
//! trigger hit, whether anything may show.

mod arbiter;
mod queue;
mod triggers;

pub use arbiter::FloatingArbiter;
pub use queue::FloatingQueue;
pub use triggers::TriggerWatch;
