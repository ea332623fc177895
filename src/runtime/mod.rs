//! Execution-environment seams for the engine.
//!
//! The engine core is a single-threaded state machine. Everything that ties
//! it to a real page — wall clock, timers, user-behavior events — enters
//! through the traits in this module, so the machine runs identically under
//! a real tokio runtime and under a deterministic test harness.

mod clock;
mod events;
mod scheduler;
mod tokio_scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{ActivityEvent, ClickEvent};
pub use scheduler::{ArmedTimer, EngineTimer, ManualScheduler, Scheduler, TimerId};
pub use tokio_scheduler::TokioScheduler;
