//! Notification data model.
//!
//! Candidates arrive as duck-typed JSON written by several generations of
//! the admin UI ([`RawNotification`]). Each fetch cycle normalizes the
//! legacy fields once (idempotently) and resolves every record into the
//! canonical [`Notification`] shape, which is what all filtering, queueing,
//! and rendering work against.

mod normalize;
pub mod raw;
mod timeago;
mod types;

pub use raw::{Flag, Num, RawCountdown, RawNotification, RawSettings, RawTriggers};
pub use timeago::{relative_age, RelativeAge};
pub use types::{
    CountdownKind, CountdownSettings, DisplaySettings, FloatingPosition, FloatingSettings,
    IconKind, Notification, NotificationId, RepeatPolicy, RepeatUnit, TopBarPosition,
    TopBarSettings, TopBarStyle, TriggerSettings,
};
