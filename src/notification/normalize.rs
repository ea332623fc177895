//! Legacy-field normalization, run once per fetch before any filtering.
//!
//! Rules are idempotent: running them twice yields the same settings.

use super::raw::{Flag, RawSettings};

impl RawSettings {
    /// Reconcile legacy fields into the current shape.
    ///
    /// - `show_as_floating` unset: derive it from `toast`/`popup`. A toast
    ///   defaults to `bottom_right` and backfills width/delay/duration from
    ///   the toast-prefixed fields when the new fields are absent; a popup
    ///   defaults to `center`.
    /// - `show_in_sidebar` empty string: explicit off. Wholly absent: off
    ///   for topbar records, off for `only_toast`, off for non-pinned
    ///   popups, otherwise on.
    ///
    /// No other fields are touched.
    pub fn normalize(&mut self) {
        let floating_on = self.show_as_floating.map(|f| f.0).unwrap_or(false);
        if !floating_on {
            if self.toast.0 {
                self.show_as_floating = Some(Flag(true));
                if self.position_unset() {
                    self.floating_position = Some("bottom_right".to_string());
                }
                if self.floating_width.0 == 0 {
                    self.floating_width = self.toast_width;
                }
                if self.floating_delay.0 == 0 {
                    self.floating_delay = self.toast_delay;
                }
                if self.floating_duration.0 == 0 {
                    self.floating_duration = self.toast_duration;
                }
            } else if self.popup.0 {
                self.show_as_floating = Some(Flag(true));
                if self.position_unset() {
                    self.floating_position = Some("center".to_string());
                }
            }
        }

        match self.show_in_sidebar.as_deref() {
            Some("") => self.show_in_sidebar = Some("0".to_string()),
            None => {
                let off = self.topbar.0
                    || self.only_toast.0
                    || (self.popup.0 && !self.pinned.0);
                self.show_in_sidebar = Some(if off { "0" } else { "1" }.to_string());
            }
            Some(_) => {}
        }
    }

    fn position_unset(&self) -> bool {
        self.floating_position
            .as_deref()
            .map_or(true, str::is_empty)
    }
}
