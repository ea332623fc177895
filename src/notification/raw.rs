//! Raw wire model for candidate notifications.
//!
//! The candidate endpoint aggregates records written by several generations
//! of the admin UI, so the settings bag is duck-typed: boolean fields arrive
//! as booleans, integers, or strings ("1", "", "true"), numeric fields as
//! numbers or numeric strings. [`Flag`] and [`Num`] absorb all of those
//! shapes; unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Boolean-ish scalar. Accepts bool, number, string, or null.
///
/// Strings: "1"/"true" (any case) and non-zero numerics are true; "",
/// "0", "false" are false; any other non-empty string is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "FlagRepr")]
pub struct Flag(pub bool);

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Null,
}

impl From<FlagRepr> for Flag {
    fn from(repr: FlagRepr) -> Self {
        let on = match repr {
            FlagRepr::Bool(b) => b,
            FlagRepr::Int(i) => i != 0,
            FlagRepr::Float(f) => f != 0.0,
            FlagRepr::Str(s) => truthy(&s),
            FlagRepr::Null => false,
        };
        Flag(on)
    }
}

fn truthy(s: &str) -> bool {
    let t = s.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("false") {
        return false;
    }
    if t.eq_ignore_ascii_case("true") {
        return true;
    }
    t.parse::<f64>().map(|v| v != 0.0).unwrap_or(true)
}

/// Numeric scalar. Accepts number, numeric string, bool, or null; anything
/// unparseable reads as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "NumRepr")]
pub struct Num(pub i64);

#[derive(Deserialize)]
#[serde(untagged)]
enum NumRepr {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
}

impl From<NumRepr> for Num {
    fn from(repr: NumRepr) -> Self {
        let value = match repr {
            NumRepr::Int(i) => i,
            NumRepr::Float(f) => f as i64,
            NumRepr::Str(s) => {
                let t = s.trim();
                t.parse::<i64>()
                    .ok()
                    .or_else(|| t.parse::<f64>().ok().map(|f| f as i64))
                    .unwrap_or(0)
            }
            NumRepr::Bool(b) => i64::from(b),
            NumRepr::Null => 0,
        };
        Num(value)
    }
}

/// One candidate record exactly as fetched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawNotification {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub cta_label: String,
    #[serde(default)]
    pub cta_url: String,
    /// Server-local publish timestamp, `Y-m-d H:M`.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub settings: RawSettings,
}

/// The raw settings bag. Legacy `toast`/`popup`/`only_toast` fields coexist
/// with the newer floating fields; the normalizer reconciles them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawSettings {
    /// Tri-state: `None` = legacy record without the field, `""` = explicit
    /// off, `"0"`/`"1"` = explicit.
    #[serde(default)]
    pub show_in_sidebar: Option<String>,
    #[serde(default)]
    pub sidebar_pinned: Flag,
    #[serde(default)]
    pub sidebar_permanent: Flag,
    #[serde(default)]
    pub pinned: Flag,

    #[serde(default)]
    pub show_as_floating: Option<Flag>,
    #[serde(default)]
    pub floating_position: Option<String>,
    #[serde(default)]
    pub floating_width: Num,
    #[serde(default)]
    pub floating_delay: Num,
    #[serde(default)]
    pub floating_duration: Num,

    // Legacy toast/popup generation
    #[serde(default)]
    pub toast: Flag,
    #[serde(default)]
    pub popup: Flag,
    #[serde(default)]
    pub only_toast: Flag,
    #[serde(default)]
    pub toast_width: Num,
    #[serde(default)]
    pub toast_delay: Num,
    #[serde(default)]
    pub toast_duration: Num,

    #[serde(default)]
    pub topbar: Flag,
    #[serde(default)]
    pub topbar_permanent: Flag,
    #[serde(default)]
    pub topbar_position: Option<String>,
    #[serde(default)]
    pub topbar_style: Option<String>,

    #[serde(default)]
    pub repeat_val: Num,
    #[serde(default)]
    pub repeat_unit: Option<String>,

    #[serde(default)]
    pub countdown: Option<RawCountdown>,
    #[serde(default)]
    pub triggers: Option<RawTriggers>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawCountdown {
    #[serde(default)]
    pub enabled: Flag,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub autohide: Flag,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawTriggers {
    #[serde(default)]
    pub delay: Flag,
    #[serde(default)]
    pub delay_seconds: Num,
    #[serde(default)]
    pub exit_intent: Flag,
    #[serde(default)]
    pub scroll_depth: Flag,
    #[serde(default)]
    pub scroll_percent: Num,
    #[serde(default)]
    pub time_on_page: Flag,
    #[serde(default)]
    pub time_seconds: Num,
    #[serde(default)]
    pub inactivity: Flag,
    #[serde(default)]
    pub idle_seconds: Num,
    #[serde(default)]
    pub click: Flag,
    #[serde(default)]
    pub click_selector: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flag_accepts_mixed_shapes() {
        let parse = |v: serde_json::Value| serde_json::from_value::<Flag>(v).unwrap();
        assert!(parse(json!(true)).0);
        assert!(parse(json!(1)).0);
        assert!(parse(json!("1")).0);
        assert!(parse(json!("true")).0);
        assert!(parse(json!("yes")).0);
        assert!(!parse(json!(false)).0);
        assert!(!parse(json!(0)).0);
        assert!(!parse(json!("")).0);
        assert!(!parse(json!("0")).0);
        assert!(!parse(json!(null)).0);
    }

    #[test]
    fn test_num_accepts_mixed_shapes() {
        let parse = |v: serde_json::Value| serde_json::from_value::<Num>(v).unwrap();
        assert_eq!(parse(json!(42)).0, 42);
        assert_eq!(parse(json!("42")).0, 42);
        assert_eq!(parse(json!(3.9)).0, 3);
        assert_eq!(parse(json!("oops")).0, 0);
        assert_eq!(parse(json!(null)).0, 0);
    }

    #[test]
    fn test_record_with_unknown_fields() {
        let raw: RawNotification = serde_json::from_value(json!({
            "id": 12,
            "title": "Sale",
            "body": "<p>Half off</p>",
            "type": "info",
            "settings": {
                "show_in_sidebar": "1",
                "colors": {"bg": "#fff"},
                "repeat_val": "2",
                "repeat_unit": "hours"
            }
        }))
        .unwrap();

        assert_eq!(raw.id, 12);
        assert_eq!(raw.settings.show_in_sidebar.as_deref(), Some("1"));
        assert_eq!(raw.settings.repeat_val.0, 2);
    }

    #[test]
    fn test_tri_state_sidebar_field() {
        let absent: RawSettings = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.show_in_sidebar, None);

        let empty: RawSettings =
            serde_json::from_value(json!({ "show_in_sidebar": "" })).unwrap();
        assert_eq!(empty.show_in_sidebar.as_deref(), Some(""));
    }
}
