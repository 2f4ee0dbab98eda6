use chrono::{DateTime, Utc};
use serde::Serialize;

/// Kind of transition that produced an [`Alert`]. `Initial` is never
/// serialized onto the bus — the decider logs it but does not publish — it
/// exists here only as the corresponding arm of [`crate::subgroup::TransitionFlag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    CoincMsg,
    Update,
    Retraction,
}

/// Outbound alert payload (§6). Field names and casing match the external
/// wire schema, not Rust convention, since this struct is serialized
/// directly onto the alert topic.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub sub_list_num: u64,
    pub detector_names: Vec<String>,
    pub neutrino_times: Vec<DateTime<Utc>>,
    pub p_vals: Vec<f64>,
    pub p_val_avg: f64,
    pub false_alarm_prob: f64,
    pub server_tag: String,
    pub alert_type: AlertKind,
}
