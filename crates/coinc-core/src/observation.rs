use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreReason};

/// One reported neutrino-burst detection from one detector.
///
/// `meta` is preserved verbatim end-to-end as opaque JSON — the engine never
/// inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: String,
    pub detector_name: String,
    pub neutrino_time: DateTime<Utc>,
    pub machine_time: Option<DateTime<Utc>>,
    pub received_time: Option<DateTime<Utc>>,
    pub p_val: f64,
    #[serde(default)]
    pub meta: Value,
}

/// The raw, logically-typed inbound bus message before classification.
///
/// Mirrors the external wire schema (§6): either an observation (requires
/// `neutrino_time` and `p_val`) or a retraction (`retract_latest` truthy,
/// `neutrino_time` ignored).
#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub detector_name: Option<String>,
    pub neutrino_time: Option<String>,
    pub machine_time: Option<String>,
    pub p_val: Option<f64>,
    #[serde(default)]
    pub meta: Value,
    #[serde(default)]
    pub retract_latest: bool,
}

impl RawMessage {
    /// Parse into an [`Observation`], stamping `received_time` as `now`.
    ///
    /// Fails with [`CoreReason::BadMessage`] if required fields are missing
    /// or `neutrino_time` does not parse as an ISO-8601 instant. Never
    /// called for retraction messages — callers must check
    /// [`RawMessage::retract_latest`] first.
    pub fn into_observation(self, now: DateTime<Utc>) -> Result<Observation, CoreError> {
        let id = self
            .id
            .ok_or_else(|| CoreError::from(CoreReason::BadMessage).with_detail("missing _id"))?;
        let detector_name = self.detector_name.ok_or_else(|| {
            CoreError::from(CoreReason::BadMessage).with_detail("missing detector_name")
        })?;
        let neutrino_time_raw = self.neutrino_time.ok_or_else(|| {
            CoreError::from(CoreReason::BadMessage).with_detail("missing neutrino_time")
        })?;
        let neutrino_time = DateTime::parse_from_rfc3339(&neutrino_time_raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| {
                CoreError::from(CoreReason::BadMessage)
                    .with_detail(format!("unparseable neutrino_time {neutrino_time_raw:?}: {e}"))
            })?;
        let p_val = self.p_val.ok_or_else(|| {
            CoreError::from(CoreReason::BadMessage).with_detail("missing p_val")
        })?;
        if !(0.0..=1.0).contains(&p_val) {
            return Err(CoreError::from(CoreReason::BadMessage)
                .with_detail(format!("p_val {p_val} out of range [0,1]")));
        }
        let machine_time = match self.machine_time {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(&raw)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| {
                        CoreError::from(CoreReason::BadMessage)
                            .with_detail(format!("unparseable machine_time {raw:?}: {e}"))
                    })?,
            ),
            None => None,
        };

        Ok(Observation {
            id,
            detector_name,
            neutrino_time,
            machine_time,
            received_time: Some(now),
            p_val,
            meta: self.meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str, det: &str, t: &str, p: f64) -> RawMessage {
        RawMessage {
            id: Some(id.to_string()),
            detector_name: Some(det.to_string()),
            neutrino_time: Some(t.to_string()),
            machine_time: None,
            p_val: Some(p),
            meta: Value::Null,
            retract_latest: false,
        }
    }

    #[test]
    fn parses_valid_observation() {
        let now = Utc::now();
        let obs = msg("A", "X", "2026-01-01T00:00:00Z", 0.5)
            .into_observation(now)
            .unwrap();
        assert_eq!(obs.id, "A");
        assert_eq!(obs.detector_name, "X");
        assert_eq!(obs.p_val, 0.5);
        assert_eq!(obs.received_time, Some(now));
    }

    #[test]
    fn missing_id_is_bad_message() {
        let mut m = msg("A", "X", "2026-01-01T00:00:00Z", 0.5);
        m.id = None;
        let err = m.into_observation(Utc::now()).unwrap_err();
        assert!(err.to_string().contains("missing _id"));
    }

    #[test]
    fn unparseable_time_is_bad_message() {
        let m = msg("A", "X", "not-a-time", 0.5);
        let err = m.into_observation(Utc::now()).unwrap_err();
        assert!(err.to_string().contains("neutrino_time"));
    }

    #[test]
    fn p_val_out_of_range_is_bad_message() {
        let m = msg("A", "X", "2026-01-01T00:00:00Z", 1.5);
        let err = m.into_observation(Utc::now()).unwrap_err();
        assert!(err.to_string().contains("p_val"));
    }
}
