use chrono::{DateTime, Utc};

use crate::cache::Cache;
use crate::error::{CoreError, CoreReason};
use crate::observation::{Observation, RawMessage};

/// Result of classifying one decoded inbound message against the current
/// cache state (§4.1). `Add` and `Update` both route to
/// [`Cache::apply_add`] / [`Cache::apply_update`] respectively — the
/// consumer loop does not need to know which.
#[derive(Debug, Clone)]
pub enum Classification {
    Add(Observation),
    Update(Observation),
    Retraction(String),
}

/// Classifies `raw` against `cache`, per the three rules of §4.1, in order:
/// retraction marker first, then existing-detector lookup, then add.
///
/// Fails with [`CoreReason::BadMessage`] for malformed payloads — missing
/// fields, an unparseable `neutrino_time`, or a retraction with no
/// `detector_name`. A `BadMessage` classification never mutates `cache`.
pub fn classify(cache: &Cache, raw: RawMessage, now: DateTime<Utc>) -> Result<Classification, CoreError> {
    if raw.retract_latest {
        let detector_name = raw.detector_name.ok_or_else(|| {
            CoreError::from(CoreReason::BadMessage).with_detail("retraction missing detector_name")
        })?;
        return Ok(Classification::Retraction(detector_name));
    }

    let obs = raw.into_observation(now)?;
    if cache.contains_detector(&obs.detector_name) {
        Ok(Classification::Update(obs))
    } else {
        Ok(Classification::Add(obs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::Value;

    fn raw_obs(id: &str, det: &str, t: &str, retract: bool) -> RawMessage {
        RawMessage {
            id: Some(id.to_string()),
            detector_name: Some(det.to_string()),
            neutrino_time: Some(t.to_string()),
            machine_time: None,
            p_val: Some(0.5),
            meta: Value::Null,
            retract_latest: retract,
        }
    }

    #[test]
    fn retraction_marker_takes_priority() {
        let cache = Cache::new(Duration::seconds(10));
        let raw = raw_obs("A", "X", "2026-01-01T00:00:00Z", true);
        match classify(&cache, raw, Utc::now()).unwrap() {
            Classification::Retraction(d) => assert_eq!(d, "X"),
            other => panic!("expected Retraction, got {other:?}"),
        }
    }

    #[test]
    fn new_detector_is_add() {
        let cache = Cache::new(Duration::seconds(10));
        let raw = raw_obs("A", "X", "2026-01-01T00:00:00Z", false);
        assert!(matches!(classify(&cache, raw, Utc::now()).unwrap(), Classification::Add(_)));
    }

    #[test]
    fn known_detector_is_update() {
        let mut cache = Cache::new(Duration::seconds(10));
        cache.apply_add(raw_obs("A", "X", "2026-01-01T00:00:00Z", false).into_observation(Utc::now()).unwrap());
        let raw = raw_obs("A2", "X", "2026-01-01T00:00:02Z", false);
        assert!(matches!(classify(&cache, raw, Utc::now()).unwrap(), Classification::Update(_)));
    }

    #[test]
    fn retraction_without_detector_name_is_bad_message() {
        let cache = Cache::new(Duration::seconds(10));
        let mut raw = raw_obs("A", "X", "2026-01-01T00:00:00Z", true);
        raw.detector_name = None;
        let err = classify(&cache, raw, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("detector_name"));
    }
}
