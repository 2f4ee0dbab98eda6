use crate::alert::{Alert, AlertKind};
use crate::cache::Cache;
use crate::collaborators::{FalseAlarmRate, HeartbeatSnapshot, HeartbeatSource};
use crate::subgroup::TransitionFlag;

/// Rounds to 5 decimals, per §4.4's `p_val_avg` and §6's outbound schema.
fn round5(x: f64) -> f64 {
    (x * 100_000.0).round() / 100_000.0
}

/// Alert Decider (§4.4). Invoked once per ingested message after the Cache
/// has finished mutating; walks the transition-flag map in ascending
/// `sub_group_tag` order (a [`std::collections::BTreeMap`] keeps this for
/// free) and turns `COINC_MSG` / `UPDATE` / `RETRACTION` flags into
/// [`Alert`]s. `INITIAL` is logged but never published — a lone detector is
/// not a coincidence. Does **not** clear the flags; the consumer loop does
/// that once the decider and the alert dispatch it triggers have both run.
pub async fn decide(
    cache: &Cache,
    server_tag: &str,
    heartbeat: Option<&dyn HeartbeatSource>,
    false_alarm: &dyn FalseAlarmRate,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for (&tag, flag) in cache.flags() {
        let kind = match flag {
            TransitionFlag::None => continue,
            TransitionFlag::Initial => {
                tracing::debug!(domain = "pipe", sub_group_tag = tag, "initial observation, no alert");
                continue;
            }
            TransitionFlag::CoincMsg => AlertKind::CoincMsg,
            TransitionFlag::Update => AlertKind::Update,
            TransitionFlag::Retraction => AlertKind::Retraction,
        };

        let Some(group) = cache.sub_groups().get(&tag) else {
            continue;
        };

        let snapshot = match heartbeat {
            Some(h) => h.cache_snapshot().await,
            None => HeartbeatSnapshot::default(),
        };
        let false_alarm_prob = false_alarm.estimate(group, &snapshot);

        let members = group.ordered_members();
        let detector_names = members.iter().map(|m| m.detector_name.clone()).collect();
        let neutrino_times = members.iter().map(|m| m.neutrino_time).collect();
        let p_vals: Vec<f64> = members.iter().map(|m| m.p_val).collect();
        let p_val_avg = round5(p_vals.iter().sum::<f64>() / p_vals.len() as f64);

        alerts.push(Alert {
            sub_list_num: tag,
            detector_names,
            neutrino_times,
            p_vals,
            p_val_avg,
            false_alarm_prob,
            server_tag: server_tag.to_string(),
            alert_type: kind,
        });
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use serde_json::Value;

    struct ZeroFalseAlarm;
    impl FalseAlarmRate for ZeroFalseAlarm {
        fn estimate(&self, _sub_group: &crate::subgroup::SubGroup, _heartbeat: &HeartbeatSnapshot) -> f64 {
            0.0
        }
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn obs(id: &str, det: &str, offset_secs: i64, p: f64) -> crate::observation::Observation {
        crate::observation::Observation {
            id: id.to_string(),
            detector_name: det.to_string(),
            neutrino_time: epoch() + Duration::seconds(offset_secs),
            machine_time: None,
            received_time: None,
            p_val: p,
            meta: Value::Null,
        }
    }

    #[tokio::test]
    async fn initial_produces_no_alert() {
        let mut cache = Cache::new(Duration::seconds(10));
        cache.apply_add(obs("A", "X", 0, 0.5));
        let alerts = decide(&cache, "test-server", None, &ZeroFalseAlarm).await;
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn coinc_msg_alert_has_rounded_average_scenario_2() {
        let mut cache = Cache::new(Duration::seconds(10));
        cache.apply_add(obs("A", "X", 0, 0.5));
        cache.clear_flags();
        cache.apply_add(obs("B", "Y", 3, 0.4));
        let alerts = decide(&cache, "test-server", None, &ZeroFalseAlarm).await;
        let alert = alerts.iter().find(|a| a.detector_names.len() == 2).unwrap();
        assert_eq!(alert.detector_names, vec!["X".to_string(), "Y".to_string()]);
        assert_eq!(alert.p_val_avg, 0.45);
        assert_eq!(alert.alert_type, AlertKind::CoincMsg);
    }

    #[tokio::test]
    async fn alerts_are_ordered_by_ascending_sub_group_tag() {
        let mut cache = Cache::new(Duration::seconds(10));
        cache.apply_add(obs("A", "X", 0, 0.5));
        cache.clear_flags();
        cache.apply_add(obs("B", "Y", 3, 0.4));
        cache.clear_flags();
        cache.apply_add(obs("C", "Z", 100, 0.6));
        let alerts = decide(&cache, "test-server", None, &ZeroFalseAlarm).await;
        let tags: Vec<u64> = alerts.iter().map(|a| a.sub_list_num).collect();
        let mut sorted = tags.clone();
        sorted.sort();
        assert_eq!(tags, sorted);
    }
}
