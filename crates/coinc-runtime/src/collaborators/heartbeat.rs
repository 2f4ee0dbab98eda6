use async_trait::async_trait;

use coinc_core::{FalseAlarmRate, HeartbeatSnapshot, HeartbeatSource, SubGroup};

/// Returns an empty snapshot when heartbeat storage is disabled, or a
/// caller-supplied snapshot otherwise — there is no live detector-uptime
/// feed in this repository, so the snapshot this server has access to is
/// whatever was configured at startup, not one refreshed over time.
pub struct StaticHeartbeatSource {
    snapshot: HeartbeatSnapshot,
}

impl StaticHeartbeatSource {
    pub fn disabled() -> Self {
        Self { snapshot: HeartbeatSnapshot::default() }
    }

    pub fn with_snapshot(snapshot: HeartbeatSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl HeartbeatSource for StaticHeartbeatSource {
    async fn cache_snapshot(&self) -> HeartbeatSnapshot {
        self.snapshot.clone()
    }
}

/// Stand-in for the statistical false-alarm-rate model the original system
/// computes out of process (which itself depends on live detector uptime
/// history absent from this repository): always returns the configured
/// constant, regardless of sub-group shape or heartbeat snapshot.
pub struct UniformFalseAlarmRate {
    probability: f64,
}

impl UniformFalseAlarmRate {
    pub fn new(probability: f64) -> Self {
        Self { probability }
    }
}

impl FalseAlarmRate for UniformFalseAlarmRate {
    fn estimate(&self, _sub_group: &SubGroup, _heartbeat: &HeartbeatSnapshot) -> f64 {
        self.probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinc_core::Observation;

    #[tokio::test]
    async fn disabled_source_returns_empty_snapshot() {
        let source = StaticHeartbeatSource::disabled();
        let snapshot = source.cache_snapshot().await;
        assert!(snapshot.detector_status.is_empty());
    }

    #[test]
    fn uniform_rate_ignores_inputs() {
        let rate = UniformFalseAlarmRate::new(0.02);
        let group = SubGroup::new(
            0,
            Observation {
                id: "A".into(),
                detector_name: "X".into(),
                neutrino_time: chrono::Utc::now(),
                machine_time: None,
                received_time: None,
                p_val: 0.5,
                meta: serde_json::Value::Null,
            },
        );
        assert_eq!(rate.estimate(&group, &HeartbeatSnapshot::default()), 0.02);
    }
}
