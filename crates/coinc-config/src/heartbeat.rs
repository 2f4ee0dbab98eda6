use serde::{Deserialize, Serialize};

/// `[heartbeat]` — whether the heartbeat collaborator is consulted before
/// computing `false_alarm_prob` for an emitted alert (§6 `STORE_HEARTBEAT`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    pub store_heartbeat: bool,
    /// Constant false-alarm probability returned by the stub
    /// `UniformFalseAlarmRate` collaborator — stands in for the statistical
    /// model an external false-alarm-rate service would compute.
    pub false_alarm_prob_default: f64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            store_heartbeat: false,
            false_alarm_prob_default: 0.0,
        }
    }
}

impl HeartbeatConfig {
    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.false_alarm_prob_default) {
            anyhow::bail!(
                "heartbeat.false_alarm_prob_default must be in [0,1], got {}",
                self.false_alarm_prob_default,
            );
        }
        Ok(())
    }
}
