use serde::{Deserialize, Serialize};

/// `[bus]` — which subject the consumer subscribes to and how it behaves on
/// non-retryable transport errors (§6, §4.5).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BusConfig {
    pub observation_topic: String,
    pub firedrill_observation_topic: String,
    /// When true, subscribe to `firedrill_observation_topic` instead of
    /// `observation_topic` (GLOSSARY "Firedrill mode").
    pub firedrill_mode: bool,
    /// If true, a `FatalTransport` error (§7) terminates the process
    /// instead of reopening the subscription.
    pub exit_on_error: bool,
}

impl BusConfig {
    /// The topic actually subscribed to, accounting for firedrill mode.
    pub fn active_topic(&self) -> &str {
        if self.firedrill_mode {
            &self.firedrill_observation_topic
        } else {
            &self.observation_topic
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            observation_topic: "snews.obs".to_string(),
            firedrill_observation_topic: "snews.obs.firedrill".to_string(),
            firedrill_mode: false,
            exit_on_error: false,
        }
    }
}

impl BusConfig {
    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        if self.observation_topic.trim().is_empty() {
            anyhow::bail!("bus.observation_topic must be non-empty");
        }
        if self.firedrill_observation_topic.trim().is_empty() {
            anyhow::bail!("bus.firedrill_observation_topic must be non-empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firedrill_mode_selects_firedrill_topic() {
        let mut cfg = BusConfig::default();
        assert_eq!(cfg.active_topic(), "snews.obs");
        cfg.firedrill_mode = true;
        assert_eq!(cfg.active_topic(), "snews.obs.firedrill");
    }
}
