use serde::{Deserialize, Serialize};

use crate::types::HumanDuration;

/// `[coincidence]` — parameters of the grouping engine itself (§6).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoincidenceConfig {
    /// `W`, the coincidence window. Default 10s.
    pub threshold: HumanDuration,
    /// Retry-escalation threshold for the consumer loop (§4.5).
    pub max_retriable: u32,
    /// Dead weight carried over from the source system's 24h cache/stash
    /// constants — not wired to any eviction logic in the core (§3
    /// "Lifecycle": "No TTL-based eviction is specified for the core").
    pub cache_expiration: HumanDuration,
    pub stash_time: HumanDuration,
    /// Identifier embedded in every emitted alert's `server_tag`.
    pub server_tag: String,
}

impl Default for CoincidenceConfig {
    fn default() -> Self {
        Self {
            threshold: HumanDuration::from(std::time::Duration::from_secs(10)),
            max_retriable: 20,
            cache_expiration: HumanDuration::from(std::time::Duration::from_secs(86400)),
            stash_time: HumanDuration::from(std::time::Duration::from_secs(86400)),
            server_tag: "coinc-server".to_string(),
        }
    }
}

impl CoincidenceConfig {
    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        if self.threshold.as_duration().is_zero() {
            anyhow::bail!("coincidence.threshold must be > 0");
        }
        if self.max_retriable == 0 {
            anyhow::bail!("coincidence.max_retriable must be > 0");
        }
        if self.server_tag.trim().is_empty() {
            anyhow::bail!("coincidence.server_tag must be non-empty");
        }
        Ok(())
    }
}
