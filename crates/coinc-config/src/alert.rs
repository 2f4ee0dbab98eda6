use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// `[alert]` — where `FileAlertPublisher` appends outbound alerts (§6
/// `Publisher.send`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlertConfig {
    pub path: PathBuf,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/alerts.jsonl"),
        }
    }
}

impl AlertConfig {
    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        if self.path.as_os_str().is_empty() {
            anyhow::bail!("alert.path must be non-empty");
        }
        Ok(())
    }
}
