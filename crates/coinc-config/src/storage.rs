use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// `[storage]` — where `FileObservationStorage` appends raw observations
/// (§6 `Storage.insert`), the audit trail that is not transactional with
/// alert publication (§7).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/observations.jsonl"),
        }
    }
}

impl StorageConfig {
    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        if self.path.as_os_str().is_empty() {
            anyhow::bail!("storage.path must be non-empty");
        }
        Ok(())
    }
}
