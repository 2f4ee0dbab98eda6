use serde::{Deserialize, Serialize};

/// `[server]` — the `ObservationSource` bind address, TCP mode only.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Listen address, e.g. `"tcp://0.0.0.0:9600"`.
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "tcp://0.0.0.0:9600".to_string(),
        }
    }
}

impl ServerConfig {
    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        if !self.listen.starts_with("tcp://") {
            anyhow::bail!("server.listen must start with \"tcp://\", got {:?}", self.listen);
        }
        Ok(())
    }
}
