use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::alert::AlertConfig;
use crate::bus::BusConfig;
use crate::coincidence::CoincidenceConfig;
use crate::heartbeat::HeartbeatConfig;
use crate::logging::LoggingConfig;
use crate::server::ServerConfig;
use crate::storage::StorageConfig;
use crate::validate;

// ---------------------------------------------------------------------------
// Raw TOML structure (intermediate representation)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CoincConfigRaw {
    server: ServerConfig,
    coincidence: CoincidenceConfig,
    bus: BusConfig,
    heartbeat: HeartbeatConfig,
    storage: StorageConfig,
    alert: AlertConfig,
    logging: LoggingConfig,
}

impl Default for CoincConfigRaw {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            coincidence: CoincidenceConfig::default(),
            bus: BusConfig::default(),
            heartbeat: HeartbeatConfig::default(),
            storage: StorageConfig::default(),
            alert: AlertConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// CoincConfig (resolved, validated)
// ---------------------------------------------------------------------------

/// The full, validated configuration surface of the coincidence server
/// (§6 "Full configuration surface"), resolved from a `coinc.toml`-shaped
/// file via a `Raw → resolved` struct plus `FromStr` and `validate()`.
#[derive(Debug, Clone)]
pub struct CoincConfig {
    pub server: ServerConfig,
    pub coincidence: CoincidenceConfig,
    pub bus: BusConfig,
    pub heartbeat: HeartbeatConfig,
    pub storage: StorageConfig,
    pub alert: AlertConfig,
    pub logging: LoggingConfig,
}

impl CoincConfig {
    /// Read and parse a `coinc.toml` file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.as_ref().display()))?;
        content.parse()
    }
}

impl FromStr for CoincConfig {
    type Err = anyhow::Error;

    /// Parse a TOML string into a resolved, validated [`CoincConfig`]. Every
    /// section has a default, so an empty string parses to the default
    /// configuration.
    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let raw: CoincConfigRaw = toml::from_str(toml_str)?;

        let config = CoincConfig {
            server: raw.server,
            coincidence: raw.coincidence,
            bus: raw.bus,
            heartbeat: raw.heartbeat,
            storage: raw.storage,
            alert: raw.alert,
            logging: raw.logging,
        };

        validate::validate(&config)?;

        Ok(config)
    }
}
