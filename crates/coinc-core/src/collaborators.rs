//! Trait boundaries for everything the engine treats as an external
//! collaborator (§6): transport, alert publishing, raw-observation storage,
//! the heartbeat cache, and the false-alarm-rate computation. `coinc-core`
//! only names these contracts; concrete implementations (TCP/JSON-lines
//! bus, JSONL sinks, …) live in `coinc-runtime`.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::alert::Alert;
use crate::observation::{Observation, RawMessage};
use crate::subgroup::SubGroup;

/// Transport-level failure reported by an [`ObservationSource`]. The
/// consumer loop (§4.5) treats these differently: `Transient` drives
/// backoff-and-reopen, `Fatal` either exits or reopens depending on
/// operator configuration.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("transient transport error: {0}")]
    Transient(String),
    #[error("fatal transport error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
#[error("publish failed: {0}")]
pub struct PublishError(pub String);

#[derive(Debug, thiserror::Error)]
#[error("storage failed: {0}")]
pub struct StorageError(pub String);

/// The observation-topic subscription (§6 `Publisher`/transport side).
/// `recv` blocks until a message arrives, the subscription ends
/// transiently, or it ends fatally. `resubscribe` is called by the
/// consumer loop to reopen the subscription after either kind of error.
#[async_trait]
pub trait ObservationSource: Send + Sync {
    async fn recv(&mut self) -> Result<RawMessage, BusError>;
    async fn resubscribe(&mut self) -> Result<(), BusError>;
}

/// `Publisher.send(alert)` (§6) — blocking from the caller's perspective,
/// idempotent, at-most-once: a failed publish is logged and does not roll
/// back the cache mutation that produced the alert (§7).
#[async_trait]
pub trait AlertPublisher: Send + Sync {
    async fn publish(&self, alert: &Alert) -> Result<(), PublishError>;
}

/// `Storage.insert(observation)` (§6) — persists the raw observation for
/// audit purposes; not transactional with publish (§7).
#[async_trait]
pub trait ObservationStorage: Send + Sync {
    async fn insert(&self, observation: &Observation) -> Result<(), StorageError>;
}

/// Detector-uptime table used by [`FalseAlarmRate`]. Keyed by
/// `detector_name`; the meaning of the value (last-heartbeat timestamp,
/// uptime fraction, …) is entirely a collaborator concern — the core never
/// inspects it beyond handing it to `FalseAlarmRate::estimate`.
#[derive(Debug, Clone, Default)]
pub struct HeartbeatSnapshot {
    pub detector_status: HashMap<String, serde_json::Value>,
}

/// `Heartbeat.cache_snapshot()` (§6).
#[async_trait]
pub trait HeartbeatSource: Send + Sync {
    async fn cache_snapshot(&self) -> HeartbeatSnapshot;
}

/// `FalseAlarmRate(sub_group, heartbeat_snapshot) -> number` (§6). Sync —
/// unlike the other collaborators this is a pure computation, not I/O.
pub trait FalseAlarmRate: Send + Sync {
    fn estimate(&self, sub_group: &SubGroup, heartbeat: &HeartbeatSnapshot) -> f64;
}
