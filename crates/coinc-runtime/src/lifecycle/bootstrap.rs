use std::net::SocketAddr;
use std::sync::Arc;

use coinc_config::CoincConfig;
use coinc_core::{AlertPublisher, Cache, FalseAlarmRate, HeartbeatSource, ObservationSource, ObservationStorage};

use crate::collaborators::{FileAlertPublisher, FileObservationStorage, StaticHeartbeatSource, TcpObservationSource, UniformFalseAlarmRate};
use crate::error::{RuntimeError, RuntimeReason, RuntimeResult};

/// Everything [`super::Reactor::start`] needs to hand off to the consumer
/// loop and alert dispatcher tasks, assembled from a resolved
/// [`CoincConfig`].
pub(super) struct BootstrapData {
    pub cache: Cache,
    pub source: Box<dyn ObservationSource>,
    pub storage: Arc<dyn ObservationStorage>,
    pub publisher: Arc<dyn AlertPublisher>,
    pub heartbeat: Option<Arc<dyn HeartbeatSource>>,
    pub false_alarm: Arc<dyn FalseAlarmRate>,
    pub listen_addr: SocketAddr,
    pub server_tag: String,
    pub max_retriable: u32,
    pub exit_on_error: bool,
}

/// Binds the TCP observation source and opens the file-backed sinks named
/// by `config`. No rule compilation or schema loading — the grouping
/// engine's shape is fixed, not data-driven (§9 "Mutable global-ish cache").
pub(super) async fn load_and_bind(config: &CoincConfig) -> RuntimeResult<BootstrapData> {
    let (source, listen_addr) = TcpObservationSource::bind(&config.server.listen)
        .await
        .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap(format!("bind {}: {e}", config.server.listen))))?;

    let storage = FileObservationStorage::open(&config.storage.path)
        .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap(format!("open storage sink {}: {e}", config.storage.path.display()))))?;

    let publisher = FileAlertPublisher::open(&config.alert.path)
        .map_err(|e| RuntimeError::from(RuntimeReason::Bootstrap(format!("open alert sink {}: {e}", config.alert.path.display()))))?;

    // §4.5 SUPPLEMENT: heartbeat is consulted once per emitted alert only
    // when enabled; this repo carries no live uptime feed, so the enabled
    // case still reports an empty snapshot, but wires the collaborator
    // call a real feed would plug into later.
    let heartbeat: Option<Arc<dyn HeartbeatSource>> = if config.heartbeat.store_heartbeat {
        Some(Arc::new(StaticHeartbeatSource::disabled()))
    } else {
        None
    };
    let false_alarm = Arc::new(UniformFalseAlarmRate::new(config.heartbeat.false_alarm_prob_default));

    let cache = Cache::new(config.coincidence.threshold.as_chrono());

    Ok(BootstrapData {
        cache,
        source: Box::new(source),
        storage: Arc::new(storage),
        publisher: Arc::new(publisher),
        heartbeat,
        false_alarm,
        listen_addr,
        server_tag: config.coincidence.server_tag.clone(),
        max_retriable: config.coincidence.max_retriable,
        exit_on_error: config.bus.exit_on_error,
    })
}
