mod bootstrap;
mod signal;
mod types;

use std::net::SocketAddr;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use coinc_config::CoincConfig;

use crate::alert_task::{run_alert_dispatcher, ALERT_CHANNEL_CAPACITY};
use crate::consumer_loop;
use crate::error::RuntimeResult;

pub use signal::wait_for_signal;

use bootstrap::load_and_bind;
use types::TaskGroup;

/// Owns the full runtime lifecycle: bootstrap, run, graceful shutdown.
///
/// Two task groups are spawned and joined in the same order — consumer
/// loop, then alert dispatcher — on [`Reactor::wait`]: draining the
/// consumer loop first guarantees no new alert is produced after it exits,
/// so the dispatcher can then drain whatever is buffered on the channel and
/// exit once it closes (§5 "Task topology").
pub struct Reactor {
    cancel: CancellationToken,
    groups: Vec<TaskGroup>,
    listen_addr: SocketAddr,
}

impl Reactor {
    /// Bootstrap the entire runtime from a resolved [`CoincConfig`]: binds
    /// the observation source, opens the file-backed sinks, constructs the
    /// coincidence cache, and spawns the consumer loop and alert dispatcher
    /// as tracked task groups.
    #[tracing::instrument(name = "engine.start", skip_all, fields(listen = %config.server.listen))]
    pub async fn start(config: CoincConfig) -> RuntimeResult<Self> {
        let cancel = CancellationToken::new();

        let data = load_and_bind(&config).await?;
        cx_info!(
            sys,
            listen = %data.listen_addr,
            threshold_secs = config.coincidence.threshold.as_duration().as_secs_f64(),
            server_tag = %data.server_tag,
            "engine bootstrap complete"
        );

        let (alert_tx, alert_rx) = mpsc::channel(ALERT_CHANNEL_CAPACITY);

        // Spawn the dispatcher before the loop so it is ready to drain as
        // soon as the first alert lands. Groups are stored consumer-first
        // regardless, since `wait` must join the sole alert producer
        // before the task that drains its channel.
        let mut alert_group = TaskGroup::new("alert_dispatcher");
        let publisher = data.publisher;
        alert_group.push(tokio::spawn(async move {
            run_alert_dispatcher(alert_rx, publisher).await;
            RuntimeResult::Ok(())
        }));

        let mut consumer_group = TaskGroup::new("consumer_loop");
        consumer_group.push(tokio::spawn(consumer_loop::run(
            data.cache,
            data.source,
            data.storage,
            data.heartbeat,
            data.false_alarm,
            alert_tx,
            data.server_tag,
            data.max_retriable,
            data.exit_on_error,
            cancel.clone(),
        )));

        let groups = vec![consumer_group, alert_group];

        Ok(Self { cancel, groups, listen_addr: data.listen_addr })
    }

    /// The address the TCP observation source is actually bound to.
    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    /// Request graceful shutdown: the consumer loop finishes its in-flight
    /// message (including any alerts it produced) and returns without
    /// resubscribing.
    pub fn shutdown(&self) {
        cx_info!(sys, "initiating graceful shutdown");
        self.cancel.cancel();
    }

    /// Wait for both task groups to finish, consumer loop first: it is the
    /// sole alert producer, so once it is joined the dispatcher is
    /// guaranteed to be draining a channel that will close.
    pub async fn wait(self) -> RuntimeResult<()> {
        for group in self.groups {
            let name = group.name;
            cx_debug!(sys, task_group = name, "waiting for task group to finish");
            group.wait().await?;
            cx_debug!(sys, task_group = name, "task group finished");
        }
        Ok(())
    }

    /// A clone of the root cancellation token, for signal integration.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
