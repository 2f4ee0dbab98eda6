use std::sync::Arc;

use tokio::sync::mpsc;

use coinc_core::{Alert, AlertPublisher};

/// Bounded channel capacity between the consumer loop and this dispatcher
/// (§5 "Task topology" — decouples a slow/blocking publisher from the
/// consumer loop's read-the-next-message cadence without giving the cache
/// a second mutator).
pub const ALERT_CHANNEL_CAPACITY: usize = 64;

/// Drains alerts produced by the consumer loop and forwards each to the
/// `Publisher` collaborator (§6 `Publisher.send`).
///
/// Shutdown is driven by channel close: once the consumer loop exits and
/// drops its `Sender<Alert>`, `rx.recv()` returns `None` and this task
/// exits after flushing whatever was still buffered (§5
/// drain-producer-then-flush-consumer order).
pub async fn run_alert_dispatcher(mut rx: mpsc::Receiver<Alert>, publisher: Arc<dyn AlertPublisher>) {
    while let Some(alert) = rx.recv().await {
        if let Err(e) = publisher.publish(&alert).await {
            // §7 PublisherFailure: logged, not rolled back — the cache
            // mutation that produced this alert already happened.
            cx_warn!(res, error = %e, sub_group_tag = alert.sub_list_num, "alert publish failed");
        }
    }
}
