use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use coinc_core::{
    classify, decide, Alert, AlertPublisher as _, BusError, Cache, Classification, FalseAlarmRate,
    HeartbeatSource, ObservationSource, ObservationStorage,
};

use crate::error::{RuntimeError, RuntimeReason, RuntimeResult};

/// Computes the retry backoff: `(1.5 ^ counter) * (1 + random()) / 2` seconds,
/// exponential with jitter. `random()` is uniform on `[0, 1)`.
fn backoff_duration(counter: u32) -> StdDuration {
    let base = 1.5f64.powi(counter as i32);
    let jitter = (1.0 + rand::random::<f64>()) / 2.0;
    StdDuration::from_secs_f64(base * jitter)
}

/// The sole cache mutator (§5 "single-threaded cooperative"). Pulls
/// messages from `source`, runs them through Classifier → Cache → Alert
/// Decider, forwards produced alerts onto `alert_tx` for the independent
/// dispatcher task, and persists the raw observation via `storage`.
///
/// Retryable transport errors back off exponentially with jitter and
/// escalate to fatal after `max_retriable` consecutive failures (reset to
/// zero on every successful read). Non-retryable transport errors, and an
/// escalated retry streak, reopen the subscription unless `exit_on_error`
/// is set, in which case the loop returns an error and the reactor tears
/// the whole server down.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    mut cache: Cache,
    mut source: Box<dyn ObservationSource>,
    storage: Arc<dyn ObservationStorage>,
    heartbeat: Option<Arc<dyn HeartbeatSource>>,
    false_alarm: Arc<dyn FalseAlarmRate>,
    alert_tx: mpsc::Sender<Alert>,
    server_tag: String,
    max_retriable: u32,
    exit_on_error: bool,
    cancel: CancellationToken,
) -> RuntimeResult<()> {
    let mut retry_counter: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                cx_info!(sys, "consumer loop cancelled, exiting");
                break;
            }
            result = source.recv() => {
                match result {
                    Ok(raw) => {
                        retry_counter = retry_counter.saturating_sub(1);
                        process_message(
                            &mut cache,
                            raw,
                            storage.as_ref(),
                            heartbeat.as_deref(),
                            false_alarm.as_ref(),
                            &alert_tx,
                            &server_tag,
                        )
                        .await;
                    }
                    Err(BusError::Transient(msg)) => {
                        retry_counter += 1;
                        cx_warn!(conn, error = %msg, retry_counter, "transient transport error");
                        if retry_counter >= max_retriable {
                            cx_error!(conn, retry_counter, "retry counter reached MAX_RETRIABLE, escalating to fatal");
                            if exit_on_error {
                                return Err(RuntimeError::from(RuntimeReason::FatalTransport(msg)));
                            }
                            retry_counter = 0;
                        } else {
                            tokio::time::sleep(backoff_duration(retry_counter)).await;
                        }
                        if let Err(e) = source.resubscribe().await {
                            cx_warn!(conn, error = %e, "resubscribe after transient error failed");
                        }
                    }
                    Err(BusError::Fatal(msg)) => {
                        cx_error!(conn, error = %msg, "fatal transport error");
                        if exit_on_error {
                            return Err(RuntimeError::from(RuntimeReason::FatalTransport(msg)));
                        }
                        if let Err(e) = source.resubscribe().await {
                            cx_warn!(conn, error = %e, "resubscribe after fatal error failed");
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// One full cycle for one inbound message: classify, mutate the cache,
/// decide alerts, dispatch them, then persist the raw observation.
/// A malformed message is logged and dropped — the cache is left
/// untouched and the loop continues, per §7 `BadMessage`.
async fn process_message(
    cache: &mut Cache,
    raw: coinc_core::RawMessage,
    storage: &dyn ObservationStorage,
    heartbeat: Option<&dyn HeartbeatSource>,
    false_alarm: &dyn FalseAlarmRate,
    alert_tx: &mpsc::Sender<Alert>,
    server_tag: &str,
) {
    let classification = match classify(cache, raw, Utc::now()) {
        Ok(c) => c,
        Err(e) => {
            cx_warn!(pipe, error = %e, "malformed message dropped");
            return;
        }
    };

    let persisted = match classification {
        Classification::Add(obs) => {
            cache.apply_add(obs.clone());
            Some(obs)
        }
        Classification::Update(obs) => {
            cache.apply_update(obs.clone());
            Some(obs)
        }
        Classification::Retraction(detector_name) => {
            if !cache.retract(&detector_name) {
                cx_info!(pipe, detector = %detector_name, "retraction for unknown detector, no-op");
            }
            None
        }
    };

    let alerts = decide(cache, server_tag, heartbeat, false_alarm).await;
    for alert in alerts {
        if alert_tx.send(alert).await.is_err() {
            cx_warn!(res, "alert channel closed, dropping alert");
        }
    }
    cache.clear_flags();

    if let Some(obs) = persisted {
        if let Err(e) = storage.insert(&obs).await {
            cx_warn!(res, error = %e, "observation storage failed");
        }
    }
}
