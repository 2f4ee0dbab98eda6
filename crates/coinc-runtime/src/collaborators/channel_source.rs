use async_trait::async_trait;
use tokio::sync::mpsc;

use coinc_core::{BusError, ObservationSource, RawMessage};

/// In-process [`ObservationSource`] fed by an `mpsc` channel. Used by the
/// CLI's embedded-producer mode and by tests that want to drive the
/// consumer loop without a socket.
pub struct ChannelObservationSource {
    rx: mpsc::Receiver<RawMessage>,
}

impl ChannelObservationSource {
    /// Create a bounded channel and return both ends: the source half for
    /// the consumer loop, and a [`ChannelProducer`] handle callers use to
    /// feed it observations.
    pub fn new(capacity: usize) -> (Self, ChannelProducer) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { rx }, ChannelProducer { tx })
    }
}

#[async_trait]
impl ObservationSource for ChannelObservationSource {
    async fn recv(&mut self) -> Result<RawMessage, BusError> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| BusError::Fatal("producer channel closed".to_string()))
    }

    /// Nothing to reopen: the channel is either open or permanently closed.
    /// A closed channel is reported as fatal by `recv`, not by this method.
    async fn resubscribe(&mut self) -> Result<(), BusError> {
        Ok(())
    }
}

/// The sending half of a [`ChannelObservationSource`]. Cloneable so several
/// producer tasks (or a single TCP-framed feeder) can share one source.
#[derive(Clone)]
pub struct ChannelProducer {
    tx: mpsc::Sender<RawMessage>,
}

impl ChannelProducer {
    pub async fn send(&self, message: RawMessage) -> Result<(), RawMessage> {
        self.tx.send(message).await.map_err(|e| e.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn msg(id: &str) -> RawMessage {
        RawMessage {
            id: Some(id.to_string()),
            detector_name: Some("X".to_string()),
            neutrino_time: Some("2026-01-01T00:00:00Z".to_string()),
            machine_time: None,
            p_val: Some(0.5),
            meta: Value::Null,
            retract_latest: false,
        }
    }

    #[tokio::test]
    async fn recv_returns_produced_messages_in_order() {
        let (mut source, producer) = ChannelObservationSource::new(4);
        producer.send(msg("A")).await.unwrap();
        producer.send(msg("B")).await.unwrap();
        assert_eq!(source.recv().await.unwrap().id, Some("A".to_string()));
        assert_eq!(source.recv().await.unwrap().id, Some("B".to_string()));
    }

    #[tokio::test]
    async fn recv_reports_fatal_when_producer_dropped() {
        let (mut source, producer) = ChannelObservationSource::new(4);
        drop(producer);
        let err = source.recv().await.unwrap_err();
        assert!(matches!(err, BusError::Fatal(_)));
    }
}
