use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use async_trait::async_trait;

use coinc_core::{BusError, ObservationSource, RawMessage};

/// Bounded capacity of the internal channel between the accept loop and
/// [`TcpObservationSource::recv`].
const CHANNEL_CAPACITY: usize = 256;

/// Newline-delimited-JSON-over-TCP [`ObservationSource`]: a long-lived
/// `TcpListener` accept loop that funnels each connection's lines into one
/// internal channel. Accepts any number of
/// concurrent connections; each line read from each connection is parsed as
/// one [`RawMessage`] and funneled into a single internal channel.
pub struct TcpObservationSource {
    rx: mpsc::Receiver<RawMessage>,
    /// Keeps the accept loop alive; cancelling it is not currently exposed
    /// since the source is torn down by dropping the whole struct.
    _cancel: CancellationToken,
}

impl TcpObservationSource {
    /// Parse `"tcp://host:port"`, bind, and spawn the background accept
    /// loop. Returns once bound, together with the actual local address
    /// (useful when `listen` asks for an ephemeral port); the accept loop
    /// itself runs until this source (and the `CancellationToken` it
    /// owns) is dropped.
    pub async fn bind(listen: &str) -> std::io::Result<(Self, SocketAddr)> {
        let addr = listen.strip_prefix("tcp://").unwrap_or(listen);
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(accept_loop(listener, tx, cancel.clone()));
        Ok((Self { rx, _cancel: cancel }, local_addr))
    }
}

async fn accept_loop(listener: TcpListener, tx: mpsc::Sender<RawMessage>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok(pair) => pair,
                    Err(e) => {
                        cx_warn!(conn, error = %e, "accept error");
                        continue;
                    }
                };
                cx_debug!(conn, peer = %peer, "accepted connection");
                let tx = tx.clone();
                let conn_cancel = cancel.child_token();
                tokio::spawn(handle_connection(stream, tx, conn_cancel, peer));
            }
            _ = cancel.cancelled() => break,
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    tx: mpsc::Sender<RawMessage>,
    cancel: CancellationToken,
    peer: SocketAddr,
) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(None) => break,
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<RawMessage>(&line) {
                            Ok(raw) => {
                                if tx.send(raw).await.is_err() {
                                    cx_warn!(conn, peer = %peer, "observation channel closed, dropping connection");
                                    break;
                                }
                            }
                            Err(e) => cx_warn!(conn, peer = %peer, error = %e, "malformed NDJSON line, skipped"),
                        }
                    }
                    Err(e) => {
                        cx_warn!(conn, peer = %peer, error = %e, "connection read error");
                        break;
                    }
                }
            }
            _ = cancel.cancelled() => break,
        }
    }
    cx_debug!(conn, peer = %peer, "connection closed");
}

#[async_trait]
impl ObservationSource for TcpObservationSource {
    async fn recv(&mut self) -> Result<RawMessage, BusError> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| BusError::Fatal("accept loop terminated".to_string()))
    }

    /// The accept loop runs independently of any single connection and
    /// keeps accepting new ones across drops, so there is nothing to
    /// reopen at the subscription level — a dropped client simply
    /// reconnects and the next `recv` resumes delivering its messages.
    async fn resubscribe(&mut self) -> Result<(), BusError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    async fn bind_ephemeral() -> (TcpObservationSource, SocketAddr) {
        TcpObservationSource::bind("tcp://127.0.0.1:0").await.unwrap()
    }

    #[tokio::test]
    async fn parses_ndjson_lines_from_a_connection() {
        let (mut source, addr) = bind_ephemeral().await;
        let mut conn = TcpStream::connect(addr).await.unwrap();
        conn.write_all(b"{\"_id\":\"A\",\"detector_name\":\"X\",\"neutrino_time\":\"2026-01-01T00:00:00Z\",\"p_val\":0.5}\n").await.unwrap();
        conn.flush().await.unwrap();

        let raw = tokio::time::timeout(std::time::Duration::from_secs(2), source.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw.id, Some("A".to_string()));
        assert_eq!(raw.detector_name, Some("X".to_string()));
    }

    #[tokio::test]
    async fn skips_malformed_lines_without_dying() {
        let (mut source, addr) = bind_ephemeral().await;
        let mut conn = TcpStream::connect(addr).await.unwrap();
        conn.write_all(b"not json\n").await.unwrap();
        conn.write_all(b"{\"_id\":\"B\",\"detector_name\":\"Y\",\"neutrino_time\":\"2026-01-01T00:00:01Z\",\"p_val\":0.4}\n").await.unwrap();
        conn.flush().await.unwrap();

        let raw = tokio::time::timeout(std::time::Duration::from_secs(2), source.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw.id, Some("B".to_string()));
    }

    #[tokio::test]
    async fn resubscribe_is_a_no_op() {
        let (mut source, _addr) = bind_ephemeral().await;
        source.resubscribe().await.unwrap();
    }
}
