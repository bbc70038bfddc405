use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite;
use tracing::{debug, info, warn};

use super::{Transport, TransportEvent};
use crate::endpoint::Endpoint;
use crate::error::TransportError;

enum Outbound {
    Frame(String),
    Close,
}

/// WebSocket transport backed by tokio-tungstenite.
///
/// The socket lives on its own task. Outbound frames reach it through an
/// unbounded channel so `send_frame` never waits; everything the socket
/// reports comes back as [`TransportEvent`]s.
pub struct WsTransport {
    outbound: mpsc::UnboundedSender<Outbound>,
    task: JoinHandle<()>,
}

impl WsTransport {
    /// Start connecting to `endpoint`. Must be called inside a tokio runtime.
    ///
    /// There is no retry: a failed connect is reported as `Error` followed by
    /// `Close` and the task ends.
    pub fn open(endpoint: &Endpoint) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let url = endpoint.as_str().to_string();
        let task = tokio::spawn(run_socket(url, outbound_rx, event_tx));
        (
            Self {
                outbound: outbound_tx,
                task,
            },
            event_rx,
        )
    }

    /// Wait up to `grace` for the socket task to end.
    ///
    /// After [`Transport::close`] the task ends once the server answers the
    /// close frame. Returns whether it ended in time.
    pub async fn wait_finished(&mut self, grace: Duration) -> bool {
        if self.task.is_finished() {
            return true;
        }
        tokio::time::timeout(grace, &mut self.task).await.is_ok()
    }
}

impl Transport for WsTransport {
    fn send_frame(&mut self, frame: String) -> Result<(), TransportError> {
        self.outbound
            .send(Outbound::Frame(frame))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        let _ = self.outbound.send(Outbound::Close);
    }
}

async fn run_socket(
    url: String,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let ws_stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            let err = TransportError::from_tungstenite(e);
            warn!(%url, "connect failed: {}", err);
            let _ = events.send(TransportEvent::Error(err.to_string()));
            let _ = events.send(TransportEvent::Close {
                code: None,
                reason: err.to_string(),
            });
            return;
        }
    };

    info!(%url, "connected");
    let _ = events.send(TransportEvent::Open);

    let (mut ws_write, mut ws_read) = ws_stream.split();
    let mut accepting = true;

    loop {
        tokio::select! {
            out = outbound.recv(), if accepting => {
                match out {
                    Some(Outbound::Frame(text)) => {
                        if let Err(e) = ws_write.send(tungstenite::Message::Text(text.into())).await {
                            let err = TransportError::from_tungstenite(e);
                            warn!("send failed: {}", err);
                            let _ = events.send(TransportEvent::Error(err.to_string()));
                            let _ = events.send(TransportEvent::Close {
                                code: None,
                                reason: err.to_string(),
                            });
                            return;
                        }
                    }
                    Some(Outbound::Close) | None => {
                        debug!("closing socket");
                        accepting = false;
                        let _ = ws_write.send(tungstenite::Message::Close(None)).await;
                    }
                }
            }

            msg = ws_read.next() => {
                match msg {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        let _ = events.send(TransportEvent::Message(text.as_str().to_owned()));
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        let (code, reason) = match frame {
                            Some(f) => (Some(u16::from(f.code)), f.reason.as_str().to_owned()),
                            None => (None, String::new()),
                        };
                        info!(?code, %reason, "server closed the connection");
                        let _ = ws_write.close().await;
                        let _ = events.send(TransportEvent::Close { code, reason });
                        return;
                    }
                    Some(Ok(_)) => {
                        // Binary, ping and pong frames carry no chat content
                    }
                    Some(Err(e)) => {
                        let err = TransportError::from_tungstenite(e);
                        warn!("read failed: {}", err);
                        let _ = events.send(TransportEvent::Error(err.to_string()));
                        let _ = events.send(TransportEvent::Close {
                            code: None,
                            reason: err.to_string(),
                        });
                        return;
                    }
                    None => {
                        let _ = events.send(TransportEvent::Close {
                            code: None,
                            reason: String::new(),
                        });
                        return;
                    }
                }
            }
        }
    }
}
