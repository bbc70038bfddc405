//! Ownership and supervision of the session's single transport.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::endpoint::Endpoint;
use crate::transport::{Transport, TransportEvent, TransportState, WsTransport};

/// What a transport event means for the rest of the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Opened,
    Message(String),
    Errored(String),
    Closed,
}

/// Owns one connection for the whole session.
///
/// The identity token is sent exactly once, as the first frame after the
/// transport opens. A closed connection stays closed: there is no reconnect,
/// and every later `send` is dropped.
pub struct ConnectionManager<T> {
    transport: T,
    endpoint: Endpoint,
    state: TransportState,
    identity: Option<String>,
    handshake_sent: bool,
}

impl ConnectionManager<WsTransport> {
    /// Start a WebSocket connection to `endpoint`. No retry is attempted.
    pub fn open(
        endpoint: Endpoint,
        identity: Option<String>,
    ) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        info!(%endpoint, "connecting");
        let (transport, events) = WsTransport::open(&endpoint);
        (Self::new(transport, endpoint, identity), events)
    }

    /// Give the socket up to `grace` to finish the close handshake.
    pub async fn wait_closed(&mut self, grace: Duration) -> bool {
        let finished = self.transport.wait_finished(grace).await;
        if !finished {
            debug!(state = %self.state, "socket still open after grace period");
        }
        finished
    }
}

impl<T: Transport> ConnectionManager<T> {
    /// Wrap a transport that has started connecting to `endpoint`.
    pub fn new(transport: T, endpoint: Endpoint, identity: Option<String>) -> Self {
        let identity = identity.filter(|s| !s.is_empty());
        if identity.is_none() {
            warn!("no identity token configured; the server will not know who we are");
        }
        Self {
            transport,
            endpoint,
            state: TransportState::Connecting,
            identity,
            handshake_sent: false,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == TransportState::Open
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn handshake_sent(&self) -> bool {
        self.handshake_sent
    }

    /// Transmit one frame if the connection is open; otherwise drop it.
    ///
    /// Returns whether the frame was handed to the transport.
    pub fn send(&mut self, text: &str) -> bool {
        if !self.is_open() {
            debug!(state = %self.state, "dropping send on non-open connection");
            return false;
        }
        match self.transport.send_frame(text.to_string()) {
            Ok(()) => true,
            Err(e) => {
                debug!("transport rejected frame: {}", e);
                false
            }
        }
    }

    /// Ask the transport to close. The `Closed` lifecycle still arrives as an event.
    pub fn close(&mut self) {
        if matches!(self.state, TransportState::Connecting | TransportState::Open) {
            self.state = TransportState::Closing;
            self.transport.close();
        }
    }

    /// Apply one transport event and report what it means.
    ///
    /// Returns `None` for events that have no visible effect, such as a
    /// repeated close or a frame arriving after close.
    pub fn handle_event(&mut self, event: TransportEvent) -> Option<Lifecycle> {
        match event {
            TransportEvent::Open => {
                if self.state != TransportState::Connecting {
                    debug!(state = %self.state, "ignoring open in unexpected state");
                    return None;
                }
                self.state = TransportState::Open;
                info!(endpoint = %self.endpoint, "connection open");
                self.send_handshake();
                Some(Lifecycle::Opened)
            }
            TransportEvent::Message(payload) => {
                if self.state == TransportState::Closed {
                    debug!("ignoring frame received after close");
                    return None;
                }
                Some(Lifecycle::Message(payload))
            }
            TransportEvent::Error(reason) => {
                warn!(endpoint = %self.endpoint, "connection error: {}", reason);
                Some(Lifecycle::Errored(reason))
            }
            TransportEvent::Close { code, reason } => {
                if self.state == TransportState::Closed {
                    return None;
                }
                self.state = TransportState::Closed;
                info!(?code, %reason, "connection closed");
                Some(Lifecycle::Closed)
            }
        }
    }

    fn send_handshake(&mut self) {
        if self.handshake_sent {
            return;
        }
        let Some(identity) = self.identity.clone() else {
            return;
        };
        self.handshake_sent = true;
        if let Err(e) = self.transport.send_frame(identity) {
            warn!("failed to send identity: {}", e);
        }
    }
}
