//! The narrow transport seam between the chat core and a socket.
//!
//! A transport only moves text frames. Lifecycle transitions arrive as
//! [`TransportEvent`]s on a channel, in the order the socket produced them;
//! the core handles each one to completion before taking the next.

mod memory;
mod ws;

pub use memory::MemoryTransport;
pub use ws::WsTransport;

use crate::error::TransportError;

/// Lifecycle of the single connection a session owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl std::fmt::Display for TransportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransportState::Connecting => "connecting",
            TransportState::Open => "open",
            TransportState::Closing => "closing",
            TransportState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Something that happened on the socket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// The handshake with the server completed.
    Open,
    /// One inbound text frame.
    Message(String),
    /// Low-level socket failure. Usually followed by `Close`.
    Error(String),
    /// The connection is gone, either side initiated.
    Close { code: Option<u16>, reason: String },
}

/// Outbound half of a connection.
///
/// Implementations must not block: a frame is handed off and the call returns.
pub trait Transport {
    fn send_frame(&mut self, frame: String) -> Result<(), TransportError>;

    /// Start closing the connection. Further frames are rejected.
    fn close(&mut self);
}
