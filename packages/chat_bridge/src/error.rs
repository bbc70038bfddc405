use tokio_tungstenite::tungstenite;

/// Problems resolving the chat WebSocket URL from configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported scheme {0:?} (expected {1})")]
    UnsupportedScheme(String, &'static str),

    #[error("URL {0:?} has no host")]
    MissingHost(String),

    #[error("no endpoint configured: set server.endpoint or server.origin")]
    NotConfigured,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The socket task has gone away; nothing more can be sent.
    #[error("transport is closed")]
    Closed,

    #[error("chat server is unavailable")]
    Unavailable,

    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn from_tungstenite(err: tungstenite::Error) -> Self {
        let is_connect = match &err {
            tungstenite::Error::Io(io_err) => matches!(
                io_err.kind(),
                std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        };
        if is_connect {
            Self::Unavailable
        } else {
            Self::Other(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_connection_is_unavailable() {
        let io = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        let err = TransportError::from_tungstenite(tungstenite::Error::Io(io));
        assert!(matches!(err, TransportError::Unavailable));
    }

    #[test]
    fn other_io_errors_keep_their_message() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = TransportError::from_tungstenite(tungstenite::Error::Io(io));
        match err {
            TransportError::Other(msg) => assert!(msg.contains("boom")),
            other => panic!("expected Other, got {other:?}"),
        }
    }

    #[test]
    fn endpoint_error_messages() {
        let err = EndpointError::UnsupportedScheme("ftp".into(), "ws or wss");
        assert_eq!(
            err.to_string(),
            "unsupported scheme \"ftp\" (expected ws or wss)"
        );
    }
}
