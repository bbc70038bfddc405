use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::Transport;
use crate::error::TransportError;

/// In-memory transport that records every frame handed to it.
///
/// Clones share the same record, so a test can keep one handle while the
/// connection owns the other.
#[derive(Clone, Debug, Default)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames sent so far, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

impl Transport for MemoryTransport {
    fn send_frame(&mut self, frame: String) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame);
        Ok(())
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_record() {
        let handle = MemoryTransport::new();
        let mut owned = handle.clone();
        owned.send_frame("a".into()).unwrap();
        owned.send_frame("b".into()).unwrap();
        assert_eq!(handle.sent(), vec!["a", "b"]);
    }

    #[test]
    fn closed_transport_rejects_frames() {
        let mut t = MemoryTransport::new();
        t.close();
        assert!(matches!(t.send_frame("x".into()), Err(TransportError::Closed)));
        assert!(t.sent().is_empty());
    }
}
