//! The session event loop.
//!
//! Transport events and UI events are taken one at a time and each is
//! handled to completion before the next. After every event, whatever the
//! transcript gained is drawn.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::ChatConfig;
use crate::connection::ConnectionManager;
use crate::display::DisplaySurface;
use crate::input::UiEvent;
use crate::router::MessageRouter;
use crate::terminal::TerminalView;
use crate::transport::{Transport, TransportEvent, WsTransport};

/// How long a finished session waits for the server to answer its close frame.
pub const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Why a session loop returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The input source closed (EOF on stdin).
    InputClosed,
    /// The shutdown future fired (Ctrl-C).
    Interrupted,
}

/// Open the configured endpoint and build a router around the connection.
pub fn connect(
    config: &ChatConfig,
) -> (
    MessageRouter<WsTransport>,
    mpsc::UnboundedReceiver<TransportEvent>,
) {
    let (connection, events) =
        ConnectionManager::open(config.endpoint.clone(), config.identity.clone());
    let router = MessageRouter::new(
        connection,
        DisplaySurface::new(config.viewport_rows),
        config.router.clone(),
    );
    (router, events)
}

/// Dispatch events until the input closes or `shutdown` resolves.
///
/// A closed connection does not end the session: the transcript stays
/// readable, and sends are ignored, until the user leaves.
pub async fn run<T, W, F>(
    router: &mut MessageRouter<T>,
    events: &mut mpsc::UnboundedReceiver<TransportEvent>,
    ui: &mut mpsc::Receiver<UiEvent>,
    view: &mut TerminalView<W>,
    shutdown: F,
) -> Result<SessionEnd>
where
    T: Transport,
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let end = loop {
        tokio::select! {
            // Frames already delivered are rendered before new input is handled
            biased;

            Some(event) = events.recv() => {
                router.handle_transport_event(event);
            }

            ui_event = ui.recv() => {
                match ui_event {
                    Some(event) => {
                        if let Some(outcome) = router.handle_ui_event(event) {
                            debug!(?outcome, "send intent");
                        }
                    }
                    None => break SessionEnd::InputClosed,
                }
            }

            () = &mut shutdown => break SessionEnd::Interrupted,
        }

        view.draw(router.surface_mut().take_undrawn())?;
    };

    router.connection_mut().close();
    Ok(end)
}

/// Let the socket finish the close handshake started by [`run`].
///
/// Bounded by [`CLOSE_GRACE`] so a silent server cannot hold up exit.
pub async fn wait_for_close(router: &mut MessageRouter<WsTransport>) -> bool {
    router.connection_mut().wait_closed(CLOSE_GRACE).await
}
