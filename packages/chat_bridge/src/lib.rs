//! chat_bridge - terminal client for line-based WebSocket chat servers
//!
//! The client owns one WebSocket connection per session. Right after the
//! socket opens it sends the configured identity token as the first frame,
//! then relays typed lines to the server and renders whatever the server
//! broadcasts, in arrival order. A lost connection is reported once and is
//! final: there is no reconnect.
//!
//! # Example
//!
//! ```no_run
//! use chat_bridge::{ChatConfig, session, terminal};
//!
//! # async fn example(config: ChatConfig) -> anyhow::Result<()> {
//! let (mut router, mut events) = session::connect(&config);
//! let mut ui = terminal::spawn_stdin_reader();
//! let mut view = terminal::TerminalView::new(std::io::stdout());
//! session::run(&mut router, &mut events, &mut ui, &mut view, std::future::pending()).await?;
//! session::wait_for_close(&mut router).await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod display;
pub mod endpoint;
pub mod error;
pub mod input;
pub mod router;
pub mod session;
pub mod terminal;
pub mod transport;

pub use config::{ChatConfig, FileConfig};
pub use connection::{ConnectionManager, Lifecycle};
pub use display::DisplaySurface;
pub use endpoint::{Endpoint, EndpointSource};
pub use error::{EndpointError, TransportError};
pub use input::{InputField, Key, UiEvent};
pub use router::{MessageRouter, ProtocolVariant, RouterOptions, SendOutcome};
pub use transport::{MemoryTransport, Transport, TransportEvent, TransportState, WsTransport};
