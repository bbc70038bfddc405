//! Translates user intent into frames and frames into transcript lines.
//!
//! Two wire contracts exist for the paired server and they are not
//! compatible with each other, so a session picks one [`ProtocolVariant`] up
//! front and uses it for both directions:
//!
//! - `ClientLabels` (default): the sender renders `"{label}: {text}\n"`
//!   immediately and sends `"{text}\n"`; the server relays
//!   `"{name}: {text}\n"` to the other peers only. Inbound frames carry their
//!   own terminator and are appended as is.
//! - `ServerLabels`: for servers that echo every message back to everyone,
//!   sender included. The raw text is sent and the echo is the only
//!   rendering. Inbound frames carry no terminator, so lines are joined with
//!   a separator.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::connection::{ConnectionManager, Lifecycle};
use crate::display::DisplaySurface;
use crate::input::{InputField, Key, UiEvent};
use crate::transport::{Transport, TransportEvent};

pub const CONNECTION_LOST_NOTICE: &str = "--- Connection to the server lost. Please reload. ---";
pub const CONNECTION_ERROR_NOTICE: &str = "--- A connection error occurred. ---";

/// Upper bound on self-echoes we wait for before forgetting the oldest.
const MAX_EXPECTED_ECHOES: usize = 64;

#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ProtocolVariant {
    /// Server labels and echoes every message, including our own.
    #[value(alias = "a")]
    ServerLabels,
    /// We label and echo our own messages; the server relays to others.
    #[default]
    #[value(alias = "b")]
    ClientLabels,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouterOptions {
    pub variant: ProtocolVariant,
    /// Label for our own messages under `ClientLabels`.
    pub self_label: String,
    /// Under `ClientLabels`, drop inbound frames that are our own message
    /// coming back as `"{identity}: {text}\n"`.
    pub echo_guard: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            variant: ProtocolVariant::default(),
            self_label: "You".to_string(),
            echo_guard: false,
        }
    }
}

/// Why a send intent did or did not transmit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Input was empty after trimming.
    Empty,
    /// The connection is not open.
    NotOpen,
}

pub struct MessageRouter<T> {
    connection: ConnectionManager<T>,
    surface: DisplaySurface,
    input: InputField,
    options: RouterOptions,
    expected_echoes: VecDeque<String>,
}

impl<T: Transport> MessageRouter<T> {
    pub fn new(
        connection: ConnectionManager<T>,
        surface: DisplaySurface,
        options: RouterOptions,
    ) -> Self {
        Self {
            connection,
            surface,
            input: InputField::new(),
            options,
            expected_echoes: VecDeque::new(),
        }
    }

    pub fn connection(&self) -> &ConnectionManager<T> {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut ConnectionManager<T> {
        &mut self.connection
    }

    pub fn surface(&self) -> &DisplaySurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DisplaySurface {
        &mut self.surface
    }

    pub fn input(&self) -> &InputField {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputField {
        &mut self.input
    }

    pub fn variant(&self) -> ProtocolVariant {
        self.options.variant
    }

    /// Dispatch one UI event. Returns the send outcome if it was a send intent.
    pub fn handle_ui_event(&mut self, event: UiEvent) -> Option<SendOutcome> {
        match event {
            UiEvent::SetInput(text) => {
                self.input.set_value(text);
                None
            }
            UiEvent::KeyUp(key) => self.on_key_up(key),
            UiEvent::Click => Some(self.on_click()),
        }
    }

    pub fn on_click(&mut self) -> SendOutcome {
        self.send_intent()
    }

    /// Enter released while the input has focus is a send intent.
    pub fn on_key_up(&mut self, key: Key) -> Option<SendOutcome> {
        if key == Key::Enter && self.input.has_focus() {
            Some(self.send_intent())
        } else {
            None
        }
    }

    /// Send whatever is in the input field.
    ///
    /// Nothing happens unless the trimmed text is non-empty and the connection
    /// is open. On success the input is cleared and focused.
    pub fn send_intent(&mut self) -> SendOutcome {
        let text = self.input.value().trim().to_string();
        if text.is_empty() {
            debug!("ignoring empty send");
            return SendOutcome::Empty;
        }
        if !self.connection.is_open() {
            debug!(state = %self.connection.state(), "ignoring send while not open");
            return SendOutcome::NotOpen;
        }

        match self.options.variant {
            ProtocolVariant::ServerLabels => {
                if !self.connection.send(&text) {
                    return SendOutcome::NotOpen;
                }
            }
            ProtocolVariant::ClientLabels => {
                if !self.connection.send(&format!("{text}\n")) {
                    return SendOutcome::NotOpen;
                }
                self.surface
                    .append(&format!("{}: {}\n", self.options.self_label, text));
                self.expect_echo(&text);
            }
        }

        self.input.clear();
        self.input.focus();
        SendOutcome::Sent
    }

    /// Apply a transport event: render frames and notices.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match self.connection.handle_event(event) {
            Some(Lifecycle::Message(payload)) => self.render_inbound(&payload),
            Some(Lifecycle::Errored(_)) => self.render_notice(CONNECTION_ERROR_NOTICE),
            Some(Lifecycle::Closed) => self.render_notice(CONNECTION_LOST_NOTICE),
            Some(Lifecycle::Opened) | None => {}
        }
    }

    /// Append one inbound frame using the variant's line convention.
    pub fn render_inbound(&mut self, payload: &str) {
        match self.options.variant {
            ProtocolVariant::ServerLabels => self.surface.append_separated(payload),
            ProtocolVariant::ClientLabels => {
                if self.is_own_echo(payload) {
                    debug!("dropping self-echo");
                    return;
                }
                self.surface.append(payload);
            }
        }
    }

    /// Nothing is pending between events; a tick has no effect.
    pub fn tick(&mut self) {}

    fn render_notice(&mut self, notice: &str) {
        match self.options.variant {
            ProtocolVariant::ServerLabels => self.surface.append_separated(notice),
            ProtocolVariant::ClientLabels => self.surface.append_terminated(notice),
        }
    }

    fn expect_echo(&mut self, text: &str) {
        if !self.options.echo_guard {
            return;
        }
        let Some(identity) = self.connection.identity() else {
            return;
        };
        let echo = format!("{identity}: {text}\n");
        if self.expected_echoes.len() == MAX_EXPECTED_ECHOES {
            self.expected_echoes.pop_front();
        }
        self.expected_echoes.push_back(echo);
    }

    fn is_own_echo(&mut self, payload: &str) -> bool {
        if self.expected_echoes.front().map(String::as_str) == Some(payload) {
            self.expected_echoes.pop_front();
            true
        } else {
            false
        }
    }
}
