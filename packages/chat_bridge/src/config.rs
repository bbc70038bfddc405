use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::display::DEFAULT_VIEWPORT_ROWS;
use crate::endpoint::{DEFAULT_CHAT_PATH, Endpoint};
use crate::router::{ProtocolVariant, RouterOptions};

// =============================================================================
// File config (figment-deserialized from defaults / config.toml / env vars)
// =============================================================================
//
//   config.toml:     [server]
//                    origin = "https://chat.example.com"
//
//   env var:         CHAT_BRIDGE_SERVER__ORIGIN=https://chat.example.com
//
//   (double underscore = nesting; single underscore stays within field names)

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerFileConfig,
    #[serde(default)]
    pub identity: IdentityFileConfig,
    #[serde(default)]
    pub protocol: ProtocolFileConfig,
    #[serde(default)]
    pub display: DisplayFileConfig,
}

/// Where the chat server lives (under `[server]`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerFileConfig {
    /// Page origin to derive the socket URL from, e.g. `https://host`.
    #[serde(default)]
    pub origin: Option<String>,
    /// Absolute `ws://` or `wss://` URL. Wins over `origin`.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_chat_path")]
    pub chat_path: String,
}

impl Default for ServerFileConfig {
    fn default() -> Self {
        Self {
            origin: None,
            endpoint: None,
            chat_path: default_chat_path(),
        }
    }
}

/// Identity sent as the handshake frame (under `[identity]`).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdentityFileConfig {
    #[serde(default)]
    pub token: Option<String>,
}

/// Wire contract with the server (under `[protocol]`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolFileConfig {
    #[serde(default)]
    pub variant: ProtocolVariant,
    #[serde(default = "default_self_label")]
    pub self_label: String,
    #[serde(default)]
    pub echo_guard: bool,
}

impl Default for ProtocolFileConfig {
    fn default() -> Self {
        Self {
            variant: ProtocolVariant::default(),
            self_label: default_self_label(),
            echo_guard: false,
        }
    }
}

/// Transcript view (under `[display]`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayFileConfig {
    #[serde(default = "default_viewport_rows")]
    pub viewport_rows: usize,
}

impl Default for DisplayFileConfig {
    fn default() -> Self {
        Self {
            viewport_rows: default_viewport_rows(),
        }
    }
}

fn default_chat_path() -> String {
    DEFAULT_CHAT_PATH.to_string()
}
fn default_self_label() -> String {
    "You".to_string()
}
fn default_viewport_rows() -> usize {
    DEFAULT_VIEWPORT_ROWS
}

/// Build a figment that layers: defaults → config.toml → CHAT_BRIDGE_* env vars.
///
///   `CHAT_BRIDGE_IDENTITY__TOKEN=alice`  →  `identity.token = "alice"`
///   `CHAT_BRIDGE_PROTOCOL__VARIANT=client-labels`  →  `protocol.variant = "client-labels"`
pub fn load_config(config_dir: &Path) -> figment::Figment {
    use figment::{
        Figment,
        providers::{Env, Format, Serialized, Toml},
    };

    Figment::from(Serialized::defaults(FileConfig::default()))
        .merge(Toml::file(config_dir.join("config.toml")))
        .merge(Env::prefixed("CHAT_BRIDGE_").split("__"))
}

/// Values given on the command line. They sit above every other layer.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub endpoint: Option<String>,
    pub origin: Option<String>,
    pub identity: Option<String>,
    pub variant: Option<ProtocolVariant>,
}

impl FileConfig {
    pub fn apply(mut self, overrides: CliOverrides) -> Self {
        if let Some(endpoint) = overrides.endpoint {
            self.server.endpoint = Some(endpoint);
        }
        if let Some(origin) = overrides.origin {
            // An origin given on the command line beats an endpoint from the file.
            self.server.origin = Some(origin);
            self.server.endpoint = None;
        }
        if let Some(identity) = overrides.identity {
            self.identity.token = Some(identity);
        }
        if let Some(variant) = overrides.variant {
            self.protocol.variant = variant;
        }
        self
    }
}

// =============================================================================
// Runtime config (resolved from FileConfig)
// =============================================================================

#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub endpoint: Endpoint,
    pub identity: Option<String>,
    pub router: RouterOptions,
    pub viewport_rows: usize,
}

impl ChatConfig {
    pub fn from_file(fc: &FileConfig) -> Result<Self> {
        let endpoint = Endpoint::resolve(
            fc.server.endpoint.as_deref(),
            fc.server.origin.as_deref(),
            &fc.server.chat_path,
        )
        .context("Failed to resolve chat endpoint")?;

        Ok(Self {
            endpoint,
            identity: fc.identity.token.clone().filter(|t| !t.is_empty()),
            router: RouterOptions {
                variant: fc.protocol.variant,
                self_label: fc.protocol.self_label.clone(),
                echo_guard: fc.protocol.echo_guard,
            },
            viewport_rows: fc.display.viewport_rows,
        })
    }
}

/// Directory holding `config.toml`: `--config-dir` or `~/.chat-bridge`.
pub fn config_dir(custom_dir: Option<PathBuf>) -> Result<PathBuf> {
    match custom_dir {
        Some(dir) => Ok(dir),
        None => dirs::home_dir()
            .map(|home| home.join(".chat-bridge"))
            .context("Could not find home directory"),
    }
}
