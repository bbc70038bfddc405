use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;

use chat_bridge::config::{self, ChatConfig, CliOverrides, FileConfig};
use chat_bridge::router::ProtocolVariant;
use chat_bridge::session::{self, SessionEnd};
use chat_bridge::terminal::{self, TerminalView};

#[derive(Parser)]
#[command(name = "chat-bridge")]
#[command(about = "Terminal client for line-based WebSocket chat servers")]
struct Cli {
    /// Absolute WebSocket URL, e.g. ws://localhost:8765
    #[arg(long, conflicts_with = "origin")]
    endpoint: Option<String>,

    /// Origin the chat is served from; the socket URL is derived from it
    #[arg(long)]
    origin: Option<String>,

    /// Identity token sent as the first frame
    #[arg(long)]
    identity: Option<String>,

    /// Wire contract with the server
    #[arg(long, value_enum)]
    variant: Option<ProtocolVariant>,

    /// Directory holding config.toml (defaults to ~/.chat-bridge)
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is the transcript
    let default_directive = if cli.debug {
        "chat_bridge=debug,info"
    } else {
        "chat_bridge=info,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    let config_dir = config::config_dir(cli.config_dir)?;
    let file_config: FileConfig = config::load_config(&config_dir)
        .extract()
        .with_context(|| format!("Failed to load config from {}", config_dir.display()))?;
    let file_config = file_config.apply(CliOverrides {
        endpoint: cli.endpoint,
        origin: cli.origin,
        identity: cli.identity,
        variant: cli.variant,
    });
    let chat_config = ChatConfig::from_file(&file_config)?;

    info!(
        endpoint = %chat_config.endpoint,
        variant = ?chat_config.router.variant,
        "starting chat session"
    );
    eprintln!("[chat-bridge: connecting to {}]", chat_config.endpoint);

    let (mut router, mut events) = session::connect(&chat_config);
    let mut ui = terminal::spawn_stdin_reader();
    let mut view = TerminalView::new(std::io::stdout());

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let end = session::run(&mut router, &mut events, &mut ui, &mut view, shutdown).await?;
    session::wait_for_close(&mut router).await;

    match end {
        SessionEnd::InputClosed => eprintln!("[chat-bridge: input closed]"),
        SessionEnd::Interrupted => eprintln!("\r\n[chat-bridge: interrupted]"),
    }
    Ok(())
}
