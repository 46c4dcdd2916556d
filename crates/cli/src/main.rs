mod gallery;
mod handler;
mod validate_command;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::bail,
    clap::{Parser, Subcommand},
    editreply_telegram::{TelegramTransport, build_bot, start_polling},
    teloxide::types::BotCommand,
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::handler::GalleryBot;

#[derive(Parser)]
#[command(name = "editreply", about = "Media gallery bot that edits its own messages in place")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery in the current and config directories).
    #[arg(long, global = true, env = "EDITREPLY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Run the bot (default when no subcommand is provided).
    Run,
    /// Check the config file for problems.
    Validate {
        /// Also print informational notes.
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = editreply_config::load(cli.config.as_deref())?;
    if !config.telegram.has_token() {
        bail!(
            "no bot token configured; set telegram.token or {}",
            editreply_config::TOKEN_ENV
        );
    }
    if config.gallery.items.is_empty() {
        warn!("gallery has no items; the bot will only answer with media info");
    }

    let bot = build_bot(&config.telegram)?;
    let transport = TelegramTransport::new(bot.clone(), &config.telegram);
    let handler = Arc::new(GalleryBot::new(transport, config.gallery));

    let cancel = CancellationToken::new();
    let polling = start_polling(
        bot,
        &config.telegram,
        vec![BotCommand::new("start", "Show the gallery")],
        handler,
        cancel.clone(),
    )
    .await?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "failed to listen for ctrl-c");
            }
            info!("shutting down");
        },
        () = cancel.cancelled() => {},
    }

    polling.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "editreply starting");

    match cli.command {
        None | Some(Commands::Run) => run(&cli).await,
        Some(Commands::Validate { verbose }) => {
            validate_command::check(cli.config.as_deref(), verbose)
        },
    }
}
