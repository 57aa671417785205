//! Gamelist - Discord game list bot
//!
//! Watches for a trigger reaction on messages, resolves the game links in
//! them to titles and descriptions and posts the results to a game list
//! channel.

mod common;
mod config;
mod discord;
mod export;
mod extractors;
mod links;
mod pipeline;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serenity::model::id::ChannelId;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info};

use config::{get_config_path, load_and_validate, Config, DedupPolicy};
use discord::{shared_http, DiscordBot, LinkHandler, ReactionMarkerStore};
use extractors::fetch::HttpFetcher;
use extractors::ExtractorRegistry;
use links::UrlDetector;
use pipeline::formatter::format_footer;
use pipeline::{LinkPipeline, MarkerGuard, ProcessingGuard, RecencyWindow, TriggerFilter};

#[derive(Debug, Parser)]
#[command(name = "gamelist", version, about = "Discord game list bot")]
struct Cli {
    /// Config file (defaults to $GAMELIST_CONFIG or gamelist.conf)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the bot (default).
    Run,
    /// Resolve the links of a JSON message dump offline.
    Export {
        /// JSON array of {id, content, authorUsername} messages.
        input: PathBuf,
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout is reserved for export output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Gamelist v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(get_config_path()));

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let config = load_and_validate(&config_path).map_err(|e| {
                error!("Failed to load configuration: {}", e);
                error!("Please ensure {} is properly formatted.", config_path.display());
                e
            })?;
            run_bot(config).await
        }
        Command::Export { input, output } => {
            // No Discord credentials needed here
            let config = if config_path.exists() {
                config::load_config(&config_path)?
            } else {
                Config::default()
            };
            let detector = UrlDetector::new(config.links.max_urls, config.links.ignored_hosts.clone()).uncapped();
            let registry = build_registry(&config)?;
            let count = export::run_export(&input, output.as_deref(), &detector, &registry).await?;
            info!("Exported {} entries", count);
            Ok(())
        }
    }
}

fn build_registry(config: &Config) -> Result<ExtractorRegistry> {
    let kinds = config.links.extractor_kinds().map_err(anyhow::Error::msg)?;
    let fetcher = HttpFetcher::new(
        Duration::from_secs(config.links.fetch_timeout_secs),
        config.links.fetch_retries,
    )?;
    let registry = ExtractorRegistry::from_kinds(&kinds, Arc::new(fetcher));
    if registry.is_empty() {
        anyhow::bail!("No extractors configured");
    }
    debug!("Registered {} extractors", registry.len());
    Ok(registry)
}

fn build_guard(config: &Config) -> Result<Arc<dyn ProcessingGuard>> {
    let guard: Arc<dyn ProcessingGuard> = match config.dedup.policy {
        DedupPolicy::Window => Arc::new(RecencyWindow::new(config.dedup.window_capacity)),
        DedupPolicy::Marker => {
            let store = ReactionMarkerStore::new(
                shared_http(&config.discord.token)?,
                config.dedup.marker_emoji.clone(),
            );
            Arc::new(MarkerGuard::new(Arc::new(store)))
        }
    };
    Ok(guard)
}

async fn run_bot(config: Config) -> Result<()> {
    info!("Configuration loaded successfully");
    info!("  Game list channel: {}", config.discord.game_list_channel);
    info!("  Trigger emoji: {}", config.discord.trigger_emoji);
    info!("  Extractors: {}", config.links.extractors.join(", "));
    info!("  Dedup policy: {}", config.dedup.policy);

    let detector = UrlDetector::new(config.links.max_urls, config.links.ignored_hosts.clone());
    let footer = config
        .discord
        .footer
        .as_deref()
        .map(|format| format_footer(format, &config.discord.trigger_emoji));
    let pipeline = LinkPipeline::new(detector, build_registry(&config)?, build_guard(&config)?)
        .with_footer(footer);

    let filter = TriggerFilter::new(
        config.discord.trigger_emoji.clone(),
        config.discord.game_list_channel,
    );
    let handler = LinkHandler::new(
        Arc::new(pipeline),
        filter,
        ChannelId::new(config.discord.game_list_channel),
    );

    let bot = DiscordBot::new(config.discord.token.clone(), handler).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    info!("Starting Discord bot...");
    let mut discord_task = tokio::spawn(bot.run(shutdown_rx));

    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            true
        }
        _ = &mut discord_task => false,
    };

    if shutdown {
        if let Err(e) = shutdown_tx.send(true) {
            debug!("Shutdown channel closed (Discord task already exited): {}", e);
        }
        match tokio::time::timeout(Duration::from_secs(5), discord_task).await {
            Ok(Ok(())) => info!("Discord client stopped gracefully"),
            Ok(Err(e)) => error!("Discord task panicked: {}", e),
            Err(_) => error!("Discord shutdown timed out"),
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
