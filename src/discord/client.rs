//! Discord bot client.
//!
//! Builds the serenity client around a [`LinkHandler`] and keeps it
//! connected until shutdown is signalled.

use std::sync::Arc;
use std::time::Duration;

use backon::BackoffBuilder;
use serenity::http::{Http, HttpBuilder};
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::discord::handler::LinkHandler;

const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(300);

/// Gateway intents the link handler depends on.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT
}

/// Serenity HTTP client with our timeout settings.
pub fn build_http(token: &str) -> anyhow::Result<Http> {
    let reqwest_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    Ok(HttpBuilder::new(token).client(reqwest_client).build())
}

async fn build_client(token: &str, handler: LinkHandler) -> anyhow::Result<Client> {
    let client = serenity::client::ClientBuilder::new_with_http(build_http(token)?, intents())
        .event_handler(handler)
        .await?;
    Ok(client)
}

/// Exponential backoff for rebuilding the client.
/// 5s initial, 5min max, factor 1.1, with jitter, unlimited retries.
fn discord_backoff() -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(5))
        .with_max_delay(MAX_RECONNECT_DELAY)
        .with_factor(1.1)
        .with_jitter()
        .without_max_times()
        .build()
}

pub struct DiscordBot {
    client: Option<Client>,
    token: String,
    handler: LinkHandler,
}

impl DiscordBot {
    pub async fn new(token: String, handler: LinkHandler) -> anyhow::Result<Self> {
        let client = build_client(&token, handler.clone()).await?;
        Ok(Self {
            client: Some(client),
            token,
            handler,
        })
    }

    /// Run until the gateway closes normally or `shutdown_rx` flips to true.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        let shard_manager = self.client.as_ref().map(|c| c.shard_manager.clone());

        tokio::select! {
            _ = Self::run_connection(&mut self.client, &self.token, &self.handler) => {},
            _ = async {
                loop {
                    if shutdown_rx.changed().await.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                if let Some(ref manager) = shard_manager {
                    info!("Initiating graceful Discord shutdown...");
                    manager.shutdown_all().await;
                    info!("Discord shutdown complete");
                }
            } => {}
        }
        info!("Discord task ended");
    }

    async fn run_connection(client: &mut Option<Client>, token: &str, handler: &LinkHandler) {
        let mut backoff = discord_backoff();

        loop {
            info!("Connecting to Discord...");

            let mut client = match client.take() {
                Some(client) => client,
                None => match build_client(token, handler.clone()).await {
                    Ok(client) => {
                        backoff = discord_backoff();
                        client
                    }
                    Err(e) => {
                        error!("Failed to rebuild Discord client: {}", e);
                        let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
                        warn!("Retrying in {:.1}s...", delay.as_secs_f64());
                        sleep(delay).await;
                        continue;
                    }
                },
            };

            match client.start().await {
                Ok(()) => {
                    info!("Discord client disconnected normally");
                    break;
                }
                Err(e) => {
                    error!("Discord client error: {}", e);
                    let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
                    warn!(
                        "Discord disconnected. Reconnecting in {:.1}s...",
                        delay.as_secs_f64(),
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Shared HTTP handle for components that talk to Discord outside events.
pub fn shared_http(token: &str) -> anyhow::Result<Arc<Http>> {
    Ok(Arc::new(build_http(token)?))
}
