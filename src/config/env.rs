//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `GAMELIST_DISCORD_TOKEN` - Discord bot token
//! - `GAMELIST_GAME_LIST_CHANNEL` - Destination channel id
//! - `GAMELIST_TRIGGER_EMOJI` - Trigger reaction
//! - `GAMELIST_DEDUP_POLICY` - `window` or `marker`

use std::env;

use tracing::warn;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "GAMELIST";

/// Apply environment variable overrides to a config.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |name| env::var(name).ok())
}

/// Apply overrides using `lookup` to resolve variable names.
pub(crate) fn apply_overrides_from<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| lookup(&format!("{}_{}", ENV_PREFIX, suffix));

    if let Some(token) = var("DISCORD_TOKEN") {
        config.discord.token = token;
    }

    if let Some(channel) = var("GAME_LIST_CHANNEL") {
        match channel.trim().parse() {
            Ok(id) => config.discord.game_list_channel = id,
            Err(_) => warn!("Ignoring {}_GAME_LIST_CHANNEL: '{}' is not a channel id", ENV_PREFIX, channel),
        }
    }

    if let Some(emoji) = var("TRIGGER_EMOJI") {
        config.discord.trigger_emoji = emoji;
    }

    if let Some(policy) = var("DEDUP_POLICY") {
        match policy.parse() {
            Ok(policy) => config.dedup.policy = policy,
            Err(e) => warn!("Ignoring {}_DEDUP_POLICY: {}", ENV_PREFIX, e),
        }
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `GAMELIST_CONFIG` environment variable, otherwise returns "gamelist.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "gamelist.conf".to_string())
}
