//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use std::collections::HashSet;

use crate::common::error::ConfigError;
use crate::config::types::Config;
use crate::extractors::ExtractorKind;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Discord
    if config.discord.token.is_empty() {
        errors.push("discord.token is required".to_string());
    }
    if config.discord.token == "YOUR_DISCORD_TOKEN_HERE" {
        errors.push("discord.token has not been configured (still using placeholder)".to_string());
    }
    if config.discord.game_list_channel == 0 {
        errors.push("discord.game_list_channel must be non-zero".to_string());
    }
    if emojis::get(&config.discord.trigger_emoji).is_none() {
        errors.push(format!(
            "discord.trigger_emoji '{}' is not a unicode emoji",
            config.discord.trigger_emoji
        ));
    }

    // Links
    if config.links.max_urls == 0 {
        errors.push("links.max_urls must be at least 1".to_string());
    }
    if config.links.fetch_timeout_secs == 0 {
        errors.push("links.fetch_timeout_secs must be non-zero".to_string());
    }
    validate_extractors(&config.links.extractors, &mut errors);

    // Dedup
    if config.dedup.window_capacity == 0 {
        errors.push("dedup.window_capacity must be at least 1".to_string());
    }
    if emojis::get(&config.dedup.marker_emoji).is_none() {
        errors.push(format!(
            "dedup.marker_emoji '{}' is not a unicode emoji",
            config.dedup.marker_emoji
        ));
    }
    if config.dedup.marker_emoji == config.discord.trigger_emoji {
        errors.push("dedup.marker_emoji must differ from discord.trigger_emoji".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation {
            message: errors.join("\n"),
        })
    }
}

fn validate_extractors(names: &[String], errors: &mut Vec<String>) {
    if names.is_empty() {
        errors.push("links.extractors is empty - no link would ever resolve".to_string());
        return;
    }

    let mut seen = HashSet::new();
    for (i, name) in names.iter().enumerate() {
        match name.parse::<ExtractorKind>() {
            Ok(kind) => {
                if !seen.insert(kind) {
                    errors.push(format!("links.extractors[{}] '{}' is listed twice", i, name));
                }
                if kind == ExtractorKind::Generic && i + 1 != names.len() {
                    errors.push(format!(
                        "links.extractors[{}] 'generic' must be last (it matches every URL)",
                        i
                    ));
                }
            }
            Err(e) => errors.push(format!("links.extractors[{}]: {}", i, e)),
        }
    }
}
