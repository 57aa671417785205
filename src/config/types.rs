//! Configuration type definitions.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::extractors::ExtractorKind;
use crate::links::detector::DEFAULT_MAX_URLS;
use crate::pipeline::formatter::DEFAULT_FOOTER_FORMAT;
use crate::pipeline::guard::DEFAULT_WINDOW_CAPACITY;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub token: String,
    /// Channel the game list is posted to.
    #[serde(default)]
    pub game_list_channel: u64,
    /// Reaction that asks the bot to process a message.
    #[serde(default = "default_trigger_emoji")]
    pub trigger_emoji: String,
    /// Line posted after each batch of records; `%emoji` is substituted.
    #[serde(default = "default_footer")]
    pub footer: Option<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            game_list_channel: 0,
            trigger_emoji: default_trigger_emoji(),
            footer: default_footer(),
        }
    }
}

/// Link detection and extraction settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LinksConfig {
    #[serde(default = "default_max_urls")]
    pub max_urls: usize,
    #[serde(default = "default_ignored_hosts")]
    pub ignored_hosts: Vec<String>,
    /// Extractor names in dispatch order.
    #[serde(default = "default_extractors")]
    pub extractors: Vec<String>,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: usize,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            max_urls: default_max_urls(),
            ignored_hosts: default_ignored_hosts(),
            extractors: default_extractors(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            fetch_retries: default_fetch_retries(),
        }
    }
}

impl LinksConfig {
    /// Parse the configured extractor names, in order.
    pub fn extractor_kinds(&self) -> Result<Vec<ExtractorKind>, String> {
        self.extractors.iter().map(|name| name.parse()).collect()
    }
}

/// How processed messages are remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    /// Bounded in-memory window, lost on restart.
    Window,
    /// Reaction marker on the source message.
    Marker,
}

impl FromStr for DedupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "window" => Ok(Self::Window),
            "marker" => Ok(Self::Marker),
            other => Err(format!("unknown dedup policy '{}'", other)),
        }
    }
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Window => write!(f, "window"),
            Self::Marker => write!(f, "marker"),
        }
    }
}

/// Idempotency settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DedupConfig {
    #[serde(default = "default_policy")]
    pub policy: DedupPolicy,
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
    #[serde(default = "default_marker_emoji")]
    pub marker_emoji: String,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            window_capacity: default_window_capacity(),
            marker_emoji: default_marker_emoji(),
        }
    }
}

fn default_trigger_emoji() -> String {
    "🔗".to_string()
}

fn default_footer() -> Option<String> {
    Some(DEFAULT_FOOTER_FORMAT.to_string())
}

fn default_max_urls() -> usize {
    DEFAULT_MAX_URLS
}

fn default_ignored_hosts() -> Vec<String> {
    vec!["discord.com".to_string()]
}

fn default_extractors() -> Vec<String> {
    ExtractorKind::DEFAULT_ORDER
        .iter()
        .map(|kind| kind.as_str().to_string())
        .collect()
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

fn default_fetch_retries() -> usize {
    2
}

fn default_policy() -> DedupPolicy {
    DedupPolicy::Window
}

fn default_window_capacity() -> usize {
    DEFAULT_WINDOW_CAPACITY
}

fn default_marker_emoji() -> String {
    "✅".to_string()
}
