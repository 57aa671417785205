//! Source-specific extractors that turn a URL into game details.
//!
//! ## Module Structure
//!
//! - `fetch`: the fetch capability and its reqwest implementation
//! - `registry`: ordered dispatch over the registered extractors
//! - `text`: normalization helpers shared by the extractors
//! - `steam`, `itch`, `epic`: storefront extractors
//! - `generic`: catch-all extractor reading `<title>`/`<h1>`

pub mod epic;
pub mod fetch;
pub mod generic;
pub mod itch;
pub mod registry;
pub mod steam;
pub mod text;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use fancy_regex::Regex;
use tracing::warn;

use crate::common::error::{ExtractionError, ExtractionResult};
use crate::common::GameDetails;

pub use fetch::{Fetcher, HttpFetcher};
pub use registry::ExtractorRegistry;

/// Outcome of running one extractor on one URL.
#[derive(Debug)]
pub enum Extraction {
    /// The page describes a game.
    Record(GameDetails),
    /// Right kind of source, but there is no game here. Ends dispatch.
    NoMatch,
    /// Transient or structural failure. Dispatch moves on.
    Error(ExtractionError),
}

impl From<ExtractionResult<Option<GameDetails>>> for Extraction {
    fn from(result: ExtractionResult<Option<GameDetails>>) -> Self {
        match result {
            Ok(Some(details)) => Self::Record(details),
            Ok(None) => Self::NoMatch,
            Err(e) => Self::Error(e),
        }
    }
}

/// A policy that recognizes URLs of one source and extracts game details.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Label used for links; unnamed extractors are labelled by URL host.
    fn name(&self) -> Option<&str>;

    fn matches(&self, url: &str) -> bool;

    async fn extract(&self, url: &str, fetcher: &dyn Fetcher) -> Extraction;
}

/// Built-in extractors, selectable by name in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractorKind {
    Steam,
    Itch,
    Epic,
    Generic,
}

impl ExtractorKind {
    /// Default registration order: storefronts first, catch-all last.
    pub const DEFAULT_ORDER: [ExtractorKind; 4] = [Self::Steam, Self::Itch, Self::Epic, Self::Generic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Steam => "steam",
            Self::Itch => "itch.io",
            Self::Epic => "epic",
            Self::Generic => "generic",
        }
    }

    pub fn build(self) -> Box<dyn Extractor> {
        match self {
            Self::Steam => Box::new(steam::SteamExtractor::new()),
            Self::Itch => Box::new(itch::ItchExtractor::new()),
            Self::Epic => Box::new(epic::EpicExtractor::new()),
            Self::Generic => Box::new(generic::GenericExtractor::new()),
        }
    }
}

impl FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "steam" => Ok(Self::Steam),
            "itch" | "itch.io" => Ok(Self::Itch),
            "epic" => Ok(Self::Epic),
            "generic" => Ok(Self::Generic),
            other => Err(format!("unknown extractor '{}'", other)),
        }
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Match `url` against a URL pattern, treating regex runtime errors as no match.
fn pattern_matches(pattern: &Regex, url: &str) -> bool {
    pattern.is_match(url).unwrap_or_else(|e| {
        warn!("URL pattern error for '{}': {}", url, e);
        false
    })
}
