//! Steam store extractor, backed by the public appdetails API.

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use fancy_regex::Regex;
use serde::Deserialize;

use crate::common::error::{ExtractionError, ExtractionResult};
use crate::common::GameDetails;
use crate::extractors::text::{decode_entities, non_empty};
use crate::extractors::{pattern_matches, Extraction, Extractor, Fetcher};

static APP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://store\.steampowered\.com/app/(?P<app_id>[^\s/?#]+)").unwrap()
});

const API_BASE: &str = "https://store.steampowered.com/api/appdetails";

#[derive(Debug, Deserialize)]
struct AppDetailsEntry {
    success: bool,
    data: Option<AppData>,
}

#[derive(Debug, Deserialize)]
struct AppData {
    name: String,
    #[serde(default)]
    short_description: Option<String>,
}

pub struct SteamExtractor;

impl SteamExtractor {
    pub fn new() -> Self {
        Self
    }

    fn app_id(url: &str) -> Option<String> {
        APP_URL
            .captures(url)
            .ok()
            .flatten()
            .and_then(|caps| caps.name("app_id").map(|m| m.as_str().to_string()))
    }

    async fn scrape(&self, url: &str, fetcher: &dyn Fetcher) -> ExtractionResult<Option<GameDetails>> {
        let app_id = Self::app_id(url).ok_or_else(|| ExtractionError::missing("app id in URL"))?;

        let body = fetcher
            .fetch_text(&format!("{}?appids={}", API_BASE, app_id))
            .await?;

        parse_app_details(&app_id, &body)
    }
}

impl Default for SteamExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an appdetails response; an unknown app is a definitive no-match.
fn parse_app_details(app_id: &str, body: &str) -> ExtractionResult<Option<GameDetails>> {
    let mut entries: HashMap<String, AppDetailsEntry> = serde_json::from_str(body)?;

    let entry = entries
        .remove(app_id)
        .ok_or_else(|| ExtractionError::missing(format!("entry for app {}", app_id)))?;

    if !entry.success {
        return Ok(None);
    }

    let data = entry
        .data
        .ok_or_else(|| ExtractionError::missing("app data"))?;

    let title = non_empty(&decode_entities(&data.name))
        .ok_or_else(|| ExtractionError::missing("app name"))?;

    let description = data
        .short_description
        .and_then(|d| non_empty(&decode_entities(&d)));

    Ok(Some(GameDetails::new(title).with_description(description)))
}

#[async_trait]
impl Extractor for SteamExtractor {
    fn name(&self) -> Option<&str> {
        Some("Steam")
    }

    fn matches(&self, url: &str) -> bool {
        pattern_matches(&APP_URL, url)
    }

    async fn extract(&self, url: &str, fetcher: &dyn Fetcher) -> Extraction {
        self.scrape(url, fetcher).await.into()
    }
}
