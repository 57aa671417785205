//! itch.io game page extractor.

use std::sync::LazyLock;

use async_trait::async_trait;
use fancy_regex::Regex;
use scraper::{Html, Selector};

use crate::common::error::{ExtractionError, ExtractionResult};
use crate::common::GameDetails;
use crate::extractors::text::select_first_line;
use crate::extractors::{pattern_matches, Extraction, Extractor, Fetcher};

static GAME_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://[^\s/]+\.itch\.io/[^\s]+").unwrap());

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".game_title").unwrap());

static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".formatted_description").unwrap());

pub struct ItchExtractor;

impl ItchExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ItchExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_game_page(html: &str) -> ExtractionResult<Option<GameDetails>> {
    let document = Html::parse_document(html);

    let title = select_first_line(&document, &TITLE)
        .flatten()
        .ok_or_else(|| ExtractionError::missing("game title"))?;

    // The description is a long-form about block; keep its first line only
    let description = select_first_line(&document, &DESCRIPTION).flatten();

    Ok(Some(GameDetails::new(title).with_description(description)))
}

#[async_trait]
impl Extractor for ItchExtractor {
    fn name(&self) -> Option<&str> {
        Some("itch.io")
    }

    fn matches(&self, url: &str) -> bool {
        pattern_matches(&GAME_URL, url)
    }

    async fn extract(&self, url: &str, fetcher: &dyn Fetcher) -> Extraction {
        match fetcher.fetch_text(url).await {
            Ok(body) => parse_game_page(&body).into(),
            Err(e) => Extraction::Error(e.into()),
        }
    }
}
