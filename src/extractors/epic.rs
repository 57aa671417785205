//! Epic Games Store product page extractor.

use std::sync::LazyLock;

use async_trait::async_trait;
use fancy_regex::Regex;
use scraper::{Html, Selector};

use crate::common::error::{ExtractionError, ExtractionResult};
use crate::common::GameDetails;
use crate::extractors::text::select_first_line;
use crate::extractors::{pattern_matches, Extraction, Extractor, Fetcher};

static STORE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://www\.epicgames\.com/store/[^\s]+").unwrap());

static TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"[data-component="TitleSectionLayout"] [data-component="PDPTitleHeader"]"#,
    )
    .unwrap()
});

static ABOUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[data-component="AboutSectionLayout"]"#).unwrap());

pub struct EpicExtractor;

impl EpicExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EpicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_product_page(html: &str) -> ExtractionResult<Option<GameDetails>> {
    let document = Html::parse_document(html);

    let title = select_first_line(&document, &TITLE)
        .flatten()
        .ok_or_else(|| ExtractionError::missing("product title header"))?;

    let description = select_first_line(&document, &ABOUT)
        .ok_or_else(|| ExtractionError::missing("about section"))?;

    Ok(Some(GameDetails::new(title).with_description(description)))
}

#[async_trait]
impl Extractor for EpicExtractor {
    fn name(&self) -> Option<&str> {
        Some("Epic")
    }

    fn matches(&self, url: &str) -> bool {
        pattern_matches(&STORE_URL, url)
    }

    async fn extract(&self, url: &str, fetcher: &dyn Fetcher) -> Extraction {
        match fetcher.fetch_text(url).await {
            Ok(body) => parse_product_page(&body).into(),
            Err(e) => Extraction::Error(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::fetch::testing::StubFetcher;

    const PRODUCT: &str = "https://www.epicgames.com/store/en-US/p/hades";

    const PAGE: &str = r#"<html><body>
        <div data-component="TitleSectionLayout">
            <h1 data-component="PDPTitleHeader"><span>Hades</span></h1>
        </div>
        <div data-component="AboutSectionLayout">
            <div><p>Defy the god of the dead.</p><p>Hades is a rogue-like.</p></div>
        </div>
    </body></html>"#;

    #[test]
    fn test_matches_store_urls() {
        let epic = EpicExtractor::new();
        assert!(epic.matches(PRODUCT));
        assert!(!epic.matches("https://store.epicgames.com/en-US/p/hades"));
        assert!(!epic.matches("https://www.epicgames.com/fortnite"));
    }

    #[tokio::test]
    async fn test_extracts_title_and_about_first_line() {
        let fetcher = StubFetcher::new().page(PRODUCT, PAGE);

        match EpicExtractor::new().extract(PRODUCT, &fetcher).await {
            Extraction::Record(details) => {
                assert_eq!(details.title, "Hades");
                assert_eq!(details.description.as_deref(), Some("Defy the god of the dead."));
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_title_outside_title_section_is_error() {
        let fetcher = StubFetcher::new().page(
            PRODUCT,
            r#"<h1 data-component="PDPTitleHeader">Hades</h1>
               <div data-component="AboutSectionLayout">About</div>"#,
        );

        let outcome = EpicExtractor::new().extract(PRODUCT, &fetcher).await;
        assert!(matches!(outcome, Extraction::Error(_)));
    }

    #[tokio::test]
    async fn test_missing_about_section_is_error() {
        let fetcher = StubFetcher::new().page(
            PRODUCT,
            r#"<div data-component="TitleSectionLayout">
                   <h1 data-component="PDPTitleHeader">Hades</h1>
               </div>"#,
        );

        let outcome = EpicExtractor::new().extract(PRODUCT, &fetcher).await;
        assert!(matches!(
            outcome,
            Extraction::Error(ExtractionError::MissingStructure { ref what }) if what == "about section"
        ));
    }
}
