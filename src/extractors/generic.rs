//! Catch-all extractor: the page title, or failing that its first heading.

use std::sync::LazyLock;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::common::GameDetails;
use crate::extractors::text::select_first_line;
use crate::extractors::{Extraction, Extractor, Fetcher};

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());

pub struct GenericExtractor;

impl GenericExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GenericExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn find_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    select_first_line(&document, &TITLE)
        .flatten()
        .or_else(|| select_first_line(&document, &HEADING).flatten())
}

#[async_trait]
impl Extractor for GenericExtractor {
    /// Unnamed, so its links are labelled by host.
    fn name(&self) -> Option<&str> {
        None
    }

    fn matches(&self, _url: &str) -> bool {
        true
    }

    async fn extract(&self, url: &str, fetcher: &dyn Fetcher) -> Extraction {
        match fetcher.fetch_text(url).await {
            Ok(body) => match find_title(&body) {
                Some(title) => Extraction::Record(GameDetails::new(title)),
                None => Extraction::NoMatch,
            },
            Err(e) => Extraction::Error(e.into()),
        }
    }
}
