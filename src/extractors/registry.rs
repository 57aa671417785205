//! Ordered extractor dispatch.
//!
//! Extractors are tried strictly in registration order. The first one whose
//! pattern matches gets the URL; it either produces a record, declares a
//! definitive `NoMatch` (dispatch ends, nothing else runs) or fails softly
//! (dispatch continues with the next matching extractor).

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::common::{GameRecord, UrlSpan};
use crate::extractors::{Extraction, Extractor, ExtractorKind, Fetcher};

/// Fixed, ordered list of extractors built at startup.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor>>,
    fetcher: Arc<dyn Fetcher>,
}

impl ExtractorRegistry {
    pub fn new(extractors: Vec<Box<dyn Extractor>>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            extractors,
            fetcher,
        }
    }

    /// Registry of built-in extractors in the given order.
    pub fn from_kinds(kinds: &[ExtractorKind], fetcher: Arc<dyn Fetcher>) -> Self {
        Self::new(kinds.iter().map(|kind| kind.build()).collect(), fetcher)
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Resolve one URL to a record, or `None` if it is skipped.
    pub async fn resolve(&self, span: &UrlSpan) -> Option<GameRecord> {
        let url = span.text.as_str();

        for extractor in &self.extractors {
            if !extractor.matches(url) {
                continue;
            }

            let label = label_for(extractor.as_ref(), span);
            debug!("Trying {} extractor on {}", label, url);

            match extractor.extract(url, self.fetcher.as_ref()).await {
                Extraction::Record(details) => {
                    info!("{} extractor resolved {} to '{}'", label, url, details.title);
                    return Some(GameRecord {
                        title: details.title,
                        description: details.description,
                        source_name: label,
                        source_url: span.text.clone(),
                    });
                }
                Extraction::NoMatch => {
                    info!("{} extractor found no game at {}", label, url);
                    return None;
                }
                Extraction::Error(e) => {
                    warn!("Failed to extract {} with {} extractor: {}", url, label, e);
                }
            }
        }

        debug!("No extractor resolved {}", url);
        None
    }
}

fn label_for(extractor: &dyn Extractor, span: &UrlSpan) -> String {
    extractor
        .name()
        .map(str::to_string)
        .or_else(|| span.host())
        .unwrap_or_else(|| span.text.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::common::error::FetchError;
    use crate::common::GameDetails;
    use crate::extractors::fetch::testing::StubFetcher;

    #[derive(Clone, Copy)]
    enum Outcome {
        Record(&'static str),
        NoMatch,
        Fail,
    }

    /// Extractor with a scripted outcome that counts its invocations.
    struct Scripted {
        name: Option<&'static str>,
        host: Option<&'static str>,
        outcome: Outcome,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn new(name: Option<&'static str>, host: Option<&'static str>, outcome: Outcome) -> Self {
            Self {
                name,
                host,
                outcome,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Extractor for Scripted {
        fn name(&self) -> Option<&str> {
            self.name
        }

        fn matches(&self, url: &str) -> bool {
            self.host.map_or(true, |host| url.contains(host))
        }

        async fn extract(&self, _url: &str, _fetcher: &dyn Fetcher) -> Extraction {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::Record(title) => Extraction::Record(GameDetails::new(title)),
                Outcome::NoMatch => Extraction::NoMatch,
                Outcome::Fail => Extraction::Error(FetchError::Timeout.into()),
            }
        }
    }

    fn span(url: &str) -> UrlSpan {
        UrlSpan {
            text: url.to_string(),
            start: 0,
            end: url.len(),
            scheme: "https".to_string(),
        }
    }

    fn registry(extractors: Vec<Scripted>) -> ExtractorRegistry {
        ExtractorRegistry::new(
            extractors
                .into_iter()
                .map(|e| Box::new(e) as Box<dyn Extractor>)
                .collect(),
            Arc::new(StubFetcher::new()),
        )
    }

    #[tokio::test]
    async fn test_no_match_halts_dispatch() {
        let a = Scripted::new(Some("A"), Some("x.com"), Outcome::NoMatch);
        let b = Scripted::new(Some("B"), None, Outcome::Record("From B"));
        let b_calls = b.calls.clone();
        let registry = registry(vec![a, b]);

        assert_eq!(registry.resolve(&span("https://x.com/game")).await, None);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_matching_url_goes_to_catch_all() {
        let a = Scripted::new(Some("A"), Some("x.com"), Outcome::Record("From A"));
        let a_calls = a.calls.clone();
        let b = Scripted::new(Some("B"), None, Outcome::Record("From B"));
        let registry = registry(vec![a, b]);

        let record = registry.resolve(&span("https://y.com/game")).await.unwrap();
        assert_eq!(record.title, "From B");
        assert_eq!(record.source_name, "B");
        assert_eq!(a_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_soft_failure_continues_to_catch_all() {
        let a = Scripted::new(Some("A"), Some("x.com"), Outcome::Fail);
        let b = Scripted::new(None, None, Outcome::Record("From B"));
        let registry = registry(vec![a, b]);

        let record = registry.resolve(&span("https://x.com/game")).await.unwrap();
        assert_eq!(record.title, "From B");
        // Unnamed extractors are labelled by host
        assert_eq!(record.source_name, "x.com");
        assert_eq!(record.source_url, "https://x.com/game");
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let a = Scripted::new(Some("A"), Some("x.com"), Outcome::Record("From A"));
        let b = Scripted::new(Some("B"), None, Outcome::Record("From B"));
        let b_calls = b.calls.clone();
        let registry = registry(vec![a, b]);

        let record = registry.resolve(&span("https://x.com/game")).await.unwrap();
        assert_eq!(record.title, "From A");
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_failing_is_skipped() {
        let a = Scripted::new(Some("A"), None, Outcome::Fail);
        let b = Scripted::new(Some("B"), None, Outcome::Fail);
        let registry = registry(vec![a, b]);

        assert_eq!(registry.resolve(&span("https://x.com/game")).await, None);
    }

    #[tokio::test]
    async fn test_nothing_matches_is_skipped() {
        let a = Scripted::new(Some("A"), Some("x.com"), Outcome::Record("From A"));
        let registry = registry(vec![a]);

        assert_eq!(registry.resolve(&span("https://y.com/game")).await, None);
    }

    #[test]
    fn test_from_kinds_keeps_order() {
        let registry = ExtractorRegistry::from_kinds(
            &ExtractorKind::DEFAULT_ORDER,
            Arc::new(StubFetcher::new()),
        );
        assert_eq!(registry.len(), 4);
        let names: Vec<Option<&str>> = registry.extractors.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec![Some("Steam"), Some("itch.io"), Some("Epic"), None]);
    }
}
