//! URL detection in free-form message text.
//!
//! Finds absolute http(s) URLs, including ones wrapped in `<...>` preview
//! suppression markers, and reports their byte offsets in the original text.

use std::collections::HashSet;
use std::sync::LazyLock;

use fancy_regex::Regex;
use tracing::{debug, warn};
use url::Url;

use crate::common::UrlSpan;

/// Default cap on URLs taken from one message.
pub const DEFAULT_MAX_URLS: usize = 5;

/// Scheme, then everything up to whitespace, a quote or a suppression marker.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bhttps?://[^\s<>"]+"#).unwrap());

/// Characters that end a sentence or markup rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '*', '~', '|'];

/// Scan `text` for every URL occurrence, in order of appearance.
///
/// No deduplication and no cap: the preview suppressor needs every span.
pub fn scan(text: &str) -> Vec<UrlSpan> {
    let mut spans = Vec::new();

    for found in URL_PATTERN.find_iter(text) {
        let found = match found {
            Ok(found) => found,
            Err(e) => {
                warn!("URL scan aborted: {}", e);
                break;
            }
        };

        // Inside `<...>` the markers bound the URL, punctuation included
        let candidate = if is_bracketed(text, found.start(), found.end()) {
            found.as_str()
        } else {
            trim_trailing(found.as_str())
        };
        let Some(scheme) = absolute_http_scheme(candidate) else {
            debug!("Ignoring URL-like text '{}'", found.as_str());
            continue;
        };

        let start = found.start();
        spans.push(UrlSpan {
            text: candidate.to_string(),
            start,
            end: start + candidate.len(),
            scheme,
        });
    }

    spans
}

fn is_bracketed(text: &str, start: usize, end: usize) -> bool {
    start > 0 && text[..start].ends_with('<') && text[end..].starts_with('>')
}

/// Strip sentence punctuation and unbalanced closing brackets off the end.
fn trim_trailing(candidate: &str) -> &str {
    let mut end = candidate.len();

    loop {
        let current = &candidate[..end];
        let Some(last) = current.chars().next_back() else {
            break;
        };

        let strip = match last {
            ')' => current.matches(')').count() > current.matches('(').count(),
            ']' => current.matches(']').count() > current.matches('[').count(),
            c => TRAILING_PUNCTUATION.contains(&c),
        };

        if !strip {
            break;
        }
        end -= last.len_utf8();
    }

    &candidate[..end]
}

/// The lowercase scheme if `candidate` is an absolute http(s) URL with a host.
fn absolute_http_scheme(candidate: &str) -> Option<String> {
    let url = Url::parse(candidate).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some_and(|h| !h.is_empty()) => {
            Some(url.scheme().to_string())
        }
        _ => None,
    }
}

/// URL extractor applied to incoming messages.
#[derive(Debug, Clone)]
pub struct UrlDetector {
    /// Maximum URLs returned per message, applied after deduplication.
    max_urls: usize,
    /// Hosts (and their subdomains) whose links are never processed.
    ignored_hosts: Vec<String>,
}

impl Default for UrlDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_URLS, Vec::new())
    }
}

impl UrlDetector {
    pub fn new(max_urls: usize, ignored_hosts: Vec<String>) -> Self {
        Self {
            max_urls,
            ignored_hosts: ignored_hosts
                .into_iter()
                .map(|h| h.to_lowercase())
                .collect(),
        }
    }

    /// Same detector without the per-message cap.
    pub fn uncapped(&self) -> Self {
        Self {
            max_urls: usize::MAX,
            ignored_hosts: self.ignored_hosts.clone(),
        }
    }

    /// Ordered, deduplicated, capped URLs of `text`.
    pub fn detect(&self, text: &str) -> Vec<UrlSpan> {
        let mut seen = HashSet::new();

        scan(text)
            .into_iter()
            .filter(|span| !self.is_ignored(span))
            .filter(|span| seen.insert(span.text.clone()))
            .take(self.max_urls)
            .collect()
    }

    fn is_ignored(&self, span: &UrlSpan) -> bool {
        let Some(host) = span.host() else {
            return false;
        };

        self.ignored_hosts
            .iter()
            .any(|ignored| host == *ignored || host.ends_with(&format!(".{}", ignored)))
    }
}
