//! Shared types used across the application.

use std::fmt;

/// A URL found in a block of text.
///
/// `start`/`end` are byte offsets into the original, unmodified text and
/// cover the URL itself, never the `<`/`>` suppression markers around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub scheme: String,
}

impl UrlSpan {
    /// Host part of the URL, if it parses.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.text)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

/// What an extractor found on a page, before attribution.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GameDetails {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GameDetails {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// Result of one successful extraction, attributed to its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub title: String,
    pub description: Option<String>,
    /// Extractor name, or the URL host for unnamed extractors.
    pub source_name: String,
    pub source_url: String,
}

/// One attributed link of a merged record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLink {
    pub label: String,
    pub url: String,
}

/// All records sharing a title, merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRecord {
    pub title: String,
    pub description: Option<String>,
    pub links: Vec<RecordLink>,
}

/// Identity of a source message on the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageKey {
    pub channel_id: u64,
    pub message_id: u64,
}

impl MessageKey {
    pub fn new(channel_id: u64, message_id: u64) -> Self {
        Self {
            channel_id,
            message_id,
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel_id, self.message_id)
    }
}

/// A message handed to the pipeline by the trigger layer.
#[derive(Debug, Clone)]
pub struct SourceMessage {
    pub key: MessageKey,
    pub text: String,
    /// Display name of the message author, used when quoting.
    pub author: String,
}
