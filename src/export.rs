//! Offline export of a message-history dump.
//!
//! Reads a JSON array of messages, resolves the first link of each through
//! the extractor chain and writes one entry per message that had links.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::common::GameDetails;
use crate::extractors::ExtractorRegistry;
use crate::links::UrlDetector;

/// One message of the input dump.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMessage {
    pub id: String,
    pub content: String,
    pub author_username: String,
}

/// One output entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntry {
    /// Details resolved from the first URL, `null` when nothing resolved.
    pub game_details: Option<GameDetails>,
    pub message_id: String,
    pub author_username: String,
    pub urls: Vec<String>,
}

/// Build entries for `messages`, in input order.
pub async fn export_entries(
    messages: &[ExportMessage],
    detector: &UrlDetector,
    registry: &ExtractorRegistry,
) -> Vec<ExportEntry> {
    let mut entries = Vec::new();

    for message in messages {
        debug!("Processing message {}", message.id);
        let spans = detector.detect(&message.content);
        let Some(first) = spans.first() else {
            continue;
        };

        let game_details = registry
            .resolve(first)
            .await
            .map(|record| GameDetails::new(record.title).with_description(record.description));

        entries.push(ExportEntry {
            game_details,
            message_id: message.id.clone(),
            author_username: message.author_username.clone(),
            urls: spans.into_iter().map(|span| span.text).collect(),
        });
    }

    entries
}

/// Read `input`, export it and write pretty JSON to `output` (stdout if `None`).
pub async fn run_export(
    input: &Path,
    output: Option<&Path>,
    detector: &UrlDetector,
    registry: &ExtractorRegistry,
) -> Result<usize> {
    let raw = fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let messages: Vec<ExportMessage> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of messages", input.display()))?;

    info!("Exporting {} messages from {}", messages.len(), input.display());
    let entries = export_entries(&messages, detector, registry).await;
    let json = serde_json::to_string_pretty(&entries)?;

    match output {
        Some(path) => {
            fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} entries to {}", entries.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::common::error::FetchError;
    use crate::extractors::fetch::testing::StubFetcher;
    use crate::extractors::ExtractorKind;

    fn message(id: &str, content: &str) -> ExportMessage {
        ExportMessage {
            id: id.to_string(),
            content: content.to_string(),
            author_username: "alice".to_string(),
        }
    }

    fn registry(fetcher: StubFetcher) -> ExtractorRegistry {
        ExtractorRegistry::from_kinds(&ExtractorKind::DEFAULT_ORDER, Arc::new(fetcher))
    }

    #[tokio::test]
    async fn test_run_export_writes_pretty_json_file() {
        let dir = std::env::temp_dir().join(format!("gamelist-export-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let input = dir.join("messages.json");
        let output = dir.join("entries.json");
        tokio::fs::write(
            &input,
            r#"[{"id": "5", "content": "https://a.example.com/", "authorUsername": "bob"}]"#,
        )
        .await
        .unwrap();

        let fetcher = StubFetcher::new().page("https://a.example.com/", "<title>First</title>");
        let count = run_export(
            &input,
            Some(&output),
            &UrlDetector::default().uncapped(),
            &registry(fetcher),
        )
        .await
        .unwrap();

        let written = tokio::fs::read_to_string(&output).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(count, 1);
        assert_eq!(json[0]["gameDetails"]["title"], "First");
        assert_eq!(json[0]["authorUsername"], "bob");
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_run_export_missing_input_is_error() {
        let result = run_export(
            Path::new("/nonexistent/messages.json"),
            None,
            &UrlDetector::default(),
            &registry(StubFetcher::new()),
        )
        .await;
        assert!(result.unwrap_err().to_string().contains("Failed to read"));
    }

    #[test]
    fn test_input_uses_camel_case() {
        let messages: Vec<ExportMessage> = serde_json::from_str(
            r#"[{"id": "1", "content": "hi", "authorUsername": "bob"}]"#,
        )
        .unwrap();
        assert_eq!(messages[0].author_username, "bob");
    }

    #[tokio::test]
    async fn test_only_first_url_is_resolved() {
        let fetcher = StubFetcher::new()
            .page("https://a.example.com/", "<title>First</title>")
            .page("https://b.example.com/", "<title>Second</title>");
        let detector = UrlDetector::new(1, vec!["discord.com".to_string()]).uncapped();
        let messages = vec![
            message("1", "https://discord.com/channels/1 https://a.example.com/ https://b.example.com/ https://a.example.com/"),
            message("2", "no links"),
        ];

        let entries = export_entries(&messages, &detector, &registry(fetcher)).await;

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message_id, "1");
        assert_eq!(entries[0].game_details.as_ref().unwrap().title, "First");
        assert_eq!(
            entries[0].urls,
            vec!["https://a.example.com/", "https://b.example.com/"]
        );
    }

    #[tokio::test]
    async fn test_unresolved_entry_serializes_null_details() {
        let fetcher = StubFetcher::new().failing("https://down.example.com/", FetchError::Timeout);
        let detector = UrlDetector::default().uncapped();

        let entries = export_entries(
            &[message("9", "https://down.example.com/")],
            &detector,
            &registry(fetcher),
        )
        .await;

        let json = serde_json::to_value(&entries).unwrap();
        assert!(json[0]["gameDetails"].is_null());
        assert_eq!(json[0]["messageId"], "9");
        assert_eq!(json[0]["authorUsername"], "alice");
    }
}
