//! Post formatting for the game list channel.
//!
//! A post is the bold title, a context block (the extractor description, or
//! a quote of the original message) and one `label: url` line per link. Only
//! the first link keeps its preview; Discord shows one embed per post.

use crate::common::{MergedRecord, SourceMessage};
use crate::links::suppress_previews;

/// Default footer posted after a batch of records. Supports `%emoji`.
pub const DEFAULT_FOOTER_FORMAT: &str =
    "ℹ️ React to links in other channels with the %emoji emoji to add them to this list";

/// Block-quote `body`, attributed to `author`.
///
/// The `@` is escaped so the quote never pings anyone.
pub fn quote(author: &str, body: &str) -> String {
    let quoted = body
        .split('\n')
        .map(|line| format!("> {}", line))
        .collect::<Vec<_>>()
        .join("\n");

    format!("\\@{} said:\n{}", author, quoted)
}

/// Compose the post for one merged record.
pub fn compose_post(record: &MergedRecord, message: &SourceMessage) -> String {
    let context = match &record.description {
        Some(description) => description.clone(),
        None => quote(&message.author, &message.text),
    };

    let links = record
        .links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            if i == 0 {
                format!("{}: {}", link.label, link.url)
            } else {
                format!("{}: <{}>", link.label, link.url)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "**{}**\n{}\n\n{}",
        record.title,
        suppress_previews(&context),
        links
    )
}

/// Substitute the trigger emoji into a footer format string.
pub fn format_footer(format: &str, emoji: &str) -> String {
    format.replace("%emoji", emoji)
}
