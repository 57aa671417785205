//! Merging of per-URL records that describe the same game.

use std::collections::HashMap;

use crate::common::{GameRecord, MergedRecord, RecordLink};

/// Group records by exact title, in order of first appearance.
///
/// The first description seen for a title wins; every record contributes one
/// link, in the order its URL was discovered.
pub fn aggregate(records: impl IntoIterator<Item = GameRecord>) -> Vec<MergedRecord> {
    let mut merged: Vec<MergedRecord> = Vec::new();
    let mut by_title: HashMap<String, usize> = HashMap::new();

    for record in records {
        let link = RecordLink {
            label: record.source_name,
            url: record.source_url,
        };

        match by_title.get(&record.title) {
            Some(&index) => {
                let entry = &mut merged[index];
                if entry.description.is_none() {
                    entry.description = record.description;
                }
                entry.links.push(link);
            }
            None => {
                by_title.insert(record.title.clone(), merged.len());
                merged.push(MergedRecord {
                    title: record.title,
                    description: record.description,
                    links: vec![link],
                });
            }
        }
    }

    merged
}
