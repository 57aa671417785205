//! Common utilities and types shared across the application.

pub mod error;
pub mod types;

pub use types::{
    GameDetails, GameRecord, MergedRecord, MessageKey, RecordLink, SourceMessage, UrlSpan,
};
