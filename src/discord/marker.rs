//! Durable processed-markers stored as bot reactions on source messages.

use std::sync::Arc;

use serenity::async_trait;
use serenity::http::Http;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, MessageId};

use crate::common::error::GuardError;
use crate::common::MessageKey;
use crate::pipeline::MarkerStore;

/// A message is marked when the bot itself has reacted with the marker emoji.
pub struct ReactionMarkerStore {
    http: Arc<Http>,
    marker: ReactionType,
}

impl ReactionMarkerStore {
    pub fn new(http: Arc<Http>, marker_emoji: impl Into<String>) -> Self {
        Self {
            http,
            marker: ReactionType::Unicode(marker_emoji.into()),
        }
    }

    fn ids(key: MessageKey) -> (ChannelId, MessageId) {
        (ChannelId::new(key.channel_id), MessageId::new(key.message_id))
    }
}

fn unavailable(e: serenity::Error) -> GuardError {
    GuardError::Unavailable {
        message: e.to_string(),
    }
}

#[async_trait]
impl MarkerStore for ReactionMarkerStore {
    async fn has_marker(&self, key: MessageKey) -> Result<bool, GuardError> {
        let (channel_id, message_id) = Self::ids(key);
        let msg = self
            .http
            .get_message(channel_id, message_id)
            .await
            .map_err(unavailable)?;

        Ok(msg
            .reactions
            .iter()
            .any(|r| r.me && r.reaction_type == self.marker))
    }

    async fn add_marker(&self, key: MessageKey) -> Result<(), GuardError> {
        let (channel_id, message_id) = Self::ids(key);
        self.http
            .create_reaction(channel_id, message_id, &self.marker)
            .await
            .map_err(unavailable)
    }
}
