//! Discord reaction event handling.
//!
//! Turns trigger reactions into pipeline runs that post to the game list
//! channel.

use std::sync::Arc;

use serenity::async_trait;
use serenity::http::Http;
use serenity::model::channel::{Message, Reaction, ReactionType};
use serenity::model::gateway::Ready;
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use tracing::{debug, error, info};

use crate::common::error::SinkError;
use crate::common::{MessageKey, SourceMessage};
use crate::pipeline::{LinkPipeline, PostSink, TriggerEvent, TriggerFilter};

/// Posts composed bodies to one channel.
pub struct ChannelSink {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelSink {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl PostSink for ChannelSink {
    async fn post(&self, body: &str) -> Result<(), SinkError> {
        self.channel_id
            .say(&self.http, body)
            .await
            .map(|_| ())
            .map_err(|e| SinkError::PostFailed {
                message: e.to_string(),
            })
    }
}

/// Discord event handler.
#[derive(Clone)]
pub struct LinkHandler {
    pipeline: Arc<LinkPipeline>,
    filter: TriggerFilter,
    destination: ChannelId,
}

impl LinkHandler {
    pub fn new(pipeline: Arc<LinkPipeline>, filter: TriggerFilter, destination: ChannelId) -> Self {
        Self {
            pipeline,
            filter,
            destination,
        }
    }

    /// Number of users that reacted with `emoji` on `msg`.
    fn reaction_count(msg: &Message, emoji: &ReactionType) -> u64 {
        msg.reactions
            .iter()
            .find(|r| &r.reaction_type == emoji)
            .map(|r| r.count)
            .unwrap_or(1)
    }
}

/// The unicode form of a reaction, if it has one.
fn unicode_emoji(reaction: &ReactionType) -> Option<&str> {
    match reaction {
        ReactionType::Unicode(emoji) => Some(emoji.as_str()),
        _ => None,
    }
}

#[async_trait]
impl EventHandler for LinkHandler {
    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        // Avoid a message fetch for unrelated reactions
        let Some(emoji) = unicode_emoji(&reaction.emoji) else {
            return;
        };
        if !self.filter.is_trigger_emoji(emoji) {
            return;
        }

        let msg = match reaction.message(&ctx).await {
            Ok(msg) => msg,
            Err(e) => {
                error!(
                    "Failed to fetch message {} in channel {}: {}",
                    reaction.message_id, reaction.channel_id, e
                );
                return;
            }
        };

        let key = MessageKey::new(msg.channel_id.get(), msg.id.get());
        let event = TriggerEvent {
            key,
            emoji: emoji.to_string(),
            reaction_count: Self::reaction_count(&msg, &reaction.emoji),
            author_id: msg.author.id.get(),
        };

        let bot_id = ctx.cache.current_user().id.get();
        if let Err(reason) = self.filter.check(&event, bot_id) {
            info!("Ignoring trigger on message {}: {}", key, reason);
            return;
        }

        info!("Trigger on message {} by {}", key, msg.author.name);
        let source = SourceMessage {
            key,
            text: msg.content.clone(),
            author: msg.author.name.clone(),
        };
        let sink = ChannelSink::new(ctx.http.clone(), self.destination);

        match self.pipeline.process(&source, &sink).await {
            Ok(posted) => debug!("Message {} produced {} posts", key, posted.len()),
            Err(e) => error!("Failed to process message {}: {}", key, e),
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);
        info!(
            "Watching for {} reactions, posting to channel {}",
            self.filter.trigger_emoji(),
            self.destination
        );
    }
}
