//! Precondition checks on incoming reaction triggers.
//!
//! A failed check is not an error: the trigger is simply ignored.

use std::fmt;

use crate::common::MessageKey;

/// What the trigger layer knows about a reaction event.
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    pub key: MessageKey,
    pub emoji: String,
    /// Users that have reacted with this emoji so far, including this one.
    pub reaction_count: u64,
    pub author_id: u64,
}

/// Why a trigger was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    WrongEmoji,
    NotFirstTrigger { count: u64 },
    DestinationChannel,
    OwnMessage,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongEmoji => write!(f, "not the trigger emoji"),
            Self::NotFirstTrigger { count } => {
                write!(f, "not the first trigger reaction on this message ({} so far)", count)
            }
            Self::DestinationChannel => write!(f, "message is in the game list channel"),
            Self::OwnMessage => write!(f, "message was posted by this bot"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TriggerFilter {
    trigger_emoji: String,
    destination_channel: u64,
}

impl TriggerFilter {
    pub fn new(trigger_emoji: impl Into<String>, destination_channel: u64) -> Self {
        Self {
            trigger_emoji: trigger_emoji.into(),
            destination_channel,
        }
    }

    pub fn trigger_emoji(&self) -> &str {
        &self.trigger_emoji
    }

    pub fn is_trigger_emoji(&self, emoji: &str) -> bool {
        emoji == self.trigger_emoji
    }

    /// Check every precondition, cheapest first.
    pub fn check(&self, event: &TriggerEvent, bot_user_id: u64) -> Result<(), SkipReason> {
        if !self.is_trigger_emoji(&event.emoji) {
            return Err(SkipReason::WrongEmoji);
        }
        if event.reaction_count > 1 {
            return Err(SkipReason::NotFirstTrigger {
                count: event.reaction_count,
            });
        }
        if event.key.channel_id == self.destination_channel {
            return Err(SkipReason::DestinationChannel);
        }
        if event.author_id == bot_user_id {
            return Err(SkipReason::OwnMessage);
        }
        Ok(())
    }
}
