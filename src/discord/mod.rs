//! Discord bot integration.
//!
//! Reaction triggers come in through [`LinkHandler`]; records go out to the
//! game list channel through [`ChannelSink`].

pub mod client;
pub mod handler;
pub mod marker;

pub use client::{shared_http, DiscordBot};
pub use handler::{ChannelSink, LinkHandler};
pub use marker::ReactionMarkerStore;
