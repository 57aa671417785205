//! Link detection and preview suppression for message text.

pub mod detector;
pub mod suppress;

pub use detector::UrlDetector;
pub use suppress::suppress_previews;
