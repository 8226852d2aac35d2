//! Where published text goes.
//!
//! The scheduler and the command registry only know [`OutputSink`] and an
//! opaque [`Destination`]. The binary ships [`ConsoleSink`]; a chat gateway
//! would provide its own implementation.

use std::fmt;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::TransportError;

/// Limit for short chat messages.
pub const MESSAGE_LIMIT: usize = 2000;

/// Limit for rich snapshots (system info on ready / `bot`).
pub const RICH_MESSAGE_LIMIT: usize = 8190;

/// Opaque handle of a publish target (a channel id, a room name...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination(String);

impl Destination {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn publish(&self, destination: &Destination, text: &str) -> Result<(), TransportError>;
}

/// Writes every message to stdout as `[destination] text`.
#[derive(Debug, Default)]
pub struct ConsoleSink;

#[async_trait]
impl OutputSink for ConsoleSink {
    async fn publish(&self, destination: &Destination, text: &str) -> Result<(), TransportError> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("[{destination}] {text}\n").as_bytes())
            .await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("🪙🪙🪙", 2), "🪙🪙");
        assert_eq!(truncate_chars("žluťoučký", 4), "žluť");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn destination_displays_its_id() {
        assert_eq!(Destination::new("dev").to_string(), "dev");
    }
}
