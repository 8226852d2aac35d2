//! Providers that need no I/O: a random emoji and fixed replies.

use async_trait::async_trait;
use rand::seq::SliceRandom;

use super::ContentProvider;
use crate::error::ProviderError;

const EMOJIS: &[&str] = &[
    "😀", "😂", "🥲", "😎", "🤓", "🧐", "🤖", "👾", "👻", "🎃", "🐶", "🐱", "🦊", "🐻", "🐼",
    "🐸", "🐙", "🦄", "🐝", "🦋", "🌵", "🌻", "🍀", "🍄", "🌍", "🌙", "⭐", "🔥", "🌈", "❄️",
    "🍕", "🍔", "🌮", "🍣", "🍩", "☕", "🍺", "⚽", "🏀", "🎯", "🎲", "🎸", "🎧", "🚀", "🛸",
    "🚲", "⛵", "🏔️", "🏝️", "💡", "🔭", "🧭", "⏰", "💎", "🎁", "📚", "✏️", "🧩", "🪙", "🏓",
];

/// One random emoji per call.
pub struct EmojiProvider {
    label: String,
}

impl EmojiProvider {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[async_trait]
impl ContentProvider for EmojiProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn produce(&self) -> Result<String, ProviderError> {
        let emoji = EMOJIS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("🙂");
        Ok(emoji.to_string())
    }
}

/// Always answers the same text (`ping` → `Pong! 🏓`).
pub struct StaticProvider {
    label: String,
    text: String,
}

impl StaticProvider {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
impl ContentProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn produce(&self) -> Result<String, ProviderError> {
        Ok(self.text.clone())
    }
}
