//! Content provider abstraction layer.
//!
//! This module defines the [`ContentProvider`] trait and the concrete
//! providers the bot ships with: prices, exchange rates, verses, RSS feeds,
//! external commands (system snapshot, quotes), emoji and canned replies.
//!
//! ## For contributors — adding a new provider
//!
//! 1. Create a new file in this directory (e.g. `weather.rs`).
//! 2. Define a struct (e.g. `WeatherProvider`) and implement
//!    [`ContentProvider`] for it.
//! 3. Add `mod weather;` below and re-export your struct in the `pub use` block.
//! 4. Add a variant to [`ProviderConfig`](crate::config::ProviderConfig) and a
//!    match arm in [`build`].
//!
//! Jobs and commands only see the trait, so nothing else needs to change.

mod canned;
mod exchange_rate;
mod feed_item;
mod price;
mod process;
mod rss;
mod verse;

use std::sync::Arc;

use async_trait::async_trait;

pub use canned::{EmojiProvider, StaticProvider};
pub use exchange_rate::ExchangeRateProvider;
pub use feed_item::{Feed, FeedItem};
pub use price::PriceProvider;
pub use process::CommandProvider;
pub use self::rss::{parse_feed, render_bullets, RssProvider};
pub use verse::{load_verses, parse_verses, pick_random, VerseEntry, VerseProvider};

use crate::config::ProviderConfig;
use crate::error::ProviderError;

/// Trait that every content provider must implement.
///
/// Jobs call [`produce()`](ContentProvider::produce) from their own tokio
/// task and synchronous commands call it inline, so implementations must be
/// [`Send`] + [`Sync`] and keep no state between calls. Any connection or
/// child process a call opens is released before it returns.
///
/// ## Implementing a new provider
///
/// ```ignore
/// pub struct MyProvider { /* config fields */ }
///
/// #[async_trait]
/// impl ContentProvider for MyProvider {
///     fn name(&self) -> &str { "my-provider" }
///
///     async fn produce(&self) -> Result<String, ProviderError> {
///         // Perform HTTP / IO, then render the payload as text.
///         todo!()
///     }
/// }
/// ```
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Label used in logs.
    fn name(&self) -> &str;

    /// Produce one text payload.
    ///
    /// The payload is not length-limited here; the job or command that
    /// publishes it truncates to the destination's limit.
    async fn produce(&self) -> Result<String, ProviderError>;
}

/// Construct the provider described by one `[providers.<name>]` table.
pub fn build(
    name: &str,
    config: &ProviderConfig,
    http: &reqwest::Client,
) -> Arc<dyn ContentProvider> {
    match config {
        ProviderConfig::Price {
            url,
            asset,
            currency,
            symbol,
        } => Arc::new(PriceProvider::new(
            name,
            http.clone(),
            url,
            asset,
            currency,
            symbol.as_deref(),
        )),
        ProviderConfig::ExchangeRate { url, delimiter } => Arc::new(
            ExchangeRateProvider::new(name, http.clone(), url).with_delimiter(*delimiter),
        ),
        ProviderConfig::Verse { path } => Arc::new(VerseProvider::new(name, path)),
        ProviderConfig::Command {
            program,
            args,
            max_bytes,
        } => Arc::new(CommandProvider::new(name, program, args.clone()).with_max_bytes(*max_bytes)),
        ProviderConfig::Rss { url, budget } => {
            Arc::new(RssProvider::new(name, http.clone(), url).with_budget(*budget))
        }
        ProviderConfig::Emoji => Arc::new(EmojiProvider::new(name)),
        ProviderConfig::Static { text } => Arc::new(StaticProvider::new(name, text)),
    }
}
