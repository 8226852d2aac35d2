//! RSS feed parsing and the RSS content provider.
//!
//! [`parse_feed`] is pure (no I/O) so tests can exercise it without hitting
//! the network; [`RssProvider`] fetches the document over HTTP, parses it and
//! renders the leading items as a markdown bullet list.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::{ContentProvider, Feed, FeedItem};
use crate::error::ProviderError;

/// Character budget for a rendered feed; matches a short chat message.
pub const DEFAULT_RENDER_BUDGET: usize = 2000;

/// Parse raw RSS 2.0 bytes into a [`Feed`].
///
/// The document must have an `rss` root with a `channel` child, otherwise
/// [`ProviderError::MalformedDocument`] is returned. Missing channel
/// metadata becomes an empty string. Items lacking a title or a link are
/// dropped; everything else is kept in document order.
pub fn parse_feed(xml: &[u8]) -> Result<Feed, ProviderError> {
    require_rss_root(xml)?;
    let channel = ::rss::Channel::read_from(xml)
        .map_err(|e| ProviderError::MalformedDocument(e.to_string()))?;

    let items = channel
        .items()
        .iter()
        .filter_map(|item| {
            // Title and link gate admission; the rest is optional.
            let title = item.title().filter(|t| !t.is_empty())?;
            let link = item.link().filter(|l| !l.is_empty())?;

            Some(FeedItem {
                title: title.to_string(),
                link: link.to_string(),
                description: item.description().map(String::from),
                pub_date: item.pub_date().map(String::from),
                guid: item.guid().map(|g| g.value().to_string()),
            })
        })
        .collect();

    Ok(Feed {
        title: channel.title().to_string(),
        description: channel.description().to_string(),
        link: channel.link().to_string(),
        items,
    })
}

/// The first element must be `<rss>`; RSS 1.0 (`<rdf:RDF>`) and Atom are
/// rejected even though the `rss` crate would read the former.
fn require_rss_root(xml: &[u8]) -> Result<(), ProviderError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return if e.name().as_ref() == b"rss" {
                    Ok(())
                } else {
                    Err(ProviderError::MalformedDocument(format!(
                        "root element is <{}>, expected <rss>",
                        String::from_utf8_lossy(e.name().as_ref())
                    )))
                };
            }
            Ok(Event::Eof) => {
                return Err(ProviderError::MalformedDocument("no root element".into()));
            }
            Ok(_) => {}
            Err(e) => return Err(ProviderError::MalformedDocument(e.to_string())),
        }
        buf.clear();
    }
}

/// Render leading items as `- [title](link)` lines within `budget` characters.
///
/// Stops at the first item that would overflow the budget; no partial item
/// is ever emitted and there is no continuation marker.
pub fn render_bullets(feed: &Feed, budget: usize) -> String {
    let mut out = String::new();
    let mut used = 0;

    for item in &feed.items {
        let line = item.bullet();
        let len = line.chars().count();
        if used + len > budget {
            break;
        }
        used += len;
        out.push_str(&line);
    }

    out
}

/// An RSS feed content provider.
///
/// Fetches and parses an RSS 2.0 feed over HTTP and relays it as a bullet
/// list of links.
pub struct RssProvider {
    label: String,
    client: reqwest::Client,
    /// The feed URL to poll.
    url: String,
    budget: usize,
}

impl RssProvider {
    /// Create a new RSS provider.
    ///
    /// # Arguments
    ///
    /// * `label` — provider name used in logs.
    /// * `client` — shared HTTP client.
    /// * `url` — full URL of the RSS feed (e.g.
    ///   `https://feeds.bbci.co.uk/news/rss.xml`).
    pub fn new(label: impl Into<String>, client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            client,
            url: url.into(),
            budget: DEFAULT_RENDER_BUDGET,
        }
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }
}

#[async_trait]
impl ContentProvider for RssProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn produce(&self) -> Result<String, ProviderError> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let feed = parse_feed(body.as_ref())?;
        let newest = feed.items.iter().filter_map(FeedItem::published).max();
        tracing::debug!(provider = %self.label, items = feed.len(), ?newest, "feed parsed");
        Ok(render_bullets(&feed, self.budget))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
